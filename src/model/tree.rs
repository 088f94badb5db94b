//! CART classification tree with Gini impurity.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

/// Smallest impurity decrease that still counts as an improvement.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Non-constant features inspected per split
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Fraction of training samples at this leaf where team1 won
        p_win: f64,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        /// Samples with `x[feature] <= threshold`
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grow a tree on the rows selected by `sample` (indices may repeat).
    pub fn fit<R: Rng>(
        rows: &[[f64; FEATURE_COUNT]],
        labels: &[u8],
        sample: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        DecisionTree {
            root: grow(rows, labels, sample, 0, params, rng),
        }
    }

    /// Leaf fraction of team1 wins for `x`.
    pub fn predict_proba(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { p_win, .. } => return *p_win,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

fn gini(n: usize, positives: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

fn grow<R: Rng>(
    rows: &[[f64; FEATURE_COUNT]],
    labels: &[u8],
    sample: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut R,
) -> Node {
    let n = sample.len();
    let positives = sample.iter().filter(|&&i| labels[i] == 1).count();
    let leaf = Node::Leaf {
        p_win: positives as f64 / n.max(1) as f64,
        samples: n,
    };

    let pure = positives == 0 || positives == n;
    let too_deep = params.max_depth.is_some_and(|d| depth >= d);
    if pure || n < params.min_samples_split || too_deep {
        return leaf;
    }

    let Some(split) = best_split(rows, labels, sample, positives, params, rng) else {
        return leaf;
    };

    let (left, right): (Vec<usize>, Vec<usize>) = sample
        .iter()
        .copied()
        .partition(|&i| rows[i][split.feature] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(rows, labels, &left, depth + 1, params, rng)),
        right: Box::new(grow(rows, labels, &right, depth + 1, params, rng)),
    }
}

/// Search features in random order until `max_features` non-constant ones
/// have been inspected; constant features don't count toward the budget.
fn best_split<R: Rng>(
    rows: &[[f64; FEATURE_COUNT]],
    labels: &[u8],
    sample: &[usize],
    positives: usize,
    params: &TreeParams,
    rng: &mut R,
) -> Option<Split> {
    let n = sample.len();
    let parent = gini(n, positives);

    let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
    order.shuffle(rng);

    let mut best: Option<Split> = None;
    let mut inspected = 0usize;
    let mut column: Vec<(f64, u8)> = Vec::with_capacity(n);

    for feature in order {
        if inspected >= params.max_features.max(1) {
            break;
        }

        column.clear();
        column.extend(sample.iter().map(|&i| (rows[i][feature], labels[i])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));
        if column[0].0 == column[n - 1].0 {
            continue;
        }
        inspected += 1;

        let mut left_n = 0usize;
        let mut left_pos = 0usize;
        for k in 0..n - 1 {
            left_n += 1;
            left_pos += column[k].1 as usize;
            if column[k].0 == column[k + 1].0 {
                continue;
            }
            let right_n = n - left_n;
            let right_pos = positives - left_pos;
            let impurity = (left_n as f64 * gini(left_n, left_pos)
                + right_n as f64 * gini(right_n, right_pos))
                / n as f64;

            let improves = parent - impurity > MIN_IMPURITY_DECREASE;
            let better = best.as_ref().map_or(true, |b| impurity < b.impurity);
            if improves && better {
                best = Some(Split {
                    feature,
                    threshold: (column[k].0 + column[k + 1].0) / 2.0,
                    impurity,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: FEATURE_COUNT,
        }
    }

    fn row(first: f64) -> [f64; FEATURE_COUNT] {
        [first, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    #[test]
    fn gini_of_pure_and_balanced_nodes() {
        assert_relative_eq!(gini(4, 0), 0.0);
        assert_relative_eq!(gini(4, 4), 0.0);
        assert_relative_eq!(gini(4, 2), 0.5);
    }

    #[test]
    fn separable_data_is_split_on_the_informative_feature() {
        let rows = vec![row(0.1), row(0.2), row(0.8), row(0.9)];
        let labels = vec![0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(&rows, &labels, &[0, 1, 2, 3], &params(), &mut rng);

        assert_eq!(tree.depth(), 1);
        assert_relative_eq!(tree.predict_proba(&row(0.15)), 0.0);
        assert_relative_eq!(tree.predict_proba(&row(0.85)), 1.0);
        match &tree.root {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_relative_eq!(*threshold, 0.5);
            }
            Node::Leaf { .. } => panic!("expected a split"),
        }
    }

    #[test]
    fn constant_features_yield_a_single_leaf() {
        let rows = vec![row(0.3), row(0.3), row(0.3)];
        let labels = vec![1, 0, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&rows, &labels, &[0, 1, 2], &params(), &mut rng);
        assert_eq!(tree.depth(), 0);
        assert_relative_eq!(tree.predict_proba(&row(0.3)), 2.0 / 3.0);
    }

    #[test]
    fn max_depth_caps_growth() {
        let rows: Vec<_> = (0..8).map(|i| row(i as f64)).collect();
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let sample: Vec<usize> = (0..8).collect();
        let capped = TreeParams {
            max_depth: Some(2),
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(&rows, &labels, &sample, &capped, &mut rng);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn repeated_bootstrap_indices_are_weighted() {
        let rows = vec![row(0.0), row(1.0)];
        let labels = vec![1, 0];
        let mut rng = StdRng::seed_from_u64(5);
        let tree = DecisionTree::fit(&rows, &labels, &[0, 0, 0], &params(), &mut rng);
        assert_relative_eq!(tree.predict_proba(&row(1.0)), 1.0);
    }
}
