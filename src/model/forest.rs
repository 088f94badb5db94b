use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::tree::{DecisionTree, TreeParams};
use super::{ForestConfig, WinClassifier};
use crate::features::{FeatureVector, TrainingSet, FEATURE_COUNT};

/// Bagged ensemble of CART trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    seed: u64,
    /// Training rows the forest was fitted on
    samples: usize,
}

impl RandomForest {
    /// Fit on a non-empty training set. Each tree gets a bootstrap sample
    /// and its own RNG derived from `config.seed`, so the result is fully
    /// determined by the data and the config.
    pub(crate) fn train(set: &TrainingSet, config: &ForestConfig) -> Self {
        let rows: Vec<[f64; FEATURE_COUNT]> = set.features.iter().map(|f| f.to_array()).collect();
        let n = rows.len();
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: ((FEATURE_COUNT as f64).sqrt() as usize).max(1),
        };

        let mut seeder = StdRng::seed_from_u64(config.seed);
        let trees = (0..config.n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeder.gen());
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(&rows, &set.labels, &sample, &params, &mut rng)
            })
            .collect::<Vec<_>>();

        let max_depth = trees.iter().map(DecisionTree::depth).max().unwrap_or(0);
        info!(
            "Trained random forest: {} trees on {} samples (seed {}, max depth {})",
            trees.len(),
            n,
            config.seed,
            max_depth
        );

        RandomForest {
            trees,
            seed: config.seed,
            samples: n,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl WinClassifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    /// Mean of the per-tree leaf probabilities.
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let x = features.to_array();
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(&x)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vector(team1_rate: f64, team2_rate: f64) -> FeatureVector {
        FeatureVector::from_array([team1_rate, team2_rate, 0.5, 0.5, 0.5, 1.0, 0.0])
    }

    fn strength_set() -> TrainingSet {
        let mut set = TrainingSet::default();
        for i in 0..40 {
            let strong = i % 2 == 0;
            let (a, b) = if strong { (0.8, 0.3) } else { (0.3, 0.8) };
            set.push(vector(a, b), u8::from(strong));
        }
        set
    }

    #[test]
    fn same_seed_gives_identical_forests() {
        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        let a = RandomForest::train(&strength_set(), &config);
        let b = RandomForest::train(&strength_set(), &config);
        assert_eq!(a, b);
        assert_eq!(a.n_trees(), 10);
        assert_eq!(a.samples(), 40);
    }

    #[test]
    fn learns_the_stronger_side() {
        let forest = RandomForest::train(&strength_set(), &ForestConfig::default());
        assert!(forest.predict_proba(&vector(0.8, 0.3)) > 0.9);
        assert!(forest.predict_proba(&vector(0.3, 0.8)) < 0.1);
    }

    #[test]
    fn single_example_is_memorized() {
        let mut set = TrainingSet::default();
        set.push(vector(0.0, 0.0), 1);
        let forest = RandomForest::train(&set, &ForestConfig::default());
        assert_relative_eq!(forest.predict_proba(&vector(0.0, 0.0)), 1.0);
    }

    #[test]
    fn survives_a_json_round_trip() {
        let forest = RandomForest::train(
            &strength_set(),
            &ForestConfig {
                n_trees: 3,
                ..ForestConfig::default()
            },
        );
        let raw = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&raw).unwrap();
        let sample = vector(0.6, 0.4);
        assert_relative_eq!(
            back.predict_proba(&sample),
            forest.predict_proba(&sample),
            epsilon = 1e-9
        );
        assert_eq!(back.seed(), 42);
    }
}
