pub mod forest;
pub mod metrics;
pub mod tree;

pub use forest::RandomForest;
pub use metrics::{evaluate, EvalMetrics};

use tracing::warn;

use crate::features::{FeatureVector, TrainingSet};

/// Any model that scores how likely team1 is to win.
pub trait WinClassifier: Send + Sync {
    /// Name reported in the confidence breakdown.
    fn name(&self) -> &str;

    /// Estimated probability in [0, 1] that team1 wins.
    fn predict_proba(&self, features: &FeatureVector) -> f64;
}

/// Random forest hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Train a random forest on `set`. Returns `None` without touching the
/// learner when there is nothing to train on.
pub fn fit(set: &TrainingSet, config: &ForestConfig) -> Option<RandomForest> {
    if set.is_empty() || config.n_trees == 0 {
        warn!("No data available for training");
        return None;
    }
    Some(RandomForest::train(set, config))
}
