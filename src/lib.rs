//! Cricket match winner prediction.
//!
//! Point-in-time features are derived from an ordered log of past matches,
//! a seeded random forest scores how likely team1 is to win, and the
//! predictor turns that score into a winner with reporting metadata.

pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod predict;

pub use data::{HistoricalMatch, MatchQuery, RawMatchQuery, TossDecision};
pub use error::PredictError;
pub use features::{extract_query_features, extract_training_set, FeatureVector, TrainingSet};
pub use model::{fit, ForestConfig, RandomForest, WinClassifier};
pub use predict::{predict, ModelConfidence, PredictionResult};
