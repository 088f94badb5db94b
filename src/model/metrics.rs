//! Holdout scoring: accuracy, Brier score and log loss.

use serde::Serialize;

use super::WinClassifier;
use crate::features::TrainingSet;
use crate::predict::NEUTRAL_PROBABILITY;

const EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalMetrics {
    pub samples: usize,
    pub accuracy: f64,
    pub brier: f64,
    pub log_loss: f64,
}

/// Score `model` (or the neutral fallback when `None`) on a labeled set.
/// A prediction counts as correct under the same strict `p > 0.5` rule the
/// predictor uses to pick team1.
pub fn evaluate(model: Option<&dyn WinClassifier>, set: &TrainingSet) -> EvalMetrics {
    if set.is_empty() {
        return EvalMetrics {
            samples: 0,
            accuracy: 0.0,
            brier: 0.0,
            log_loss: 0.0,
        };
    }

    let mut correct = 0usize;
    let mut brier = 0.0;
    let mut log_loss = 0.0;
    for (features, label) in set.features.iter().zip(&set.labels) {
        let p = model.map_or(NEUTRAL_PROBABILITY, |m| m.predict_proba(features));
        let y = f64::from(*label);
        if (p > 0.5) == (*label == 1) {
            correct += 1;
        }
        brier += (p - y).powi(2);
        let p = p.clamp(EPS, 1.0 - EPS);
        log_loss += -(y * p.ln() + (1.0 - y) * (1.0 - p).ln());
    }

    let n = set.len() as f64;
    EvalMetrics {
        samples: set.len(),
        accuracy: correct as f64 / n,
        brier: brier / n,
        log_loss: log_loss / n,
    }
}
