//! Winner selection and result reporting.
//!
//! Only the primary classifier drives the decision. The auxiliary entries in
//! the confidence breakdown are fixed placeholders for model variants that
//! are not wired in yet, and are flagged as provisional in every result.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::FeatureVector;
use crate::model::WinClassifier;

/// Team1 win probability used when no trained model is available.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Name of the model that decides the winner.
pub const PRIMARY_MODEL: &str = "random_forest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calibration {
    /// Derived from the match features by a trained model
    Calibrated,
    /// Fixed placeholder, not derived from the features
    Provisional,
}

/// A model variant that is reported but not yet trained or blended.
#[derive(Debug, Clone, Copy)]
pub struct AuxiliaryModel {
    pub name: &'static str,
    /// Plausible confidence band, in percent
    pub band: (u8, u8),
}

impl AuxiliaryModel {
    /// Middle of the band.
    pub fn placeholder_percent(&self) -> u8 {
        let (lo, hi) = self.band;
        ((u16::from(lo) + u16::from(hi)) / 2) as u8
    }
}

pub const AUXILIARY_MODELS: [AuxiliaryModel; 2] = [
    AuxiliaryModel {
        name: "neural_network",
        band: (60, 90),
    },
    AuxiliaryModel {
        name: "deep_learning",
        band: (65, 95),
    },
];

/// Hand-authored ranking shown alongside every prediction.
const FEATURE_IMPORTANCE: [(&str, u8); 6] = [
    ("Head to Head", 25),
    ("Venue Advantage", 20),
    ("Recent Form", 15),
    ("Overall Win Rate", 15),
    ("Toss Winner", 15),
    ("Toss Decision", 10),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: u8,
}

/// The static importance table, in display order. Weights sum to 100.
pub fn feature_importance() -> Vec<FeatureImportance> {
    FEATURE_IMPORTANCE
        .iter()
        .map(|(feature, importance)| FeatureImportance {
            feature: (*feature).to_string(),
            importance: *importance,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub percent: u8,
    pub calibration: Calibration,
}

/// Per-model confidence: the primary model from `p_team1`, then every
/// auxiliary placeholder.
pub fn confidence_breakdown(primary: &str, p_team1: f64) -> Vec<ModelScore> {
    let mut scores = vec![ModelScore {
        model: primary.to_string(),
        percent: to_percent(p_team1),
        calibration: Calibration::Calibrated,
    }];
    scores.extend(AUXILIARY_MODELS.iter().map(|m| ModelScore {
        model: m.name.to_string(),
        percent: m.placeholder_percent(),
        calibration: Calibration::Provisional,
    }));
    scores
}

/// Model name to percent, in breakdown order: the primary model first.
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfidence(Vec<(String, u8)>);

impl ModelConfidence {
    pub fn get(&self, model: &str) -> Option<u8> {
        self.0
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, percent)| *percent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, percent)| (name.as_str(), *percent))
    }
}

impl FromIterator<ModelScore> for ModelConfidence {
    fn from_iter<I: IntoIterator<Item = ModelScore>>(scores: I) -> Self {
        ModelConfidence(scores.into_iter().map(|s| (s.model, s.percent)).collect())
    }
}

impl Serialize for ModelConfidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, percent)| (name, percent)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub winner: String,
    /// Percent for the predicted winner, 50..=100
    pub probability: u8,
    pub model_confidence: ModelConfidence,
    pub feature_importance: Vec<FeatureImportance>,
    /// Entries of `model_confidence` that are placeholders
    pub provisional_models: Vec<String>,
}

impl PredictionResult {
    pub fn is_provisional(&self, model: &str) -> bool {
        self.provisional_models.iter().any(|m| m == model)
    }
}

fn to_percent(p: f64) -> u8 {
    (p * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Pick a winner between `team1` and `team2`.
///
/// `p1 > 0.5` picks team1; anything else, including an exact 0.5 tie, picks
/// team2. The reported probability is always the winner's side.
pub fn predict(
    model: Option<&dyn WinClassifier>,
    features: &FeatureVector,
    team1: &str,
    team2: &str,
) -> PredictionResult {
    let (primary, p1) = match model {
        Some(m) => (m.name(), m.predict_proba(features)),
        None => (PRIMARY_MODEL, NEUTRAL_PROBABILITY),
    };
    let p1 = if p1.is_finite() {
        p1.clamp(0.0, 1.0)
    } else {
        NEUTRAL_PROBABILITY
    };

    let (winner, probability) = if p1 > 0.5 {
        (team1, to_percent(p1))
    } else {
        (team2, to_percent(1.0 - p1))
    };
    debug!(
        "{} vs {}: p(team1)={:.3} -> {} ({}%)",
        team1, team2, p1, winner, probability
    );

    let scores = confidence_breakdown(primary, p1);
    let provisional_models = scores
        .iter()
        .filter(|s| s.calibration == Calibration::Provisional)
        .map(|s| s.model.clone())
        .collect();
    let model_confidence = scores.into_iter().collect();

    PredictionResult {
        winner: winner.to_string(),
        probability,
        model_confidence,
        feature_importance: feature_importance(),
        provisional_models,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl WinClassifier for Fixed {
        fn name(&self) -> &str {
            PRIMARY_MODEL
        }

        fn predict_proba(&self, _features: &FeatureVector) -> f64 {
            self.0
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::from_array([0.5, 0.5, 0.5, 0.5, 0.5, 1.0, 1.0])
    }

    fn with(p: f64) -> PredictionResult {
        let model = Fixed(p);
        predict(Some(&model as &dyn WinClassifier), &features(), "A", "B")
    }

    #[test]
    fn no_model_falls_back_to_a_tie_for_team2() {
        let r = predict(None, &features(), "A", "B");
        assert_eq!(r.winner, "B");
        assert_eq!(r.probability, 50);
        assert_eq!(r.model_confidence.get(PRIMARY_MODEL), Some(50));
    }

    #[test]
    fn favourite_is_reported_with_its_own_probability() {
        let r = with(0.726);
        assert_eq!(r.winner, "A");
        assert_eq!(r.probability, 73);
        assert_eq!(r.model_confidence.get(PRIMARY_MODEL), Some(73));

        let r = with(0.2);
        assert_eq!(r.winner, "B");
        assert_eq!(r.probability, 80);
        assert_eq!(r.model_confidence.get(PRIMARY_MODEL), Some(20));
    }

    #[test]
    fn probability_stays_in_bounds() {
        for i in 0..=100 {
            let r = with(i as f64 / 100.0);
            assert!((50..=100).contains(&r.probability), "p={} gave {}", i, r.probability);
            assert!(r.winner == "A" || r.winner == "B");
        }
        assert_eq!(with(f64::NAN).probability, 50);
        assert_eq!(with(1.7).probability, 100);
    }

    #[test]
    fn auxiliary_scores_are_flagged_provisional() {
        let r = with(0.9);
        assert!(!r.is_provisional(PRIMARY_MODEL));
        assert!(r.is_provisional("neural_network"));
        assert!(r.is_provisional("deep_learning"));
        assert_eq!(r.model_confidence.get("neural_network"), Some(75));
        assert_eq!(r.model_confidence.get("deep_learning"), Some(80));
        for aux in AUXILIARY_MODELS {
            let (lo, hi) = aux.band;
            assert!((lo..=hi).contains(&aux.placeholder_percent()));
        }
    }

    #[test]
    fn auxiliary_scores_ignore_features() {
        assert_eq!(
            with(0.1).model_confidence.get("neural_network"),
            with(0.95).model_confidence.get("neural_network")
        );
    }

    #[test]
    fn importance_table_is_static_and_sums_to_100() {
        let table = feature_importance();
        assert_eq!(table.len(), 6);
        assert_eq!(table[0].feature, "Head to Head");
        assert_eq!(table.iter().map(|f| u32::from(f.importance)).sum::<u32>(), 100);
        assert_eq!(with(0.3).feature_importance, with(0.8).feature_importance);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(with(0.6)).unwrap();
        assert_eq!(json["winner"], "A");
        assert_eq!(json["probability"], 60);
        assert_eq!(json["modelConfidence"]["random_forest"], 60);
        assert_eq!(json["featureImportance"][1]["feature"], "Venue Advantage");
        assert!(json["provisionalModels"].is_array());
    }

    #[test]
    fn primary_model_leads_the_confidence_breakdown() {
        let r = with(0.6);
        let order: Vec<_> = r.model_confidence.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec![PRIMARY_MODEL, "neural_network", "deep_learning"]);

        let text = serde_json::to_string(&r.model_confidence).unwrap();
        assert_eq!(
            text,
            r#"{"random_forest":60,"neural_network":75,"deep_learning":80}"#
        );
        assert!(r.model_confidence.get("gradient_boosting").is_none());
    }
}
