//! Point-in-time match features.
//!
//! Every statistic is computed "as of" a window of the match log. Training
//! rows only ever see the strict prefix before them; a live query sees the
//! whole log.

pub mod window;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{HistoricalMatch, MatchQuery, TossDecision};
pub use window::{MatchupStats, WinRecord};

pub const FEATURE_COUNT: usize = 7;

/// Column names, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "team1_win_rate",
    "team2_win_rate",
    "team1_head_to_head_win_rate",
    "team1_venue_win_rate",
    "team2_venue_win_rate",
    "toss_winner_is_team1",
    "toss_decision_is_bat",
];

/// Rate used for every rate feature when there is no history at all.
pub const NEUTRAL_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub team1_win_rate: f64,
    pub team2_win_rate: f64,
    pub team1_head_to_head_win_rate: f64,
    pub team1_venue_win_rate: f64,
    pub team2_venue_win_rate: f64,
    /// 1.0 or 0.0
    pub toss_winner_is_team1: f64,
    /// 1.0 or 0.0
    pub toss_decision_is_bat: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.team1_win_rate,
            self.team2_win_rate,
            self.team1_head_to_head_win_rate,
            self.team1_venue_win_rate,
            self.team2_venue_win_rate,
            self.toss_winner_is_team1,
            self.toss_decision_is_bat,
        ]
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector {
            team1_win_rate: values[0],
            team2_win_rate: values[1],
            team1_head_to_head_win_rate: values[2],
            team1_venue_win_rate: values[3],
            team2_venue_win_rate: values[4],
            toss_winner_is_team1: values[5],
            toss_decision_is_bat: values[6],
        }
    }
}

/// The match being described, borrowed from either a log row or a query.
#[derive(Debug, Clone, Copy)]
struct Fixture<'a> {
    team1: &'a str,
    team2: &'a str,
    venue: &'a str,
    toss_winner: &'a str,
    toss_decision: TossDecision,
}

impl<'a> From<&'a HistoricalMatch> for Fixture<'a> {
    fn from(m: &'a HistoricalMatch) -> Self {
        Fixture {
            team1: &m.team1,
            team2: &m.team2,
            venue: &m.venue,
            toss_winner: &m.toss_winner,
            toss_decision: m.toss_decision,
        }
    }
}

impl<'a> From<&'a MatchQuery> for Fixture<'a> {
    fn from(q: &'a MatchQuery) -> Self {
        Fixture {
            team1: &q.team1,
            team2: &q.team2,
            venue: &q.venue,
            toss_winner: &q.toss_winner,
            toss_decision: q.toss_decision,
        }
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn compute(window: &[HistoricalMatch], fixture: Fixture<'_>) -> FeatureVector {
    let stats = MatchupStats::collect(window, fixture.team1, fixture.team2, fixture.venue);
    FeatureVector {
        team1_win_rate: stats.team1.rate(),
        team2_win_rate: stats.team2.rate(),
        team1_head_to_head_win_rate: stats.head_to_head.rate(),
        team1_venue_win_rate: stats.team1_venue.rate(),
        team2_venue_win_rate: stats.team2_venue.rate(),
        toss_winner_is_team1: flag(fixture.toss_winner == fixture.team1),
        toss_decision_is_bat: flag(fixture.toss_decision == TossDecision::Bat),
    }
}

/// Parallel feature and label sequences; `labels[i]` is 1 when team1 of the
/// match behind `features[i]` won.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<u8>,
}

impl TrainingSet {
    pub fn push(&mut self, features: FeatureVector, label: u8) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Split off the last `holdout` fraction (rounded, at least one row when
    /// the set has two or more) as the evaluation tail. Order is preserved, so
    /// the head never contains matches later than the tail.
    pub fn split_chronological(&self, holdout: f64) -> (TrainingSet, TrainingSet) {
        let n = self.len();
        let tail = if n < 2 {
            0
        } else {
            ((n as f64 * holdout).round() as usize).clamp(1, n - 1)
        };
        let cut = n - tail;
        let head = TrainingSet {
            features: self.features[..cut].to_vec(),
            labels: self.labels[..cut].to_vec(),
        };
        let tail = TrainingSet {
            features: self.features[cut..].to_vec(),
            labels: self.labels[cut..].to_vec(),
        };
        (head, tail)
    }
}

/// Build the labeled training set from an ordered match log.
///
/// Row `i` is featurized against `log[..i]` only. Rows with no winner get no
/// vector and no label, but stay in the window for every later row.
pub fn extract_training_set(log: &[HistoricalMatch]) -> TrainingSet {
    let mut set = TrainingSet::default();
    for (i, m) in log.iter().enumerate() {
        let Some(winner) = m.winning_team.as_deref() else {
            continue;
        };
        let features = compute(&log[..i], Fixture::from(m));
        set.push(features, u8::from(winner == m.team1));
    }
    debug!(
        "Extracted {} training rows from {} matches [{}]",
        set.len(),
        log.len(),
        FEATURE_NAMES.join(", ")
    );
    set
}

/// Featurize a prospective match against the whole log.
///
/// With an empty log every rate feature is [`NEUTRAL_RATE`]; the toss flags
/// still reflect the query.
pub fn extract_query_features(log: &[HistoricalMatch], query: &MatchQuery) -> FeatureVector {
    let fixture = Fixture::from(query);
    if log.is_empty() {
        return FeatureVector {
            team1_win_rate: NEUTRAL_RATE,
            team2_win_rate: NEUTRAL_RATE,
            team1_head_to_head_win_rate: NEUTRAL_RATE,
            team1_venue_win_rate: NEUTRAL_RATE,
            team2_venue_win_rate: NEUTRAL_RATE,
            toss_winner_is_team1: flag(fixture.toss_winner == fixture.team1),
            toss_decision_is_bat: flag(fixture.toss_decision == TossDecision::Bat),
        };
    }
    compute(log, fixture)
}
