use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PredictError, Result};

/// What the toss winner chose to do first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl FromStr for TossDecision {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bat" => Ok(TossDecision::Bat),
            "field" => Ok(TossDecision::Field),
            _ => Err(PredictError::InvalidTossDecision(s.to_string())),
        }
    }
}

/// One completed (or abandoned) fixture from the match log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalMatch {
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
    /// `None` for abandoned and no-result matches
    pub winning_team: Option<String>,
}

impl HistoricalMatch {
    /// Whether `team` played in this match, in either role.
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    pub fn won_by(&self, team: &str) -> bool {
        self.winning_team.as_deref() == Some(team)
    }

    /// Whether this match was played between exactly `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.team1 == a && self.team2 == b) || (self.team1 == b && self.team2 == a)
    }
}

/// A validated prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
}

impl MatchQuery {
    pub fn new(
        team1: impl Into<String>,
        team2: impl Into<String>,
        venue: impl Into<String>,
        toss_winner: impl Into<String>,
        toss_decision: TossDecision,
    ) -> Result<Self> {
        let query = MatchQuery {
            team1: team1.into(),
            team2: team2.into(),
            venue: venue.into(),
            toss_winner: toss_winner.into(),
            toss_decision,
        };
        if query.team1 == query.team2 {
            return Err(PredictError::IdenticalTeams(query.team1));
        }
        if query.toss_winner != query.team1 && query.toss_winner != query.team2 {
            return Err(PredictError::InvalidTossWinner {
                toss_winner: query.toss_winner,
            });
        }
        Ok(query)
    }
}

/// Prediction request as it arrives from a host, before any field is checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchQuery {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub venue: Option<String>,
    pub toss_winner: Option<String>,
    pub toss_decision: Option<String>,
}

impl RawMatchQuery {
    /// Check required fields (team1, team2, tossWinner, tossDecision, venue,
    /// in that order) and canonicalize team names and the toss decision.
    pub fn validate(self) -> Result<MatchQuery> {
        let team1 = required(self.team1, "team1")?;
        let team2 = required(self.team2, "team2")?;
        let toss_winner = required(self.toss_winner, "tossWinner")?;
        let toss_decision = required(self.toss_decision, "tossDecision")?;
        let venue = required(self.venue, "venue")?;

        MatchQuery::new(
            super::canonical_team_name(&team1),
            super::canonical_team_name(&team2),
            super::canonical_venue_name(&venue),
            super::canonical_team_name(&toss_winner),
            toss_decision.parse()?,
        )
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(PredictError::MissingField(field)),
    }
}
