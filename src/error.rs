use thiserror::Error;

/// Input-contract violations surfaced by the prediction core.
///
/// Statistic computation never produces one of these: an empty history, a
/// match without a recorded winner or a missing model all have a defined
/// fallback. Only malformed inputs reach the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid toss decision: {0:?} (expected bat or field)")]
    InvalidTossDecision(String),

    #[error("Toss winner {toss_winner:?} is neither team1 nor team2")]
    InvalidTossWinner { toss_winner: String },

    #[error("team1 and team2 are both {0:?}")]
    IdenticalTeams(String),

    #[error("Malformed match log row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

impl PredictError {
    /// True for errors caused by the caller's input (a 4xx-class failure at
    /// an HTTP boundary).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictError::MalformedRow { .. })
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_the_wire_field() {
        let err = PredictError::MissingField("tossWinner");
        assert_eq!(err.to_string(), "Missing required field: tossWinner");
        assert!(err.is_client_error());
    }

    #[test]
    fn malformed_rows_are_not_client_errors() {
        let err = PredictError::MalformedRow {
            row: 3,
            reason: "missing team2".into(),
        };
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("row 3"));
    }
}
