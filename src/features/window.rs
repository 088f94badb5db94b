//! Win/played tallies over a historical window.

use crate::data::HistoricalMatch;

/// Wins out of matches played for one team (or one side of a pairing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinRecord {
    pub wins: usize,
    pub played: usize,
}

impl WinRecord {
    fn record(&mut self, won: bool) {
        self.played += 1;
        if won {
            self.wins += 1;
        }
    }

    /// `wins / max(1, played)`: 0.0 when nothing has been played.
    pub fn rate(&self) -> f64 {
        self.wins as f64 / self.played.max(1) as f64
    }
}

/// Everything the feature vector needs about one pairing, gathered in a
/// single pass over the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchupStats {
    pub team1: WinRecord,
    pub team2: WinRecord,
    /// Meetings between the two teams, counted as wins for team1
    pub head_to_head: WinRecord,
    pub team1_venue: WinRecord,
    pub team2_venue: WinRecord,
}

impl MatchupStats {
    /// Tally `team1` and `team2` over `window`.
    ///
    /// Rows without a recorded winner still count as played.
    pub fn collect(window: &[HistoricalMatch], team1: &str, team2: &str, venue: &str) -> Self {
        let mut stats = MatchupStats::default();
        for m in window {
            let at_venue = m.venue == venue;
            if m.involves(team1) {
                let won = m.won_by(team1);
                stats.team1.record(won);
                if at_venue {
                    stats.team1_venue.record(won);
                }
            }
            if m.involves(team2) {
                let won = m.won_by(team2);
                stats.team2.record(won);
                if at_venue {
                    stats.team2_venue.record(won);
                }
            }
            if m.is_between(team1, team2) {
                stats.head_to_head.record(m.won_by(team1));
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TossDecision;
    use approx::assert_relative_eq;

    fn row(team1: &str, team2: &str, venue: &str, winner: Option<&str>) -> HistoricalMatch {
        HistoricalMatch {
            team1: team1.into(),
            team2: team2.into(),
            venue: venue.into(),
            toss_winner: team1.into(),
            toss_decision: TossDecision::Field,
            winning_team: winner.map(str::to_string),
        }
    }

    #[test]
    fn empty_record_rate_is_zero() {
        assert_relative_eq!(WinRecord::default().rate(), 0.0);
    }

    #[test]
    fn tallies_overall_venue_and_head_to_head() {
        let window = vec![
            row("A", "B", "X", Some("A")),
            row("B", "A", "Y", Some("B")),
            row("A", "C", "X", Some("A")),
            row("C", "B", "X", Some("C")),
            row("A", "B", "X", None),
        ];
        let s = MatchupStats::collect(&window, "A", "B", "X");

        assert_eq!(s.team1, WinRecord { wins: 2, played: 4 });
        assert_eq!(s.team2, WinRecord { wins: 1, played: 4 });
        assert_eq!(s.head_to_head, WinRecord { wins: 1, played: 3 });
        assert_eq!(s.team1_venue, WinRecord { wins: 2, played: 3 });
        assert_eq!(s.team2_venue, WinRecord { wins: 0, played: 3 });
        assert_relative_eq!(s.head_to_head.rate(), 1.0 / 3.0);
    }

    #[test]
    fn venue_names_match_exactly() {
        let window = vec![row("A", "B", "Eden Gardens", Some("A"))];
        let s = MatchupStats::collect(&window, "A", "B", "eden gardens");
        assert_eq!(s.team1_venue.played, 0);
        assert_eq!(s.team1.played, 1);
    }
}
