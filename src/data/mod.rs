use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

pub mod models;
pub use models::*;

use crate::error::PredictError;

/// Franchise abbreviations used by newer seasons of the dataset.
const TEAM_ABBREVIATIONS: [(&str, &str); 10] = [
    ("CSK", "Chennai Super Kings"),
    ("DC", "Delhi Capitals"),
    ("GT", "Gujarat Titans"),
    ("KKR", "Kolkata Knight Riders"),
    ("LSG", "Lucknow Super Giants"),
    ("MI", "Mumbai Indians"),
    ("PBKS", "Punjab Kings"),
    ("RR", "Rajasthan Royals"),
    ("RCB", "Royal Challengers Bangalore"),
    ("SRH", "Sunrisers Hyderabad"),
];

/// Map a franchise abbreviation to its full name; other names pass through trimmed.
pub fn canonical_team_name(name: &str) -> String {
    let name = name.trim();
    TEAM_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(name))
        .map(|(_, full)| (*full).to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Grounds that appear under several spellings. A venue matches a group
/// when every fragment of any one alternative occurs in its lowercased name.
const VENUE_ALIASES: [(&str, &[&[&str]]); 22] = [
    (
        "Dr DY Patil Sports Academy, Mumbai",
        &[&["dy patil"], &["d.y. patil"], &["d y patil"]],
    ),
    ("Brabourne Stadium, Mumbai", &[&["brabourne"]]),
    ("Buffalo Park, East London", &[&["buffalo park"]]),
    ("Dubai International Cricket Stadium", &[&["dubai", "stadium"]]),
    ("Sharjah Cricket Stadium", &[&["sharjah"]]),
    ("Sheikh Zayed Stadium, Abu Dhabi", &[&["zayed"]]),
    (
        "M. Chinnaswamy Stadium, Bangalore",
        &[&["chinnaswamy"], &["bengaluru", "stadium"]],
    ),
    ("Wankhede Stadium, Mumbai", &[&["wankhede"]]),
    (
        "MA Chidambaram Stadium, Chennai",
        &[&["chidambaram"], &["chepauk"]],
    ),
    ("Eden Gardens, Kolkata", &[&["eden gardens"]]),
    (
        "Arun Jaitley Stadium, Delhi",
        &[&["feroz shah kotla"], &["arun jaitley"], &["delhi", "stadium"]],
    ),
    (
        "Rajiv Gandhi International Stadium, Hyderabad",
        &[&["rajiv gandhi"], &["uppal"]],
    ),
    (
        "Punjab Cricket Association Stadium, Mohali",
        &[&["punjab cricket"], &["mohali"], &["is bindra"]],
    ),
    (
        "Sawai Mansingh Stadium, Jaipur",
        &[&["sawai mansingh"], &["jaipur", "stadium"]],
    ),
    (
        "Narendra Modi Stadium, Ahmedabad",
        &[&["narendra modi"], &["motera"]],
    ),
    (
        "Maharashtra Cricket Association Stadium, Pune",
        &[&["maharashtra cricket"], &["pune", "stadium"]],
    ),
    (
        "HPCA Stadium, Dharamsala",
        &[&["hpca"], &["himachal pradesh"], &["dharamsala"]],
    ),
    (
        "Ekana Cricket Stadium, Lucknow",
        &[&["ekana"], &["lucknow", "stadium"]],
    ),
    (
        "Barsapara Cricket Stadium, Guwahati",
        &[&["barsapara"], &["guwahati"]],
    ),
    (
        "ACA-VDCA Stadium, Visakhapatnam",
        &[&["aca-vdca"], &["visakhapatnam"], &["vizag"]],
    ),
    ("Holkar Cricket Stadium, Indore", &[&["holkar"]]),
    ("Green Park, Kanpur", &[&["green park"]]),
];

/// Map known spellings of a ground to one name; other venues pass through trimmed.
/// Groups are tried in table order, so the first match wins.
pub fn canonical_venue_name(venue: &str) -> String {
    let venue = venue.trim();
    let lower = venue.to_lowercase();
    VENUE_ALIASES
        .iter()
        .find(|(_, alternatives)| {
            alternatives
                .iter()
                .any(|fragments| fragments.iter().all(|f| lower.contains(f)))
        })
        .map(|(canonical, _)| (*canonical).to_string())
        .unwrap_or_else(|| venue.to_string())
}

/// A match-log row as stored on disk. Accepts both camelCase keys and the
/// PascalCase column names of the IPL dataset export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchRow {
    #[serde(alias = "Team1")]
    team1: Option<String>,
    #[serde(alias = "Team2")]
    team2: Option<String>,
    #[serde(alias = "Venue")]
    venue: Option<String>,
    #[serde(alias = "TossWinner")]
    toss_winner: Option<String>,
    #[serde(alias = "TossDecision")]
    toss_decision: Option<String>,
    #[serde(alias = "WinningTeam")]
    winning_team: Option<String>,
}

impl RawMatchRow {
    fn into_match(self, row: usize) -> Result<HistoricalMatch, PredictError> {
        let field = |value: Option<String>, name: &str| match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(PredictError::MalformedRow {
                row,
                reason: format!("missing {name}"),
            }),
        };

        let team1 = canonical_team_name(&field(self.team1, "team1")?);
        let team2 = canonical_team_name(&field(self.team2, "team2")?);
        if team1 == team2 {
            return Err(PredictError::MalformedRow {
                row,
                reason: format!("{team1} listed as both teams"),
            });
        }
        let venue = canonical_venue_name(&field(self.venue, "venue")?);
        let toss_winner = canonical_team_name(&field(self.toss_winner, "tossWinner")?);
        let toss_decision = field(self.toss_decision, "tossDecision")?
            .parse::<TossDecision>()
            .map_err(|e| PredictError::MalformedRow {
                row,
                reason: e.to_string(),
            })?;

        let winning_team = self
            .winning_team
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty() && !w.eq_ignore_ascii_case("na"))
            .map(|w| canonical_team_name(&w));
        if let Some(winner) = winning_team.as_deref() {
            if winner != team1 && winner != team2 {
                return Err(PredictError::MalformedRow {
                    row,
                    reason: format!("winner {winner} did not play ({team1} vs {team2})"),
                });
            }
        }

        Ok(HistoricalMatch {
            team1,
            team2,
            venue,
            toss_winner,
            toss_decision,
            winning_team,
        })
    }
}

/// Parse a JSON array of match rows, preserving file order.
pub fn parse_match_log(raw: &str) -> Result<Vec<HistoricalMatch>> {
    let rows: Vec<RawMatchRow> = serde_json::from_str(raw).context("parse match log JSON")?;
    let log = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_match(i))
        .collect::<Result<Vec<_>, _>>()?;

    let no_result = log.iter().filter(|m| m.winning_team.is_none()).count();
    debug!("Parsed {} match rows ({} without a result)", log.len(), no_result);
    Ok(log)
}

/// Load the match log from a JSON file.
pub fn load_match_log(path: &Path) -> Result<Vec<HistoricalMatch>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read match log {}", path.display()))?;
    let log = parse_match_log(&raw).with_context(|| format!("load {}", path.display()))?;
    info!("Loaded {} matches from {}", log.len(), path.display());
    Ok(log)
}

/// Every team that appears in the log, sorted.
pub fn teams(log: &[HistoricalMatch]) -> Vec<String> {
    log.iter()
        .flat_map(|m| [m.team1.as_str(), m.team2.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Every venue that appears in the log, sorted.
pub fn venues(log: &[HistoricalMatch]) -> Vec<String> {
    log.iter()
        .map(|m| m.venue.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
