use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ipl_predictor::model::ForestConfig;

/// Cricket match winner predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-predictor", version, about)]
pub struct Config {
    /// Match log (JSON array of historical matches, oldest first)
    #[arg(long, env = "MATCH_LOG_PATH", default_value = "data/matches.json")]
    pub match_log: PathBuf,

    /// Where the trained forest is saved and loaded
    #[arg(long, env = "MODEL_PATH", default_value = "models/random_forest.json")]
    pub model_path: PathBuf,

    /// Number of trees in the forest
    #[arg(long, env = "FOREST_TREES", default_value = "100")]
    pub trees: usize,

    /// Random seed for bootstrap sampling
    #[arg(long, env = "FOREST_SEED", default_value = "42")]
    pub seed: u64,

    /// Maximum tree depth (unlimited when unset)
    #[arg(long, env = "FOREST_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Minimum samples required to split a node
    #[arg(long, env = "FOREST_MIN_SAMPLES_SPLIT", default_value = "2")]
    pub min_samples_split: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Featurize the match log, train the forest and save it
    Train,
    /// Predict the winner of a match
    Predict {
        #[arg(long)]
        team1: Option<String>,
        #[arg(long)]
        team2: Option<String>,
        #[arg(long)]
        venue: Option<String>,
        #[arg(long)]
        toss_winner: Option<String>,
        /// bat or field
        #[arg(long)]
        toss_decision: Option<String>,
    },
    /// List every team in the match log
    Teams,
    /// List every venue in the match log
    Venues,
    /// Train on the older matches and score the most recent ones
    Evaluate {
        /// Fraction of labeled matches held out, taken from the end of the log
        #[arg(long, default_value = "0.2")]
        holdout: f64,
    },
    /// Report whether the model and match log load
    Health,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.trees == 0 {
            anyhow::bail!("trees must be at least 1");
        }
        if self.min_samples_split < 2 {
            anyhow::bail!("min_samples_split must be at least 2");
        }
        if self.max_depth == Some(0) {
            anyhow::bail!("max_depth must be at least 1 when set");
        }
        if let Command::Evaluate { holdout } = self.command {
            if !(holdout > 0.0 && holdout < 1.0) {
                anyhow::bail!("holdout must be strictly between 0.0 and 1.0");
            }
        }
        Ok(())
    }

    pub fn forest(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.trees,
            seed: self.seed,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        }
    }
}
