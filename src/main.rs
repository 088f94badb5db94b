use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

mod config;

use config::{Command, Config};
use ipl_predictor::data::{self, load_match_log};
use ipl_predictor::model::{self, evaluate};
use ipl_predictor::{
    extract_query_features, extract_training_set, predict, ForestConfig, HistoricalMatch,
    RandomForest, RawMatchQuery, WinClassifier,
};

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    match config.command.clone() {
        Command::Train => {
            let log = load_match_log(&config.match_log)?;
            match train_and_save(&log, &config.forest(), &config.model_path)? {
                Some(forest) => info!(
                    "Model with {} trees ({} samples, seed {}) saved to {}",
                    forest.n_trees(),
                    forest.samples(),
                    forest.seed(),
                    config.model_path.display()
                ),
                None => warn!("Nothing to train on; no model written"),
            }
        }
        Command::Predict {
            team1,
            team2,
            venue,
            toss_winner,
            toss_decision,
        } => {
            let query = RawMatchQuery {
                team1,
                team2,
                venue,
                toss_winner,
                toss_decision,
            }
            .validate()?;

            let log = load_match_log(&config.match_log)?;
            let forest = load_or_train(&log, &config)?;
            let features = extract_query_features(&log, &query);
            let result = predict(
                forest.as_ref().map(|f| f as &dyn WinClassifier),
                &features,
                &query.team1,
                &query.team2,
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Teams => {
            let log = load_match_log(&config.match_log)?;
            println!("{}", serde_json::to_string_pretty(&data::teams(&log))?);
        }
        Command::Venues => {
            let log = load_match_log(&config.match_log)?;
            println!("{}", serde_json::to_string_pretty(&data::venues(&log))?);
        }
        Command::Evaluate { holdout } => {
            let log = load_match_log(&config.match_log)?;
            let set = extract_training_set(&log);
            let (train, test) = set.split_chronological(holdout);
            info!(
                "Evaluating on {} held-out matches after training on {}",
                test.len(),
                train.len()
            );
            let forest = model::fit(&train, &config.forest());
            let metrics = evaluate(forest.as_ref().map(|f| f as &dyn WinClassifier), &test);
            let baseline = evaluate(None, &test);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "model": metrics,
                    "neutralBaseline": baseline,
                }))?
            );
        }
        Command::Health => {
            let model_loaded = load_model(&config.model_path).is_ok_and(|m| m.is_some());
            let matches = load_match_log(&config.match_log).map(|log| log.len()).ok();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "status": "healthy",
                    "modelsLoaded": model_loaded,
                    "matches": matches,
                }))?
            );
        }
    }

    Ok(())
}

fn train_and_save(
    log: &[HistoricalMatch],
    forest: &ForestConfig,
    path: &Path,
) -> Result<Option<RandomForest>> {
    let set = extract_training_set(log);
    let Some(model) = model::fit(&set, forest) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create model directory {}", parent.display()))?;
    }
    let raw = serde_json::to_string(&model).context("serialize model")?;
    std::fs::write(path, raw).with_context(|| format!("write model {}", path.display()))?;
    Ok(Some(model))
}

/// `Ok(None)` when no model file exists yet.
fn load_model(path: &Path) -> Result<Option<RandomForest>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read model {}", path.display()))?;
    let model = serde_json::from_str(&raw)
        .with_context(|| format!("parse model {}", path.display()))?;
    Ok(Some(model))
}

fn load_or_train(log: &[HistoricalMatch], config: &Config) -> Result<Option<RandomForest>> {
    if let Some(model) = load_model(&config.model_path)? {
        info!(
            "Loaded model from {} ({} trees, {} samples, seed {})",
            config.model_path.display(),
            model.n_trees(),
            model.samples(),
            model.seed()
        );
        return Ok(Some(model));
    }
    info!(
        "Model file {} not found. Training new model...",
        config.model_path.display()
    );
    let model = train_and_save(log, &config.forest(), &config.model_path)?;
    if model.is_none() {
        warn!("No model available; predicting with the neutral fallback");
    }
    Ok(model)
}
