use anyhow::{bail, Context, Result};
use std::env;
use std::sync::Arc;
use ttgp::config::{ConfigManager, DataConfig};
use ttgp::data::{CsvConnector, Dataset};
use ttgp::engines::evaluation::RmseEvaluator;
use ttgp::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
use ttgp::functions::Vocabulary;

fn load_data(config: &DataConfig) -> Result<(Dataset, Dataset)> {
    let frame = CsvConnector::load_and_validate(&config.train_path, &config.target_column)?;
    let train = Dataset::from_frame(&frame, &config.target_column)?;

    match &config.test_path {
        Some(path) => {
            let frame = CsvConnector::load_and_validate(path, &config.target_column)?;
            let test = Dataset::from_frame(&frame, &config.target_column)?;
            if test.feature_names() != train.feature_names() {
                bail!(
                    "test features {:?} do not match training features {:?}",
                    test.feature_names(),
                    train.feature_names()
                );
            }
            Ok((train, test))
        }
        None => Ok(train.split_tail(config.test_fraction)?),
    }
}

/// Usage: ttgp [config.toml] [logbook.json]
fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let manager = ConfigManager::new();
    if let Some(path) = args.get(1) {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path))?;
    }
    let config = manager.get()?;
    config.validate()?;

    let (train, test) = load_data(&config.data).context("loading data")?;
    log::info!(
        "Loaded {} training and {} test rows over {} features",
        train.len(),
        test.len(),
        train.arity()
    );

    let mut vocabulary = Vocabulary::new(train.feature_names().to_vec(), train.arity())?;
    if config.vocabulary.ephemeral_constants {
        vocabulary = vocabulary
            .with_ephemeral_constants(config.vocabulary.ephemeral_low, config.vocabulary.ephemeral_high);
    }
    let vocabulary = Arc::new(vocabulary);

    let mut engine = EvolutionEngine::new(
        config.evolution.clone(),
        &config.transient,
        Arc::clone(&vocabulary),
        RmseEvaluator::new(Arc::new(train)),
    )?
    .with_test_evaluator(RmseEvaluator::new(Arc::new(test)));

    log::info!(
        "Running {:?} for {} generations with population {}",
        config.evolution.algorithm,
        config.evolution.generations,
        config.evolution.population_size
    );
    let outcome = engine.run(ConsoleProgressCallback)?;

    if let Some(fitness) = outcome.best.fitness {
        println!(
            "Best:     {} (train rmse {:.6}, size {})",
            outcome.best.tree.render(&vocabulary),
            fitness.error,
            fitness.complexity
        );
    }
    if let Some(record) = outcome.logbook.last() {
        println!(
            "Balanced: {} (test rmse {:.6}, size {})",
            outcome.representative.tree.render(&vocabulary),
            record.representative_error,
            record.representative_size
        );
    }
    println!("Archive:  {} non-dominated solutions", outcome.archive.len());

    if let Some(path) = args.get(2) {
        std::fs::write(path, outcome.logbook.to_json()?)
            .with_context(|| format!("writing logbook to {}", path))?;
    }

    Ok(())
}
