pub mod cli;
pub mod core;
pub mod export;
pub mod fetcher;
pub mod pipeline;
pub mod providers;
pub mod scheduler;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Watch,
    Once,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.base_url,
        output = %config.output_path.display(),
        policy = ?config.missing_rate_policy,
        "Loaded config"
    );

    let pipeline = build_pipeline(&config)?;
    match command {
        AppCommand::Watch => cli::watch::watch(&config, pipeline).await,
        AppCommand::Once => {
            let snapshot = pipeline.run_once().await?;
            info!(rows = snapshot.len(), "Rates updated");
            Ok(())
        }
    }
}

pub fn build_pipeline(config: &AppConfig) -> Result<pipeline::RatePipeline> {
    let source = providers::OpenExchangeRatesProvider::new(
        &config.base_url,
        &config.app_id,
        config.request_timeout(),
    )?;
    let fetcher = fetcher::RateFetcher::new(Arc::new(source), config.missing_rate_policy);
    let exporter = export::CsvExporter::new(&config.output_path);

    Ok(pipeline::RatePipeline::new(
        config.pairs.clone(),
        fetcher,
        exporter,
    ))
}
