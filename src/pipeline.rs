use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::core::{CurrencyPair, RateSnapshot};
use crate::export::CsvExporter;
use crate::fetcher::RateFetcher;
use crate::scheduler::Job;

/// Fetch followed by export; one call to `run_once` is one tick.
pub struct RatePipeline {
    pairs: Vec<CurrencyPair>,
    fetcher: RateFetcher,
    exporter: CsvExporter,
}

impl RatePipeline {
    pub fn new(pairs: Vec<CurrencyPair>, fetcher: RateFetcher, exporter: CsvExporter) -> Self {
        RatePipeline {
            pairs,
            fetcher,
            exporter,
        }
    }

    pub fn pairs(&self) -> &[CurrencyPair] {
        &self.pairs
    }

    /// A fetch error aborts before the exporter runs, so the previous file is
    /// left as it was.
    pub async fn run_once(&self) -> Result<RateSnapshot> {
        let snapshot = self
            .fetcher
            .fetch(&self.pairs)
            .await
            .context("Failed to fetch exchange rates")?;
        self.exporter.export(&snapshot)?;
        Ok(snapshot)
    }
}

#[async_trait]
impl Job for RatePipeline {
    async fn run(&self) -> Result<()> {
        let snapshot = self.run_once().await?;
        info!(rows = snapshot.len(), "Rates updated");
        Ok(())
    }
}
