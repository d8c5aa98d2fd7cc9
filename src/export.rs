//! CSV output for rate snapshots.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::core::RateSnapshot;

pub const HEADER: [&str; 3] = ["Pair", "Value", "Date"];
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvExporter { path: path.into() }
    }

    /// Overwrites the output file with a header line and one row per record.
    /// The file is truncated in place, so an interrupted write leaves a
    /// partial file behind.
    pub fn export(&self, snapshot: &RateSnapshot) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&self.path)
            .with_context(|| format!("Failed to create CSV file: {}", self.path.display()))?;

        writer
            .write_record(HEADER)
            .with_context(|| format!("Failed to write header to {}", self.path.display()))?;

        for record in snapshot {
            writer
                .write_record([
                    record.pair.to_string(),
                    record.value.to_string(),
                    record.timestamp.format(DATE_FORMAT).to_string(),
                ])
                .with_context(|| {
                    format!(
                        "Failed to write {} to {}",
                        record.pair,
                        self.path.display()
                    )
                })?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            rows = snapshot.len(),
            "Rates saved to CSV"
        );
        Ok(())
    }
}
