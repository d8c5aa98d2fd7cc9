use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::ui::{StyleType, style_text};
use crate::core::config::AppConfig;
use crate::pipeline::RatePipeline;
use crate::scheduler::Scheduler;

/// Runs the pipeline on the configured period until Enter or Ctrl-C.
pub async fn watch(config: &AppConfig, pipeline: RatePipeline) -> Result<()> {
    let scheduler = Scheduler::new(config.interval());
    let handle = scheduler.shutdown_handle();
    let pipeline = Arc::new(pipeline);

    info!(
        period_secs = config.interval_secs,
        pairs = pipeline.pairs().len(),
        "Starting rate updates"
    );
    let task = tokio::spawn(async move { scheduler.run(pipeline.as_ref()).await });

    println!(
        "{} {}",
        style_text("Press Enter to exit...", StyleType::Prompt),
        style_text(
            &format!("(writing {})", config.output_path.display()),
            StyleType::Subtle
        )
    );
    wait_for_exit().await?;

    handle.shutdown();
    let ticks = task.await.context("Scheduler task failed")?;
    info!(ticks, "Stopped rate updates");
    Ok(())
}

/// Resolves on a line from stdin or on Ctrl-C. With stdin closed only Ctrl-C
/// is waited for.
async fn wait_for_exit() -> Result<()> {
    let (tx, rx) = oneshot::channel();

    // Blocking stdin reads would hold up runtime shutdown, so they get their own thread
    std::thread::spawn(move || {
        let mut line = String::new();
        let got_line = matches!(std::io::stdin().lock().read_line(&mut line), Ok(n) if n > 0);
        if got_line {
            let _ = tx.send(());
        }
    });

    tokio::select! {
        res = rx => {
            if res.is_ok() {
                debug!("Exit requested from stdin");
                return Ok(());
            }
            debug!("stdin closed, waiting for Ctrl-C");
            tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
        }
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl-C")?;
        }
    }
    debug!("Exit requested by Ctrl-C");
    Ok(())
}
