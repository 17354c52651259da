//! `slotwatch [--service NAME]` – poll until a slot shows up or Ctrl+C.

use crate::cli::INTERRUPTED_EXIT;
use anyhow::{Context, Result};
use slotwatch_core::config::SlotwatchConfig;
use slotwatch_core::control::StopSignal;
use slotwatch_core::fetch::{CurlTransport, Fetcher};
use slotwatch_core::notify::BrowserSink;
use slotwatch_core::poll::{PollLoop, PollReport, SleepRange};
use slotwatch_core::retry::RetryPolicy;
use slotwatch_core::target::PollTarget;
use std::future::Future;
use std::io;

/// Trip `stop` on the first interrupt from `next_signal`, then wait for a
/// second one. Returns `Ok` only once two interrupts have arrived.
pub(crate) async fn forward_interrupts<F, Fut>(stop: &StopSignal, mut next_signal: F) -> io::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    next_signal().await?;
    tracing::info!("stopping; press Ctrl+C again to exit immediately");
    stop.stop();
    next_signal().await
}

/// First Ctrl+C stops the loop gracefully; a second one exits at once.
async fn stop_on_ctrl_c(stop: StopSignal) {
    match forward_interrupts(&stop, tokio::signal::ctrl_c).await {
        Ok(()) => {
            tracing::warn!("second Ctrl+C, exiting without waiting for the poll loop");
            std::process::exit(i32::from(INTERRUPTED_EXIT));
        }
        Err(e) => tracing::warn!("could not listen for Ctrl+C: {}", e),
    }
}

pub async fn run_watch(cfg: &SlotwatchConfig, service: Option<&str>) -> Result<PollReport> {
    let target = PollTarget::from_config(cfg, service)?;
    let range = SleepRange::try_from(&cfg.poll)?;
    let policy = RetryPolicy::from(&cfg.retry);
    let transport = CurlTransport::new(&cfg.http).context("setting up HTTP client")?;

    let stop = StopSignal::new();
    let signal_task = tokio::spawn(stop_on_ctrl_c(stop.clone()));

    let report = tokio::task::spawn_blocking(move || {
        let fetcher = Fetcher::new(transport, policy, stop.clone());
        PollLoop::new(target, fetcher, BrowserSink::new(), stop, range).run()
    })
    .await
    .context("poll task join")?;

    signal_task.abort();
    Ok(report?)
}
