//! CLI for the slotwatch appointment monitor.

mod commands;

use anyhow::Result;
use clap::Parser;
use slotwatch_core::config::{self, SlotwatchConfig};
use slotwatch_core::poll::{PollReport, Termination};
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_list_services, run_watch};

/// Conventional exit status for a process stopped by SIGINT.
pub(crate) const INTERRUPTED_EXIT: u8 = 130;

/// Watch an appointment page and open it once a slot is available.
#[derive(Debug, Parser)]
#[command(name = "slotwatch", version)]
#[command(about = "Monitor Berlin service appointments and open the page once a slot appears", long_about = None)]
pub struct Cli {
    /// Service to monitor (default: `default_service` from the config).
    #[arg(short, long, value_name = "NAME")]
    pub service: Option<String>,

    /// Config file to use instead of ~/.config/slotwatch/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the configured services and exit.
    #[arg(long)]
    pub list_services: bool,

    /// Exit with status 130 when stopped by Ctrl+C instead of 0.
    #[arg(long)]
    pub strict_exit: bool,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        if self.list_services {
            run_list_services(&cfg);
            return Ok(ExitCode::SUCCESS);
        }

        let report = run_watch(&cfg, self.service.as_deref()).await?;
        Ok(ExitCode::from(exit_status(&report, self.strict_exit)))
    }

    fn load_config(&self) -> Result<SlotwatchConfig> {
        match &self.config {
            Some(path) => config::load_from_path(path),
            None => {
                let cfg = config::load_or_init()?;
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }
}

/// Both terminal reasons are a clean exit unless `strict` asks to tell them apart.
pub fn exit_status(report: &PollReport, strict: bool) -> u8 {
    match report.reason {
        Termination::UserInterrupted if strict => INTERRUPTED_EXIT,
        Termination::UserInterrupted | Termination::AvailabilityFound => 0,
    }
}

#[cfg(test)]
mod tests;
