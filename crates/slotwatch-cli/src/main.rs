mod cli;

use crate::cli::Cli;
use clap::Parser;
use slotwatch_core::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    logging::init_logging(cli.log_file.as_deref());

    match cli.run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("slotwatch error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
