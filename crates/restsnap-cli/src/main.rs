//! restsnap CLI main entry point

use clap::Parser;
use restsnap_cli::{
    cli::{Cli, Commands},
    commands::{ListCommand, RunCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::info;

/// Exit code for errors that stopped the run
const EXIT_FATAL: i32 = 2;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            EXIT_FATAL
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<i32> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("restsnap v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run { args } => Ok(RunCommand::run(&args).await?.exit_code()),
        Commands::List { requests, config } => {
            ListCommand::run(requests, config).await?;
            Ok(0)
        }
    }
}
