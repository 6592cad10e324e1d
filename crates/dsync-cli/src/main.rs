use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

mod build_tool;
mod cli;
mod commands;
mod config;
mod report;

#[tokio::main]
async fn main() -> ExitCode {
    let env_loaded = dotenvy::dotenv().is_ok();
    let cli = cli::Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();
    if !env_loaded {
        tracing::debug!("no .env file found, using the process environment");
    }

    let format = cli.format;
    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report::print_error(&err, format);
            ExitCode::from(report::exit_code(&err))
        }
    }
}
