use clap::Parser;
use colored::Colorize;
use eyre::Result;
use knowledge_core::{ClientConfig, HttpEntryApi};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn setup_logging(verbose: bool) {
    let default = default_filter(verbose);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    tracing::debug!(api_url = %cli.api_url, "starting");

    let api = HttpEntryApi::new(&ClientConfig::new(&cli.api_url));
    let report = commands::execute(cli.command, api).await?;

    if let Some(notice) = &report.notice {
        println!("{}", notice.green());
    }
    if let Some(error) = &report.refresh_error {
        eprintln!("{}", format!("Could not reload entries: {error}").yellow());
    } else {
        print!("{}", commands::render_entries(&report.entries));
    }
    Ok(())
}
