use std::io::Write;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use wl_cli::commands::{files, phases, requirements, summary, timeline, watch};
use wl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output on stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Summary(args)) => summary::run(&mut stdout, args, &config)?,
        Some(Commands::Phases(args)) => phases::run(&mut stdout, args, &config)?,
        Some(Commands::Timeline(args)) => timeline::run(&mut stdout, args, &config)?,
        Some(Commands::Files(args)) => files::run(&mut stdout, args, &config)?,
        Some(Commands::Requirements(args)) => requirements::run(&mut stdout, args, &config)?,
        Some(Commands::Watch(args)) => watch::run(&mut stdout, args, &config)?,
        None => {
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
