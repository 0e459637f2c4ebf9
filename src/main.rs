//! Sitesmith - generate complete websites from form data with an LLM.

mod asset;
mod cli;
mod config;
mod core;
mod generator;
mod logger;
mod package;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AppConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Commands::Types = cli.command {
        cli::generate::list_types();
        return Ok(());
    }

    let config = AppConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(&config),
        Commands::Generate { args } => cli::generate::generate_site(args, &config),
        Commands::Types => Ok(()),
    }
}
