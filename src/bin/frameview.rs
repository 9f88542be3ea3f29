//! Frameview CLI Binary
//!
//! Command-line interface for reconstructing conversation threads from a
//! frame stream and resolving their content through the blob store.

use clap::Parser;
use frameview::cli::{Cli, RunContext};
use frameview::config::ConfigLoader;
use frameview::logging::{init_logging, LoggingConfig};
use std::io::IsTerminal;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Frameview CLI starting");

    if let Err(e) = run(&cli).await {
        error!("Command failed: {:#}", e);
        let message = match e.downcast_ref::<frameview::error::ApiError>() {
            Some(api) => frameview::cli::map_error(api),
            None => format!("{:#}", e),
        };
        eprintln!("{}", message);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let color = !cli.no_color && std::io::stdout().is_terminal();
    let context = RunContext::new(
        cli.workspace.clone(),
        cli.config.clone(),
        cli.cas_url.clone(),
        color,
    )?;
    info!("CLI context initialized");

    if RunContext::needs_input(&cli.command) {
        context.load_input(&cli.input).await?;
    }

    let output = context.execute(&cli.command).await?;
    info!("Command completed successfully");
    println!("{}", output);
    Ok(())
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    // Logging stays off unless --verbose is set
    if !cli.verbose {
        let mut config = LoggingConfig::default();
        config.level = "off".to_string();
        return config;
    }

    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    // CLI arguments take priority
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
