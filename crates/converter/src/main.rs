use std::fs;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mat_to_csv::config::{resolve, Args, FileConfig};
use mat_to_csv::prompt::{Ask, NoPrompt, Prompter};
use pipeline::{default_reader, Converter};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct Summary<'a> {
    config: &'a eeg_types::RunConfig,
    report: &'a pipeline::RunReport,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = match args.verbose {
        0 => "mat_to_csv=info,pipeline=info",
        1 => "mat_to_csv=debug,pipeline=debug",
        _ => "mat_to_csv=trace,pipeline=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting conversion...");

    // --- Configuration ---
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut ask: Box<dyn Ask> = if !args.no_prompt && io::stdin().is_terminal() {
        Box::new(Prompter::stdio())
    } else {
        Box::new(NoPrompt)
    };
    let config = resolve(&args, file_config, ask.as_mut())?;
    tracing::debug!(?config, "Resolved run configuration");

    // --- Conversion ---
    let reader = default_reader();
    let converter = Converter::new(&config, reader.as_ref())?;
    let report = converter.run()?;

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&Summary {
            config: &config,
            report: &report,
        })?;
        fs::write(path, json)
            .with_context(|| format!("Could not write summary to '{}'", path.display()))?;
        tracing::info!("Wrote run summary to {}", path.display());
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(
            "{} of {} file(s) failed to convert",
            report.failed(),
            report.outcomes.len()
        );
        Ok(ExitCode::FAILURE)
    }
}
