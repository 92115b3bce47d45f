// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rank command - evaluate an account and print its best repositories

use crate::config::Config;
use crate::fixture::FixtureSource;
use crate::github::GitHubClient;
use crate::pipeline::Pipeline;
use crate::report::{self, OutputFormat};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the rank command
pub struct RankArgs {
    /// Account to evaluate
    pub account: String,
    /// Requested output size
    pub top: Option<usize>,
    /// Read recorded data instead of calling the API
    pub fixture: Option<PathBuf>,
    /// API token
    pub token: Option<String>,
    /// Output format
    pub format: OutputFormat,
    /// Output file or directory (stdout if not specified)
    pub output: Option<PathBuf>,
    /// Colorize text output
    pub color: bool,
}

/// Run the rank command
pub async fn run(config: &Config, args: RankArgs) -> Result<()> {
    let target = config.selection.clamp_target(args.top);
    let pipeline = Pipeline::new(&config.selection, config.fetch.concurrency);
    let now = Utc::now();

    info!("Ranking repositories for {} (top {})", args.account, target);

    let selected = match &args.fixture {
        Some(path) => {
            let source = FixtureSource::load(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            pipeline.run(&source, &args.account, target, now).await
        }
        None => {
            let client = GitHubClient::new(&config.fetch, args.token.clone())
                .context("Failed to build HTTP client")?;
            pipeline.run(&client, &args.account, target, now).await
        }
    }
    .with_context(|| format!("Failed to evaluate repositories of {}", args.account))?;

    let color = args.color && args.output.is_none() && args.format != OutputFormat::Json;
    let content = report::render(&selected, args.format, color)?;

    match args.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(format!("{}.{}", args.account, args.format.extension()))
            } else {
                path
            };
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} repositories to {}", selected.len(), path.display());
        }
        None => {
            print!("{content}");
            if args.format == OutputFormat::Json {
                println!();
            }
        }
    }

    Ok(())
}
