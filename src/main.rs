// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repospotlight CLI - pick the repositories that best represent an account

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use repospotlight::commands;
use repospotlight::commands::rank::RankArgs;
use repospotlight::config;
use repospotlight::report::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repospotlight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "REPOSPOTLIGHT_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Disable colored output (any non-empty NO_COLOR also disables it)
    #[arg(
        long,
        env = "NO_COLOR",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank an account's repositories and print the selection
    Rank {
        /// Account name
        account: String,

        /// Number of repositories to select
        #[arg(short, long)]
        top: Option<usize>,

        /// Read recorded account data from a JSON file instead of the API
        #[arg(long)]
        fixture: Option<std::path::PathBuf>,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file, or directory to write `<account>.<ext>` into (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Inspect configuration
    Config {
        /// Action: show, path, get
        #[arg(default_value = "show")]
        action: String,

        /// Dotted key for `get`
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Rank { account, top, fixture, token, format, output } => {
            let args = RankArgs {
                account,
                top,
                fixture,
                token,
                format,
                output,
                color: !cli.no_color,
            };
            commands::rank::run(&config, args).await
        }
        Commands::Config { action, key } => {
            commands::config::run(&config, &action, key.as_deref())
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
