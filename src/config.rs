// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management

use crate::activity::EmptyHistoryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Selection policy knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Repositories smaller than this (KB) are eliminated
    pub min_size_kb: u64,
    /// Commits further apart than this many days start a new active block
    pub inactivity_gap_days: u32,
    /// Timeline for repositories without usable commit timestamps
    pub empty_history: EmptyHistoryPolicy,
    /// Top-scored repositories considered by the diversity pass
    pub candidate_pool: usize,
    /// Maximum selected repositories sharing a primary language
    pub language_cap: usize,
    /// Output size when none is requested
    pub default_target: usize,
    /// Largest accepted output size
    pub max_target: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_size_kb: 10,
            inactivity_gap_days: 30,
            empty_history: EmptyHistoryPolicy::SpanRepository,
            candidate_pool: 8,
            language_cap: 2,
            default_target: 5,
            max_target: 8,
        }
    }
}

impl SelectionConfig {
    /// Clamp a requested output size into `1..=max_target`
    #[must_use]
    pub fn clamp_target(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_target)
            .clamp(1, self.max_target.max(1))
    }
}

/// Forge API access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// REST API root
    pub api_base: String,
    /// Repositories enriched at the same time
    pub concurrency: usize,
    /// Timeout for listing an account's repositories, all pages, in seconds
    pub list_timeout_secs: u64,
    /// Timeout for each enrichment field, in seconds
    pub field_timeout_secs: u64,
    /// Pages of 100 commits fetched per repository
    pub commit_pages: u32,
    /// Pages of 100 repositories fetched per account
    pub repo_pages: u32,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            concurrency: 4,
            list_timeout_secs: 30,
            field_timeout_secs: 10,
            commit_pages: 3,
            repo_pages: 5,
            user_agent: format!("repospotlight/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Selection policy
    pub selection: SelectionConfig,
    /// Forge access
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            selection: SelectionConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Look up a dotted key such as `selection.language_cap`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = toml::Value::try_from(self).context("Failed to serialize configuration")?;
        let found = key
            .split('.')
            .try_fold(&value, |node, part| node.get(part));
        Ok(found.map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }
}

/// Default configuration file location
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "repospotlight")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration from `path`, the default location, or defaults
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };

    if !required && !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}
