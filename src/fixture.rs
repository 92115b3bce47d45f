// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Offline source backed by a JSON document
//!
//! ```json
//! {
//!   "account": "octo",
//!   "repositories": [
//!     { "name": "tool", "created_at": "...", "updated_at": "...", "pushed_at": "...",
//!       "enrichment": { "languages": { "Rust": 1200 }, "commits": [] } }
//!   ]
//! }
//! ```

use crate::error::{FetchError, FetchResult};
use crate::pipeline::SignalSource;
use crate::types::{EnrichmentBundle, RepositorySnapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A snapshot with its pre-recorded enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRepository {
    /// Repository metadata
    #[serde(flatten)]
    pub snapshot: RepositorySnapshot,
    /// Recorded signals; missing means every field failed
    #[serde(default)]
    pub enrichment: EnrichmentBundle,
}

/// Recorded account data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSource {
    /// Account the data belongs to
    pub account: String,
    /// Recorded repositories
    #[serde(default)]
    pub repositories: Vec<FixtureRepository>,
}

impl FixtureSource {
    /// Read a fixture from disk
    pub fn load(path: &Path) -> FetchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FetchError::FixtureIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    /// Parse a fixture document; `origin` names it in errors
    pub fn from_json(content: &str, origin: &str) -> FetchResult<Self> {
        serde_json::from_str(content).map_err(|source| FetchError::Decode {
            what: origin.to_string(),
            source,
        })
    }
}

impl SignalSource for FixtureSource {
    async fn list_repositories(&self, account: &str) -> FetchResult<Vec<RepositorySnapshot>> {
        if !self.account.eq_ignore_ascii_case(account) {
            return Err(FetchError::AccountNotFound(account.to_string()));
        }
        Ok(self
            .repositories
            .iter()
            .map(|r| r.snapshot.clone())
            .collect())
    }

    async fn enrich(&self, repo: &RepositorySnapshot) -> EnrichmentBundle {
        self.repositories
            .iter()
            .find(|r| r.snapshot.name == repo.name)
            .map(|r| r.enrichment.clone())
            .unwrap_or_default()
    }
}
