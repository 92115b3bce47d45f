// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repospotlight library - pick the repositories that best represent an account
//!
//! The crate evaluates an account's public repositories and selects a small,
//! ranked, language-diverse set of them, each annotated with the periods of
//! active development reconstructed from its commit history.
//!
//! Pipeline stages, in order:
//! [`filter`] → enrichment through a [`pipeline::SignalSource`] →
//! [`activity`] + [`scoring`] + [`complexity`] → [`selection`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod activity;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod error;
pub mod filter;
pub mod fixture;
pub mod github;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod selection;

/// Core data types shared by every pipeline stage
pub mod types {
    use chrono::{DateTime, Utc};
    use regex::Regex;
    use serde::{Deserialize, Serialize};
    use std::collections::{BTreeMap, BTreeSet};
    use std::fmt;
    use std::sync::OnceLock;

    // =========================================================================
    // Repository Snapshot (input)
    // =========================================================================

    /// Repository metadata as listed by the forge, read-only for a run
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RepositorySnapshot {
        /// Repository name
        pub name: String,
        /// Owning account, used to address enrichment requests
        #[serde(default)]
        pub owner: String,
        /// Creation time
        pub created_at: DateTime<Utc>,
        /// Last metadata update
        pub updated_at: DateTime<Utc>,
        /// Last push
        pub pushed_at: DateTime<Utc>,
        /// Repository is a fork of another
        #[serde(default)]
        pub is_fork: bool,
        /// Repository is archived (read-only)
        #[serde(default)]
        pub is_archived: bool,
        /// Issue tracker enabled
        #[serde(default)]
        pub has_issues: bool,
        /// Projects board enabled
        #[serde(default)]
        pub has_projects: bool,
        /// Wiki enabled
        #[serde(default)]
        pub has_wiki: bool,
        /// Size in kilobytes
        #[serde(default)]
        pub size_kb: u64,
        /// Star count
        #[serde(default)]
        pub stars: u64,
        /// Fork count
        #[serde(default)]
        pub forks: u64,
        /// Open issue count
        #[serde(default)]
        pub open_issues: u64,
        /// A license was detected
        #[serde(default)]
        pub has_license: bool,
        /// Short description
        #[serde(default)]
        pub description: Option<String>,
        /// Canonical web URL
        #[serde(default)]
        pub url: String,
    }

    // =========================================================================
    // Enrichment Bundle (per surviving repository)
    // =========================================================================

    /// A single commit as seen by the scorer
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CommitRecord {
        /// Raw ISO-8601 timestamp; may be malformed
        pub timestamp: String,
        /// First line of the commit message
        #[serde(default)]
        pub message: String,
    }

    impl CommitRecord {
        /// Build a record, keeping only the first line of `message`
        #[must_use]
        pub fn new(timestamp: impl Into<String>, message: &str) -> Self {
            Self {
                timestamp: timestamp.into(),
                message: message.lines().next().unwrap_or_default().trim().to_string(),
            }
        }
    }

    /// README text metrics
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ReadmeInfo {
        /// A README was found
        pub exists: bool,
        /// Length in characters
        pub length: usize,
        /// A usage / getting-started style section is present
        pub has_usage_section: bool,
    }

    fn usage_heading() -> &'static Regex {
        static USAGE: OnceLock<Regex> = OnceLock::new();
        USAGE.get_or_init(|| {
            // ATX / AsciiDoc heading, or a title line underlined with = or -
            Regex::new(
                r"(?im)^[ \t]*(?:#{1,6}|={1,6})[ \t]*(?:usage|getting started|quick ?start|installation|install|how to use|examples?)\b|^[ \t]*(?:usage|getting started|quick ?start|installation|install|how to use|examples?)\b[^\n]*\n[ \t]*(?:=+|-+)[ \t]*\r?$",
            )
            .expect("usage heading pattern is valid")
        })
    }

    impl ReadmeInfo {
        /// Derive metrics from README text
        #[must_use]
        pub fn from_text(text: &str) -> Self {
            Self {
                exists: true,
                length: text.chars().count(),
                has_usage_section: usage_heading().is_match(text),
            }
        }
    }

    /// Root directory listing, names lowercased
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct RootListing {
        /// File names at the repository root
        pub files: BTreeSet<String>,
        /// Directory names at the repository root
        pub dirs: BTreeSet<String>,
    }

    impl RootListing {
        /// Build a listing from raw names, lowercasing them
        #[must_use]
        pub fn new<F, D>(files: F, dirs: D) -> Self
        where
            F: IntoIterator,
            F::Item: AsRef<str>,
            D: IntoIterator,
            D::Item: AsRef<str>,
        {
            Self {
                files: files.into_iter().map(|f| f.as_ref().to_lowercase()).collect(),
                dirs: dirs.into_iter().map(|d| d.as_ref().to_lowercase()).collect(),
            }
        }

        /// True if any of `names` is a root file
        #[must_use]
        pub fn has_any_file(&self, names: &[&str]) -> bool {
            names.iter().any(|n| self.files.contains(*n))
        }

        /// True if any of `names` is a root directory
        #[must_use]
        pub fn has_any_dir(&self, names: &[&str]) -> bool {
            names.iter().any(|n| self.dirs.contains(*n))
        }

        /// True if the listing is empty
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.files.is_empty() && self.dirs.is_empty()
        }
    }

    /// Best-effort signals gathered for one repository
    ///
    /// Every field has an empty default which stands in for a failed fetch.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct EnrichmentBundle {
        /// Language name to byte count
        pub languages: BTreeMap<String, u64>,
        /// Commit records, in any order
        pub commits: Vec<CommitRecord>,
        /// Number of tags (release proxy)
        pub tag_count: u32,
        /// README metrics
        pub readme: ReadmeInfo,
        /// Root directory listing
        pub root: RootListing,
    }

    impl EnrichmentBundle {
        /// The two languages with the most bytes, ties broken by name
        #[must_use]
        pub fn top_languages(&self) -> (Option<String>, Option<String>) {
            let mut ranked: Vec<(&String, &u64)> = self.languages.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let mut names = ranked.into_iter().map(|(name, _)| name.clone());
            (names.next(), names.next())
        }

        /// Total bytes across all languages
        #[must_use]
        pub fn total_language_bytes(&self) -> u64 {
            self.languages.values().sum()
        }
    }

    // =========================================================================
    // Derived Output
    // =========================================================================

    /// A contiguous period of commit activity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ActiveBlock {
        /// First commit of the block
        pub start: DateTime<Utc>,
        /// Last commit of the block
        pub end: DateTime<Utc>,
        /// Whole days spanned, never below 1
        pub duration_days: u32,
    }

    /// The seven quality sub-scores, each in [0, 1]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct SubScores {
        /// README and license signals
        pub documentation: f64,
        /// Structural completeness of the root tree
        pub completeness: f64,
        /// Source layout, tests and lint configuration
        pub code_quality: f64,
        /// Message hygiene, time spread and releases
        pub commit_quality: f64,
        /// Push recency and issue backlog
        pub maintenance: f64,
        /// Log-scaled stars relative to the run maximum
        pub stars: f64,
        /// Log-scaled forks relative to the run maximum
        pub forks: f64,
    }

    /// Ordinal complexity bucket
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub enum ComplexityLabel {
        /// Below 25
        Low,
        /// 25 to 49
        Medium,
        /// 50 to 74
        High,
        /// 75 and above
        #[serde(rename = "Very High")]
        VeryHigh,
    }

    impl ComplexityLabel {
        /// Bucket a rounded complexity score
        #[must_use]
        pub fn from_score(score: u8) -> Self {
            match score {
                75.. => Self::VeryHigh,
                50..=74 => Self::High,
                25..=49 => Self::Medium,
                _ => Self::Low,
            }
        }

        /// Display name
        #[must_use]
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Low => "Low",
                Self::Medium => "Medium",
                Self::High => "High",
                Self::VeryHigh => "Very High",
            }
        }
    }

    impl fmt::Display for ComplexityLabel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// A fully evaluated repository, immutable once built
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ScoredRepository {
        /// Source snapshot
        #[serde(flatten)]
        pub snapshot: RepositorySnapshot,
        /// Language with the most bytes
        pub primary_language: Option<String>,
        /// Language with the second most bytes
        pub secondary_language: Option<String>,
        /// Reconstructed active periods, oldest first
        pub active_blocks: Vec<ActiveBlock>,
        /// Sum of block durations
        pub total_active_days: u32,
        /// Quality sub-scores
        pub sub_scores: SubScores,
        /// Weighted quality score, 0-100 with two decimals
        pub final_score: f64,
        /// Complexity estimate, 0-100
        pub complexity_score: u8,
        /// Complexity bucket
        pub complexity_label: ComplexityLabel,
    }

    impl ScoredRepository {
        /// Repository name
        #[must_use]
        pub fn name(&self) -> &str {
            &self.snapshot.name
        }
    }
}
