// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Complexity estimate - descriptive label, never used for ranking

use crate::activity::ActivityTimeline;
use crate::types::{ComplexityLabel, EnrichmentBundle, RepositorySnapshot};
use serde::{Deserialize, Serialize};

const COMPLEXITY_KEYWORDS: &[&str] = &["refactor", "optimize", "restructure", "performance"];

/// Rounded complexity score with its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityEstimate {
    /// 0-100
    pub score: u8,
    /// Bucket derived from `score`
    pub label: ComplexityLabel,
}

/// Codebase size, up to 30
#[must_use]
pub fn size_points(total_bytes: u64) -> f64 {
    ((total_bytes as f64 + 1.0).log10() / 7.0 * 30.0).min(30.0)
}

/// Language breadth, up to 20
#[must_use]
pub fn breadth_points(language_count: usize) -> f64 {
    (language_count as f64 * 4.0).min(20.0)
}

/// Commit density and structural keywords, up to 20
#[must_use]
pub fn commit_points(bundle: &EnrichmentBundle, timeline: &ActivityTimeline) -> f64 {
    let active_days = f64::from(timeline.total_active_days.max(1));
    let density = (timeline.commit_count as f64 / active_days * 5.0).min(10.0);
    let structural = bundle.commits.iter().any(|c| {
        let message = c.message.to_lowercase();
        COMPLEXITY_KEYWORDS.iter().any(|k| message.contains(k))
    });
    (density + if structural { 10.0 } else { 0.0 }).min(20.0)
}

/// Sustained activity, up to 20
#[must_use]
pub fn longevity_points(timeline: &ActivityTimeline) -> f64 {
    (f64::from(timeline.total_active_days) / 365.0 * 15.0 + timeline.blocks.len() as f64).min(20.0)
}

/// Project tooling switched on, up to 10
#[must_use]
pub fn maturity_points(snapshot: &RepositorySnapshot) -> f64 {
    let enabled = [snapshot.has_issues, snapshot.has_projects, snapshot.has_wiki]
        .iter()
        .filter(|f| **f)
        .count();
    enabled as f64 * 10.0 / 3.0
}

/// Estimate complexity from size, breadth, commits, longevity and maturity
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate(
    snapshot: &RepositorySnapshot,
    bundle: &EnrichmentBundle,
    timeline: &ActivityTimeline,
) -> ComplexityEstimate {
    let raw = size_points(bundle.total_language_bytes())
        + breadth_points(bundle.languages.len())
        + commit_points(bundle, timeline)
        + longevity_points(timeline)
        + maturity_points(snapshot);
    let score = raw.clamp(0.0, 100.0).round() as u8;
    ComplexityEstimate {
        score,
        label: ComplexityLabel::from_score(score),
    }
}
