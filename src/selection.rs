// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Diversity selection - top-N under a per-language cap

use crate::types::ScoredRepository;
use std::collections::HashMap;
use tracing::debug;

/// Sort descending by final score; ties keep their input order
pub fn rank_by_score(repos: &mut [ScoredRepository]) {
    repos.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
}

/// Picks the final list from score-ranked candidates
#[derive(Debug, Clone, Copy)]
pub struct DiversitySelector {
    candidate_pool: usize,
    language_cap: usize,
}

impl Default for DiversitySelector {
    fn default() -> Self {
        Self::new(8, 2)
    }
}

impl DiversitySelector {
    /// Create a selector considering the top `candidate_pool` entries
    #[must_use]
    pub fn new(candidate_pool: usize, language_cap: usize) -> Self {
        Self { candidate_pool, language_cap }
    }

    /// Size of the candidate pool
    #[must_use]
    pub fn candidate_pool(&self) -> usize {
        self.candidate_pool
    }

    /// Maximum repositories sharing a primary language
    #[must_use]
    pub fn language_cap(&self) -> usize {
        self.language_cap
    }

    /// Select up to `target` repositories from `ranked`
    ///
    /// `ranked` must already be sorted by [`rank_by_score`]. Repositories with
    /// no detected language share one bucket. The result is shorter than
    /// `target` when the cap leaves too few admissible candidates.
    #[must_use]
    pub fn select(&self, ranked: Vec<ScoredRepository>, target: usize) -> Vec<ScoredRepository> {
        let mut counts: HashMap<Option<String>, usize> = HashMap::new();
        let mut selected = Vec::with_capacity(target.min(self.candidate_pool));

        for repo in ranked.into_iter().take(self.candidate_pool) {
            if selected.len() >= target {
                break;
            }
            let count = counts.entry(repo.primary_language.clone()).or_insert(0);
            if *count >= self.language_cap {
                debug!(
                    repo = %repo.name(),
                    language = repo.primary_language.as_deref().unwrap_or("unknown"),
                    "Skipped by language cap"
                );
                continue;
            }
            *count += 1;
            selected.push(repo);
        }

        selected
    }
}
