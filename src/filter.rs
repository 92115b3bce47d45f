// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Hard elimination of structurally ineligible repositories

use crate::types::RepositorySnapshot;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Why a repository was eliminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The account's profile README repository
    ProfileReadme,
    /// A fork of another repository
    Fork,
    /// Archived
    Archived,
    /// Below the size floor
    TooSmall,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProfileReadme => "profile readme",
            Self::Fork => "fork",
            Self::Archived => "archived",
            Self::TooSmall => "below size floor",
        })
    }
}

/// Binary pre-filter applied before enrichment
#[derive(Debug, Clone, Copy)]
pub struct EliminationFilter {
    min_size_kb: u64,
}

impl Default for EliminationFilter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl EliminationFilter {
    /// Create a filter with the given size floor
    #[must_use]
    pub fn new(min_size_kb: u64) -> Self {
        Self { min_size_kb }
    }

    /// First reason `repo` is ineligible, if any
    #[must_use]
    pub fn rejection(&self, repo: &RepositorySnapshot, account: &str) -> Option<Rejection> {
        if repo.name.eq_ignore_ascii_case(account) {
            Some(Rejection::ProfileReadme)
        } else if repo.is_fork {
            Some(Rejection::Fork)
        } else if repo.is_archived {
            Some(Rejection::Archived)
        } else if repo.size_kb < self.min_size_kb {
            Some(Rejection::TooSmall)
        } else {
            None
        }
    }

    /// Keep only eligible repositories, preserving order
    ///
    /// A repository listed more than once (same owner and name, ignoring
    /// case) is kept at its first position only.
    #[must_use]
    pub fn apply(&self, repos: Vec<RepositorySnapshot>, account: &str) -> Vec<RepositorySnapshot> {
        let mut seen = HashSet::with_capacity(repos.len());
        repos
            .into_iter()
            .filter(|repo| {
                let key = (repo.owner.to_lowercase(), repo.name.to_lowercase());
                if seen.insert(key) {
                    true
                } else {
                    debug!(repo = %repo.name, "Dropped duplicate listing");
                    false
                }
            })
            .filter(|repo| match self.rejection(repo, account) {
                Some(reason) => {
                    debug!(repo = %repo.name, %reason, "Eliminated");
                    false
                }
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn repo(name: &str) -> RepositorySnapshot {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RepositorySnapshot {
            name: name.into(),
            owner: "octo".into(),
            created_at: at,
            updated_at: at,
            pushed_at: at,
            is_fork: false,
            is_archived: false,
            has_issues: true,
            has_projects: false,
            has_wiki: false,
            size_kb: 500,
            stars: 0,
            forks: 0,
            open_issues: 0,
            has_license: false,
            description: None,
            url: String::new(),
        }
    }

    #[test]
    fn test_each_check_eliminates() {
        let filter = EliminationFilter::new(10);

        assert_eq!(filter.rejection(&repo("Octo"), "octo"), Some(Rejection::ProfileReadme));

        let mut fork = repo("fork");
        fork.is_fork = true;
        assert_eq!(filter.rejection(&fork, "octo"), Some(Rejection::Fork));

        let mut archived = repo("old");
        archived.is_archived = true;
        assert_eq!(filter.rejection(&archived, "octo"), Some(Rejection::Archived));

        let mut tiny = repo("tiny");
        tiny.size_kb = 9;
        assert_eq!(filter.rejection(&tiny, "octo"), Some(Rejection::TooSmall));

        let mut floor = repo("floor");
        floor.size_kb = 10;
        assert_eq!(filter.rejection(&floor, "octo"), None);
    }

    #[test]
    fn test_partial_name_match_is_kept() {
        let filter = EliminationFilter::default();
        assert_eq!(filter.rejection(&repo("octo-tools"), "octo"), None);
    }

    #[test]
    fn test_apply_preserves_order() {
        let mut fork = repo("b");
        fork.is_fork = true;
        let repos = vec![repo("a"), fork, repo("c"), repo("OCTO")];

        let kept = EliminationFilter::default().apply(repos, "octo");
        let names: Vec<_> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_apply_drops_repeated_listings() {
        let mut first = repo("tool");
        first.stars = 7;
        let mut again = repo("Tool");
        again.stars = 99;
        let mut other_owner = repo("tool");
        other_owner.owner = "someone".into();

        let kept = EliminationFilter::default().apply(vec![first, repo("site"), again, other_owner], "octo");
        let names: Vec<_> = kept.iter().map(|r| (r.owner.as_str(), r.name.as_str())).collect();
        assert_eq!(names, vec![("octo", "tool"), ("octo", "site"), ("someone", "tool")]);
        assert_eq!(kept[0].stars, 7);
    }

    #[test]
    fn test_apply_empty() {
        assert!(EliminationFilter::default().apply(Vec::new(), "octo").is_empty());
    }
}
