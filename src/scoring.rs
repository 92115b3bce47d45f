// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Quality scoring - seven weighted factors folded into a 0-100 score
//!
//! Every factor maps its signals into [0, 1]. The final score is the
//! weighted sum of the factors scaled to 100 and rounded to two decimals.
//! Factors and weights live in [`FACTORS`] so each can be audited and tested
//! on its own.
//!
//! Star and fork bonuses are relative to the best repository of the run. The
//! maxima are gathered once into a [`ScoringContext`] before any repository
//! is scored and passed in explicitly.

use crate::activity::parse_timestamp;
use crate::types::{EnrichmentBundle, RepositorySnapshot, SubScores};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

// =============================================================================
// Run context
// =============================================================================

/// Run-wide values shared by every repository's score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringContext {
    /// Reference time for recency
    pub now: DateTime<Utc>,
    /// Highest star count among surviving candidates
    pub max_stars: u64,
    /// Highest fork count among surviving candidates
    pub max_forks: u64,
}

impl ScoringContext {
    /// Gather run-wide maxima from every surviving snapshot
    pub fn gather<'a, I>(snapshots: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a RepositorySnapshot>,
    {
        let (max_stars, max_forks) = snapshots
            .into_iter()
            .fold((0, 0), |(s, f), r| (s.max(r.stars), f.max(r.forks)));
        Self { now, max_stars, max_forks }
    }
}

/// Everything a factor transform may look at
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    /// Repository metadata
    pub snapshot: &'a RepositorySnapshot,
    /// Enrichment signals
    pub bundle: &'a EnrichmentBundle,
    /// Run-wide context
    pub context: &'a ScoringContext,
}

// =============================================================================
// Factor table
// =============================================================================

/// Quality factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// README and license
    Documentation,
    /// Structural completeness
    Completeness,
    /// Source layout, tests, lint configuration
    CodeQuality,
    /// Commit hygiene
    CommitQuality,
    /// Recency and issue backlog
    Maintenance,
    /// Star bonus
    Stars,
    /// Fork bonus
    Forks,
}

/// A factor with its weight and transform
#[derive(Clone, Copy)]
pub struct FactorPolicy {
    /// Which factor
    pub factor: Factor,
    /// Share of the final score
    pub weight: f64,
    /// Signal transform, result clamped to [0, 1]
    pub transform: fn(&ScoringInput<'_>) -> f64,
}

/// The scoring policy; weights sum to 1.0
pub const FACTORS: [FactorPolicy; 7] = [
    FactorPolicy { factor: Factor::Documentation, weight: 0.25, transform: documentation },
    FactorPolicy { factor: Factor::Completeness, weight: 0.20, transform: completeness },
    FactorPolicy { factor: Factor::CodeQuality, weight: 0.20, transform: code_quality },
    FactorPolicy { factor: Factor::CommitQuality, weight: 0.10, transform: commit_quality },
    FactorPolicy { factor: Factor::Maintenance, weight: 0.10, transform: maintenance },
    FactorPolicy { factor: Factor::Stars, weight: 0.10, transform: stars_bonus },
    FactorPolicy { factor: Factor::Forks, weight: 0.05, transform: forks_bonus },
];

impl SubScores {
    /// Value of one factor
    #[must_use]
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Documentation => self.documentation,
            Factor::Completeness => self.completeness,
            Factor::CodeQuality => self.code_quality,
            Factor::CommitQuality => self.commit_quality,
            Factor::Maintenance => self.maintenance,
            Factor::Stars => self.stars,
            Factor::Forks => self.forks,
        }
    }

    fn set(&mut self, factor: Factor, value: f64) {
        let slot = match factor {
            Factor::Documentation => &mut self.documentation,
            Factor::Completeness => &mut self.completeness,
            Factor::CodeQuality => &mut self.code_quality,
            Factor::CommitQuality => &mut self.commit_quality,
            Factor::Maintenance => &mut self.maintenance,
            Factor::Stars => &mut self.stars,
            Factor::Forks => &mut self.forks,
        };
        *slot = value;
    }
}

/// Compute all seven sub-scores
#[must_use]
pub fn sub_scores(input: &ScoringInput<'_>) -> SubScores {
    let mut scores = SubScores::default();
    for policy in &FACTORS {
        scores.set(policy.factor, (policy.transform)(input).clamp(0.0, 1.0));
    }
    scores
}

/// Weighted sum scaled to 0-100, rounded to two decimals
#[must_use]
pub fn final_score(scores: &SubScores) -> f64 {
    let weighted: f64 = FACTORS
        .iter()
        .map(|p| p.weight * scores.get(p.factor))
        .sum();
    ((weighted * 100.0 * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

// =============================================================================
// Documentation
// =============================================================================

fn readme_length_bucket(length: usize) -> f64 {
    match length {
        2000.. => 1.0,
        1000..=1999 => 0.8,
        500..=999 => 0.6,
        200..=499 => 0.3,
        _ => 0.0,
    }
}

/// README presence, length, usage section and license
#[must_use]
pub fn documentation(input: &ScoringInput<'_>) -> f64 {
    let readme = &input.bundle.readme;
    let mut score = 0.0;
    if readme.exists {
        score += 0.4;
        score += 0.3 * readme_length_bucket(readme.length);
        if readme.has_usage_section {
            score += 0.2;
        }
    }
    if input.snapshot.has_license {
        score += 0.1;
    }
    score
}

// =============================================================================
// Completeness
// =============================================================================

const MANIFEST_FILES: &[&str] = &[
    "package.json", "cargo.toml", "requirements.txt", "pyproject.toml", "setup.py",
    "pipfile", "go.mod", "pom.xml", "build.gradle", "build.gradle.kts", "gemfile",
    "composer.json", "mix.exs", "pubspec.yaml", "deno.json", "cmakelists.txt",
    "package.swift", "stack.yaml", "dune-project",
];

const CI_FILES: &[&str] = &[
    "dockerfile", "docker-compose.yml", "docker-compose.yaml", "compose.yaml",
    ".travis.yml", ".gitlab-ci.yml", "jenkinsfile", "makefile", "justfile",
    "azure-pipelines.yml", "vercel.json", "netlify.toml", "procfile",
];

const CI_DIRS: &[&str] = &[".github", ".circleci", ".buildkite", ".devcontainer"];

const IGNORE_FILES: &[&str] = &[".gitignore", ".dockerignore", ".npmignore"];

const CONFIG_FILES: &[&str] = &[
    ".env.example", ".env.sample", ".env.template", ".editorconfig", "tsconfig.json",
    "config.yml", "config.yaml", "config.json", "config.toml", "settings.py",
    ".nvmrc", ".tool-versions", "rust-toolchain.toml",
];

const CONFIG_DIRS: &[&str] = &["config", "configs", ".config"];

/// Fraction of four structural checks present at the root
#[must_use]
pub fn completeness(input: &ScoringInput<'_>) -> f64 {
    let root = &input.bundle.root;
    let checks = [
        root.has_any_file(MANIFEST_FILES),
        root.has_any_file(CI_FILES) || root.has_any_dir(CI_DIRS),
        root.has_any_file(IGNORE_FILES),
        root.has_any_file(CONFIG_FILES) || root.has_any_dir(CONFIG_DIRS),
    ];
    checks.iter().filter(|c| **c).count() as f64 / checks.len() as f64
}

// =============================================================================
// Code quality
// =============================================================================

const SOURCE_DIRS: &[&str] = &["src", "lib", "app", "pkg", "cmd", "internal", "source", "crates"];

const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "spec", "specs", "testing"];

const LINT_FILES: &[&str] = &[
    ".eslintrc", ".eslintrc.js", ".eslintrc.cjs", ".eslintrc.json", ".eslintrc.yml",
    "eslint.config.js", "eslint.config.mjs", ".prettierrc", ".prettierrc.json",
    "prettier.config.js", "biome.json", "rustfmt.toml", ".rustfmt.toml", "clippy.toml",
    ".flake8", ".pylintrc", "ruff.toml", ".golangci.yml", ".golangci.yaml",
    ".stylelintrc", ".rubocop.yml", ".clang-format", ".pre-commit-config.yaml",
];

fn is_test_file(name: &str) -> bool {
    name.starts_with("test_")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name.contains("_test.")
}

/// Conventional source folder, tests and lint configuration
#[must_use]
pub fn code_quality(input: &ScoringInput<'_>) -> f64 {
    let root = &input.bundle.root;
    let mut score = 0.0;
    if root.has_any_dir(SOURCE_DIRS) {
        score += 0.4;
    }
    if root.has_any_dir(TEST_DIRS) || root.files.iter().any(|f| is_test_file(f)) {
        score += 0.3;
    }
    if root.has_any_file(LINT_FILES) {
        score += 0.3;
    }
    score
}

// =============================================================================
// Commit quality
// =============================================================================

fn noise_pattern() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| {
        Regex::new(
            r"(?i)^(\.+|wip|tmp|temp|test|testing|asdf|foo|bar|stuff|changes|update|updates|fix|fixes|commit|misc|minor|edit|edits|save|x+)[.!\s]*$",
        )
        .expect("noise pattern is valid")
    })
}

fn is_repeated_letter(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| !c.is_whitespace());
    match chars.next() {
        Some(first) if first.is_alphabetic() => chars.all(|c| c.eq_ignore_ascii_case(&first)),
        _ => false,
    }
}

/// A commit message carries information
#[must_use]
pub fn is_meaningful_message(message: &str) -> bool {
    let line = message.lines().next().unwrap_or_default().trim();
    if line.chars().count() < 3 {
        return false;
    }
    if noise_pattern().is_match(line) || is_repeated_letter(line) {
        return false;
    }
    line.chars().count() >= 10 || line.contains(':') || line.contains(' ')
}

fn spread_bucket(distinct_days: usize) -> f64 {
    match distinct_days {
        0 => 0.0,
        1..=2 => 0.2,
        3..=6 => 0.4,
        7..=13 => 0.6,
        14..=29 => 0.8,
        _ => 1.0,
    }
}

/// Message hygiene, distinct active days and releases
#[must_use]
pub fn commit_quality(input: &ScoringInput<'_>) -> f64 {
    let commits = &input.bundle.commits;
    let mut score = 0.0;

    if !commits.is_empty() {
        let meaningful = commits
            .iter()
            .filter(|c| is_meaningful_message(&c.message))
            .count();
        score += 0.5 * meaningful as f64 / commits.len() as f64;

        let days: BTreeSet<_> = commits
            .iter()
            .filter_map(|c| parse_timestamp(&c.timestamp))
            .map(|ts| ts.date_naive())
            .collect();
        score += 0.3 * spread_bucket(days.len());
    }

    if input.bundle.tag_count > 0 {
        score += 0.2;
    }
    score
}

// =============================================================================
// Maintenance
// =============================================================================

fn recency_bucket(days_since_push: i64) -> f64 {
    match days_since_push {
        i64::MIN..=30 => 1.0,
        31..=90 => 0.8,
        91..=180 => 0.6,
        181..=365 => 0.4,
        _ => 0.2,
    }
}

fn issue_health(open_issues: u64) -> f64 {
    match open_issues {
        0..=10 => 1.0,
        11..=50 => 0.6,
        _ => 0.3,
    }
}

/// Push recency and open-issue backlog
#[must_use]
pub fn maintenance(input: &ScoringInput<'_>) -> f64 {
    let snapshot = input.snapshot;
    let days = (input.context.now - snapshot.pushed_at).num_days();
    let mut score = 0.6 * recency_bucket(days);
    if snapshot.has_issues {
        score += 0.4 * issue_health(snapshot.open_issues);
    }
    score
}

// =============================================================================
// Popularity bonuses
// =============================================================================

/// `ln(value + 1) / ln(max + 1)`, zero when either side is zero
#[must_use]
pub fn log_ratio(value: u64, max: u64) -> f64 {
    if value == 0 || max == 0 {
        return 0.0;
    }
    let denominator = (max.max(1) as f64 + 1.0).ln();
    ((value as f64 + 1.0).ln() / denominator).min(1.0)
}

/// Stars relative to the run maximum
#[must_use]
pub fn stars_bonus(input: &ScoringInput<'_>) -> f64 {
    log_ratio(input.snapshot.stars, input.context.max_stars)
}

/// Forks relative to the run maximum
#[must_use]
pub fn forks_bonus(input: &ScoringInput<'_>) -> f64 {
    log_ratio(input.snapshot.forks, input.context.max_forks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitRecord, ReadmeInfo, RootListing};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn snapshot(pushed_days_ago: i64) -> RepositorySnapshot {
        RepositorySnapshot {
            name: "sample".into(),
            owner: "someone".into(),
            created_at: now() - Duration::days(900),
            updated_at: now() - Duration::days(pushed_days_ago),
            pushed_at: now() - Duration::days(pushed_days_ago),
            is_fork: false,
            is_archived: false,
            has_issues: false,
            has_projects: false,
            has_wiki: false,
            size_kb: 120,
            stars: 0,
            forks: 0,
            open_issues: 0,
            has_license: false,
            description: None,
            url: String::new(),
        }
    }

    fn context(max_stars: u64, max_forks: u64) -> ScoringContext {
        ScoringContext { now: now(), max_stars, max_forks }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = FACTORS.iter().map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_documentation_full_marks() {
        let mut snap = snapshot(0);
        snap.has_license = true;
        let bundle = EnrichmentBundle {
            readme: ReadmeInfo { exists: true, length: 4000, has_usage_section: true },
            ..Default::default()
        };
        let ctx = context(0, 0);
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert!((documentation(&input) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_documentation_short_readme() {
        let snap = snapshot(0);
        let bundle = EnrichmentBundle {
            readme: ReadmeInfo { exists: true, length: 250, has_usage_section: false },
            ..Default::default()
        };
        let ctx = context(0, 0);
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert!((documentation(&input) - 0.49).abs() < 1e-9);
    }

    #[test]
    fn test_readme_length_buckets() {
        assert_eq!(readme_length_bucket(0), 0.0);
        assert_eq!(readme_length_bucket(199), 0.0);
        assert_eq!(readme_length_bucket(200), 0.3);
        assert_eq!(readme_length_bucket(500), 0.6);
        assert_eq!(readme_length_bucket(1000), 0.8);
        assert_eq!(readme_length_bucket(2000), 1.0);
    }

    #[test]
    fn test_completeness_counts_checks() {
        let snap = snapshot(0);
        let ctx = context(0, 0);

        let bundle = EnrichmentBundle {
            root: RootListing::new(["Cargo.toml", ".gitignore"], [".github"]),
            ..Default::default()
        };
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert!((completeness(&input) - 0.75).abs() < 1e-9);

        let empty = EnrichmentBundle::default();
        let input = ScoringInput { snapshot: &snap, bundle: &empty, context: &ctx };
        assert_eq!(completeness(&input), 0.0);
    }

    #[test]
    fn test_code_quality_components() {
        let snap = snapshot(0);
        let ctx = context(0, 0);

        let bundle = EnrichmentBundle {
            root: RootListing::new(["rustfmt.toml"], ["src", "tests"]),
            ..Default::default()
        };
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert!((code_quality(&input) - 1.0).abs() < 1e-9);

        let bundle = EnrichmentBundle {
            root: RootListing::new(["app.test.js"], Vec::<String>::new()),
            ..Default::default()
        };
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert!((code_quality(&input) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_meaningful_messages() {
        assert!(is_meaningful_message("feat: add parser"));
        assert!(is_meaningful_message("Add retry to fetch"));
        assert!(is_meaningful_message("fix: typo"));
        assert!(is_meaningful_message("refactoring"));

        assert!(!is_meaningful_message("..."));
        assert!(!is_meaningful_message("wip"));
        assert!(!is_meaningful_message("WIP"));
        assert!(!is_meaningful_message("tmp"));
        assert!(!is_meaningful_message("aaaa"));
        assert!(!is_meaningful_message("update"));
        assert!(!is_meaningful_message("fix"));
        assert!(!is_meaningful_message("ok"));
        assert!(!is_meaningful_message("refactor"));
    }

    #[test]
    fn test_commit_quality_spread_and_tags() {
        let snap = snapshot(0);
        let ctx = context(0, 0);
        let commits: Vec<CommitRecord> = (0..30)
            .map(|d| CommitRecord::new((now() - Duration::days(d)).to_rfc3339(), "feat: step"))
            .collect();
        let bundle = EnrichmentBundle { commits, tag_count: 3, ..Default::default() };
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert!((commit_quality(&input) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_commit_quality_empty_history() {
        let snap = snapshot(0);
        let ctx = context(0, 0);
        let bundle = EnrichmentBundle::default();
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        assert_eq!(commit_quality(&input), 0.0);
    }

    #[test]
    fn test_spread_buckets() {
        assert_eq!(spread_bucket(1), 0.2);
        assert_eq!(spread_bucket(3), 0.4);
        assert_eq!(spread_bucket(7), 0.6);
        assert_eq!(spread_bucket(14), 0.8);
        assert_eq!(spread_bucket(30), 1.0);
    }

    #[test]
    fn test_maintenance_recency_and_issues() {
        let ctx = context(0, 0);
        let bundle = EnrichmentBundle::default();

        let mut fresh = snapshot(10);
        fresh.has_issues = true;
        fresh.open_issues = 3;
        let input = ScoringInput { snapshot: &fresh, bundle: &bundle, context: &ctx };
        assert!((maintenance(&input) - 1.0).abs() < 1e-9);

        let mut busy = snapshot(100);
        busy.has_issues = true;
        busy.open_issues = 80;
        let input = ScoringInput { snapshot: &busy, bundle: &bundle, context: &ctx };
        assert!((maintenance(&input) - (0.6 * 0.6 + 0.4 * 0.3)).abs() < 1e-9);

        let stale = snapshot(400);
        let input = ScoringInput { snapshot: &stale, bundle: &bundle, context: &ctx };
        assert!((maintenance(&input) - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_log_ratio() {
        assert_eq!(log_ratio(0, 100), 0.0);
        assert_eq!(log_ratio(5, 0), 0.0);
        assert!((log_ratio(100, 100) - 1.0).abs() < 1e-9);
        let half = log_ratio(9, 99);
        assert!((half - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_context_gathers_maxima() {
        let mut a = snapshot(0);
        a.stars = 12;
        a.forks = 1;
        let mut b = snapshot(0);
        b.stars = 3;
        b.forks = 7;
        let ctx = ScoringContext::gather([&a, &b], now());
        assert_eq!(ctx.max_stars, 12);
        assert_eq!(ctx.max_forks, 7);
    }

    #[test]
    fn test_neglected_repository_scores_near_floor() {
        let snap = snapshot(400);
        let bundle = EnrichmentBundle {
            commits: vec![CommitRecord::new(
                (now() - Duration::days(400)).to_rfc3339(),
                "initial commit",
            )],
            ..Default::default()
        };
        let ctx = ScoringContext::gather([&snap], now());
        let input = ScoringInput { snapshot: &snap, bundle: &bundle, context: &ctx };
        let scores = sub_scores(&input);

        assert_eq!(scores.stars, 0.0);
        assert_eq!(scores.forks, 0.0);
        assert!(scores.documentation <= 0.1);
        assert!(scores.maintenance <= 0.12 + 1e-9);
        assert!(final_score(&scores) <= 10.0);
    }

    #[test]
    fn test_final_score_rounds_to_two_decimals() {
        let scores = SubScores {
            documentation: 1.0 / 3.0,
            completeness: 0.0,
            code_quality: 0.0,
            commit_quality: 0.0,
            maintenance: 0.0,
            stars: 0.0,
            forks: 0.0,
        };
        assert_eq!(final_score(&scores), 8.33);

        let perfect = SubScores {
            documentation: 1.0,
            completeness: 1.0,
            code_quality: 1.0,
            commit_quality: 1.0,
            maintenance: 1.0,
            stars: 1.0,
            forks: 1.0,
        };
        assert_eq!(final_score(&perfect), 100.0);
    }
}
