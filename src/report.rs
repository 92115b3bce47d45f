// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rendering of the selected repositories

use crate::types::ScoredRepository;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Ranked summary with score breakdown
    #[default]
    Text,
    /// Active blocks per repository
    Timeline,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text | Self::Timeline => "txt",
            Self::Json => "json",
        }
    }
}

/// Render `repos` in the requested format
pub fn render(repos: &[ScoredRepository], format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(repos, color)),
        OutputFormat::Timeline => Ok(render_timeline(repos, color)),
        OutputFormat::Json => render_json(repos),
    }
}

/// Pretty JSON array
pub fn render_json(repos: &[ScoredRepository]) -> Result<String> {
    serde_json::to_string_pretty(repos).context("Failed to serialize repositories to JSON")
}

fn bold(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn score_colored(score: f64, color: bool) -> String {
    let text = format!("{score:6.2}");
    if !color {
        return text;
    }
    if score >= 60.0 {
        text.green().to_string()
    } else if score >= 30.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

fn languages(repo: &ScoredRepository) -> String {
    match (&repo.primary_language, &repo.secondary_language) {
        (Some(p), Some(s)) => format!("{p}, {s}"),
        (Some(p), None) => p.clone(),
        _ => "unknown".to_string(),
    }
}

/// Ranked summary
#[must_use]
pub fn render_text(repos: &[ScoredRepository], color: bool) -> String {
    if repos.is_empty() {
        return "No repositories qualified.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Selected {} repositories:", repos.len());
    let _ = writeln!(out);

    for (rank, repo) in repos.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  {}",
            rank + 1,
            bold(repo.name(), color),
            score_colored(repo.final_score, color)
        );
        if let Some(description) = repo.snapshot.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "    {description}");
        }
        let _ = writeln!(
            out,
            "    languages: {}  complexity: {} ({})",
            languages(repo),
            repo.complexity_label,
            repo.complexity_score
        );
        let _ = writeln!(
            out,
            "    active: {} days in {} block(s)  stars: {}  forks: {}",
            repo.total_active_days,
            repo.active_blocks.len(),
            repo.snapshot.stars,
            repo.snapshot.forks
        );
        let s = &repo.sub_scores;
        let _ = writeln!(
            out,
            "    docs {:.2}  completeness {:.2}  code {:.2}  commits {:.2}  maintenance {:.2}  stars {:.2}  forks {:.2}",
            s.documentation, s.completeness, s.code_quality, s.commit_quality, s.maintenance, s.stars, s.forks
        );
        if !repo.snapshot.url.is_empty() {
            let _ = writeln!(out, "    {}", repo.snapshot.url);
        }
        let _ = writeln!(out);
    }
    out
}

/// Active blocks, one line per block
#[must_use]
pub fn render_timeline(repos: &[ScoredRepository], color: bool) -> String {
    if repos.is_empty() {
        return "No repositories qualified.\n".to_string();
    }

    let mut out = String::new();
    for repo in repos {
        let _ = writeln!(
            out,
            "{} ({} active days)",
            bold(repo.name(), color),
            repo.total_active_days
        );
        if repo.active_blocks.is_empty() {
            let _ = writeln!(out, "  no recorded activity");
        }
        for block in &repo.active_blocks {
            let _ = writeln!(
                out,
                "  {} → {} ({} d)",
                block.start.format("%Y-%m-%d"),
                block.end.format("%Y-%m-%d"),
                block.duration_days
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActiveBlock, ComplexityLabel, RepositorySnapshot, SubScores};
    use chrono::{TimeZone, Utc};

    fn repo() -> ScoredRepository {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        ScoredRepository {
            snapshot: RepositorySnapshot {
                name: "engine".into(),
                owner: "octo".into(),
                created_at: start,
                updated_at: end,
                pushed_at: end,
                is_fork: false,
                is_archived: false,
                has_issues: true,
                has_projects: false,
                has_wiki: false,
                size_kb: 900,
                stars: 12,
                forks: 2,
                open_issues: 1,
                has_license: true,
                description: Some("Game engine".into()),
                url: "https://github.com/octo/engine".into(),
            },
            primary_language: Some("Rust".into()),
            secondary_language: Some("GLSL".into()),
            active_blocks: vec![ActiveBlock { start, end, duration_days: 10 }],
            total_active_days: 10,
            sub_scores: SubScores::default(),
            final_score: 72.5,
            complexity_score: 61,
            complexity_label: ComplexityLabel::High,
        }
    }

    #[test]
    fn test_text_contains_essentials() {
        let text = render_text(&[repo()], false);
        assert!(text.contains("Selected 1 repositories"));
        assert!(text.contains(" 1. engine   72.50"));
        assert!(text.contains("languages: Rust, GLSL"));
        assert!(text.contains("complexity: High (61)"));
        assert!(text.contains("active: 10 days in 1 block(s)"));
    }

    #[test]
    fn test_timeline_lines() {
        let text = render_timeline(&[repo()], false);
        assert!(text.contains("engine (10 active days)"));
        assert!(text.contains("2024-01-01 → 2024-01-11 (10 d)"));
    }

    #[test]
    fn test_json_is_flat_and_labelled() {
        let json = render_json(&[repo()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "engine");
        assert_eq!(value[0]["complexity_label"], "High");
        assert_eq!(value[0]["final_score"], 72.5);
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(render_text(&[], false), "No repositories qualified.\n");
        assert_eq!(render(&[], OutputFormat::Json, false).unwrap(), "[]");
    }
}
