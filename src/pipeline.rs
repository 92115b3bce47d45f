// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Evaluation pipeline - filter, enrich, score, rank, select
//!
//! Enrichment is the only I/O. It runs as a bounded pool over the surviving
//! repositories and every bundle is infallible: sources degrade individual
//! fields instead of failing. Scoring happens after all snapshots are known,
//! so run-wide maxima are final before any bonus is computed.

use crate::activity::ActivitySegmenter;
use crate::complexity;
use crate::config::SelectionConfig;
use crate::error::FetchResult;
use crate::filter::EliminationFilter;
use crate::scoring::{final_score, sub_scores, ScoringContext, ScoringInput};
use crate::selection::{rank_by_score, DiversitySelector};
use crate::types::{EnrichmentBundle, RepositorySnapshot, ScoredRepository};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::{debug, info};

/// Provider of repository listings and per-repository signals
pub trait SignalSource {
    /// List the account's repositories
    ///
    /// This is the only call whose failure aborts a run.
    fn list_repositories(
        &self,
        account: &str,
    ) -> impl Future<Output = FetchResult<Vec<RepositorySnapshot>>> + Send;

    /// Gather signals for one repository, degrading failed fields to defaults
    fn enrich(&self, repo: &RepositorySnapshot) -> impl Future<Output = EnrichmentBundle> + Send;
}

/// Configured evaluation pipeline
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    filter: EliminationFilter,
    segmenter: ActivitySegmenter,
    selector: DiversitySelector,
    concurrency: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&SelectionConfig::default(), 4)
    }
}

impl Pipeline {
    /// Build a pipeline from selection settings and enrichment concurrency
    #[must_use]
    pub fn new(selection: &SelectionConfig, concurrency: usize) -> Self {
        Self {
            filter: EliminationFilter::new(selection.min_size_kb),
            segmenter: ActivitySegmenter::new(
                selection.inactivity_gap_days,
                selection.empty_history,
            ),
            selector: DiversitySelector::new(selection.candidate_pool, selection.language_cap),
            concurrency: concurrency.max(1),
        }
    }

    /// Run end to end against `source`
    pub async fn run<S>(
        &self,
        source: &S,
        account: &str,
        target: usize,
        now: DateTime<Utc>,
    ) -> FetchResult<Vec<ScoredRepository>>
    where
        S: SignalSource + Sync,
    {
        let listed = source.list_repositories(account).await?;
        let listed_count = listed.len();
        let survivors = self.filter.apply(listed, account);
        info!(
            "{} of {} repositories passed elimination",
            survivors.len(),
            listed_count
        );

        let bundles = self.enrich_all(source, &survivors).await;
        let candidates = survivors.into_iter().zip(bundles).collect();
        Ok(self.evaluate(candidates, target, now))
    }

    /// Enrich every repository with at most `concurrency` in flight
    ///
    /// Bundles come back in the same order as `repos`.
    pub async fn enrich_all<S>(&self, source: &S, repos: &[RepositorySnapshot]) -> Vec<EnrichmentBundle>
    where
        S: SignalSource + Sync,
    {
        stream::iter(repos)
            .map(|repo| source.enrich(repo))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Score, rank and select already-filtered candidates
    #[must_use]
    pub fn evaluate(
        &self,
        candidates: Vec<(RepositorySnapshot, EnrichmentBundle)>,
        target: usize,
        now: DateTime<Utc>,
    ) -> Vec<ScoredRepository> {
        let context = ScoringContext::gather(candidates.iter().map(|(s, _)| s), now);

        let mut scored: Vec<ScoredRepository> = candidates
            .into_iter()
            .map(|(snapshot, bundle)| self.score(snapshot, &bundle, &context))
            .collect();

        rank_by_score(&mut scored);
        let selected = self.selector.select(scored, target);
        info!("Selected {} repositories", selected.len());
        selected
    }

    /// Evaluate a single repository against a finished run context
    #[must_use]
    pub fn score(
        &self,
        snapshot: RepositorySnapshot,
        bundle: &EnrichmentBundle,
        context: &ScoringContext,
    ) -> ScoredRepository {
        let timeline = self
            .segmenter
            .segment(&bundle.commits, snapshot.created_at, snapshot.pushed_at);
        let scores = sub_scores(&ScoringInput {
            snapshot: &snapshot,
            bundle,
            context,
        });
        let final_score = final_score(&scores);
        let complexity = complexity::estimate(&snapshot, bundle, &timeline);
        let (primary_language, secondary_language) = bundle.top_languages();

        debug!(
            repo = %snapshot.name,
            score = final_score,
            complexity = complexity.score,
            blocks = timeline.blocks.len(),
            "Scored repository"
        );

        ScoredRepository {
            snapshot,
            primary_language,
            secondary_language,
            active_blocks: timeline.blocks,
            total_active_days: timeline.total_active_days,
            sub_scores: scores,
            final_score,
            complexity_score: complexity.score,
            complexity_label: complexity.label,
        }
    }
}
