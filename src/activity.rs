// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Activity segmentation - reconstructs periods of real development
//!
//! Commit timestamps are sorted and split wherever two consecutive commits
//! are further apart than the inactivity gap. Each resulting span is an
//! [`ActiveBlock`]; calendar dormancy between blocks does not count towards
//! the repository's active time.

use crate::types::{ActiveBlock, CommitRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// What to emit for a repository without any usable commit timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyHistoryPolicy {
    /// One block spanning the repository's creation to its last push
    #[default]
    SpanRepository,
    /// No blocks at all
    NoBlocks,
}

/// Result of segmenting one repository's history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityTimeline {
    /// Blocks ordered oldest first
    pub blocks: Vec<ActiveBlock>,
    /// Sum of block durations
    pub total_active_days: u32,
    /// Number of timestamps that parsed
    pub commit_count: usize,
}

/// Splits commit histories into active blocks
#[derive(Debug, Clone, Copy)]
pub struct ActivitySegmenter {
    gap: Duration,
    empty_history: EmptyHistoryPolicy,
}

impl Default for ActivitySegmenter {
    fn default() -> Self {
        Self::new(30, EmptyHistoryPolicy::default())
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp, `None` if malformed
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Parse every well-formed timestamp in `commits`, sorted ascending
#[must_use]
pub fn sorted_timestamps(commits: &[CommitRecord]) -> Vec<DateTime<Utc>> {
    let mut stamps: Vec<DateTime<Utc>> = commits
        .iter()
        .filter_map(|c| parse_timestamp(&c.timestamp))
        .collect();
    stamps.sort_unstable();
    stamps
}

fn close_block(start: DateTime<Utc>, end: DateTime<Utc>) -> ActiveBlock {
    let days = (end - start).num_days().max(1);
    ActiveBlock {
        start,
        end,
        duration_days: u32::try_from(days).unwrap_or(u32::MAX),
    }
}

impl ActivitySegmenter {
    /// Create a segmenter with the given inactivity gap in days
    #[must_use]
    pub fn new(gap_days: u32, empty_history: EmptyHistoryPolicy) -> Self {
        Self {
            gap: Duration::days(i64::from(gap_days)),
            empty_history,
        }
    }

    /// The configured empty-history policy
    #[must_use]
    pub fn empty_history(&self) -> EmptyHistoryPolicy {
        self.empty_history
    }

    /// Segment a commit history
    ///
    /// `created` and `pushed` are only used when no timestamp parses.
    #[must_use]
    pub fn segment(
        &self,
        commits: &[CommitRecord],
        created: DateTime<Utc>,
        pushed: DateTime<Utc>,
    ) -> ActivityTimeline {
        self.segment_sorted(&sorted_timestamps(commits), created, pushed)
    }

    /// Segment timestamps already sorted ascending
    #[must_use]
    pub fn segment_sorted(
        &self,
        stamps: &[DateTime<Utc>],
        created: DateTime<Utc>,
        pushed: DateTime<Utc>,
    ) -> ActivityTimeline {
        let Some((&first, rest)) = stamps.split_first() else {
            return self.fallback(created, pushed);
        };

        let mut blocks = Vec::new();
        let mut start = first;
        let mut end = first;

        for &ts in rest {
            if ts - end > self.gap {
                blocks.push(close_block(start, end));
                start = ts;
            }
            end = ts;
        }
        blocks.push(close_block(start, end));

        ActivityTimeline {
            total_active_days: blocks.iter().map(|b| b.duration_days).sum(),
            blocks,
            commit_count: stamps.len(),
        }
    }

    fn fallback(&self, created: DateTime<Utc>, pushed: DateTime<Utc>) -> ActivityTimeline {
        match self.empty_history {
            EmptyHistoryPolicy::NoBlocks => ActivityTimeline::default(),
            EmptyHistoryPolicy::SpanRepository => {
                let block = close_block(created, pushed.max(created));
                ActivityTimeline {
                    total_active_days: block.duration_days,
                    blocks: vec![block],
                    commit_count: 0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn commits_at(days: &[i64]) -> Vec<CommitRecord> {
        days.iter()
            .map(|&d| CommitRecord::new(day(d).to_rfc3339(), "work"))
            .collect()
    }

    #[test]
    fn test_two_blocks_across_long_gap() {
        let segmenter = ActivitySegmenter::new(30, EmptyHistoryPolicy::SpanRepository);
        let timeline = segmenter.segment(&commits_at(&[0, 5, 40, 45]), day(0), day(45));

        assert_eq!(timeline.blocks.len(), 2);
        assert_eq!(timeline.blocks[0].start, day(0));
        assert_eq!(timeline.blocks[0].end, day(5));
        assert_eq!(timeline.blocks[1].start, day(40));
        assert_eq!(timeline.blocks[1].end, day(45));
        assert_eq!(timeline.blocks[0].duration_days, 5);
        assert_eq!(timeline.blocks[1].duration_days, 5);
        assert_eq!(timeline.total_active_days, 10);
        assert_eq!(timeline.commit_count, 4);
    }

    #[test]
    fn test_gap_equal_to_threshold_stays_in_block() {
        let segmenter = ActivitySegmenter::new(30, EmptyHistoryPolicy::SpanRepository);
        let timeline = segmenter.segment(&commits_at(&[0, 30, 60]), day(0), day(60));

        assert_eq!(timeline.blocks.len(), 1);
        assert_eq!(timeline.total_active_days, 60);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let segmenter = ActivitySegmenter::default();
        let forward = segmenter.segment(&commits_at(&[0, 5, 40, 45]), day(0), day(45));
        let shuffled = segmenter.segment(&commits_at(&[45, 0, 40, 5]), day(0), day(45));
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_single_commit_floors_to_one_day() {
        let segmenter = ActivitySegmenter::default();
        let timeline = segmenter.segment(&commits_at(&[3]), day(0), day(10));

        assert_eq!(timeline.blocks.len(), 1);
        assert_eq!(timeline.blocks[0].duration_days, 1);
        assert_eq!(timeline.total_active_days, 1);
    }

    #[test]
    fn test_malformed_timestamps_are_dropped() {
        let mut commits = commits_at(&[0, 2]);
        commits.push(CommitRecord::new("not a date", "broken"));
        commits.push(CommitRecord::new("", "empty"));

        let timeline = ActivitySegmenter::default().segment(&commits, day(0), day(2));
        assert_eq!(timeline.commit_count, 2);
        assert_eq!(timeline.blocks.len(), 1);
        assert_eq!(timeline.total_active_days, 2);
    }

    #[test]
    fn test_empty_history_spans_repository() {
        let segmenter = ActivitySegmenter::new(30, EmptyHistoryPolicy::SpanRepository);
        let timeline = segmenter.segment(&[], day(0), day(90));

        assert_eq!(timeline.blocks.len(), 1);
        assert_eq!(timeline.blocks[0].start, day(0));
        assert_eq!(timeline.blocks[0].end, day(90));
        assert_eq!(timeline.total_active_days, 90);
        assert_eq!(timeline.commit_count, 0);
    }

    #[test]
    fn test_empty_history_pushed_before_created() {
        let segmenter = ActivitySegmenter::new(30, EmptyHistoryPolicy::SpanRepository);
        let timeline = segmenter.segment(&[], day(10), day(0));

        assert_eq!(timeline.blocks[0].start, day(10));
        assert_eq!(timeline.blocks[0].end, day(10));
        assert_eq!(timeline.blocks[0].duration_days, 1);
    }

    #[test]
    fn test_empty_history_no_blocks() {
        let segmenter = ActivitySegmenter::new(30, EmptyHistoryPolicy::NoBlocks);
        let timeline = segmenter.segment(&[], day(0), day(90));

        assert!(timeline.blocks.is_empty());
        assert_eq!(timeline.total_active_days, 0);
    }

    #[test]
    fn test_parse_timestamp_offsets() {
        let ts = parse_timestamp("2024-01-01T14:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        assert!(parse_timestamp("2024-13-01").is_none());
    }
}
