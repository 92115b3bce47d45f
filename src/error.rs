// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Errors raised while retrieving repository data
//!
//! Only failures of the repository listing surface to the caller. Failures
//! while enriching a single field are logged and replaced by that field's
//! default.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain repository data
#[derive(Debug, Error)]
pub enum FetchError {
    /// The account does not exist on the forge
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The token was rejected
    #[error("authentication rejected by {0}")]
    Unauthorized(String),

    /// The API quota is exhausted
    #[error("rate limit exceeded{}", reset_hint(.reset))]
    RateLimited {
        /// Unix time at which the quota resets, if reported
        reset: Option<i64>,
    },

    /// Any other non-success status
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Connection or protocol failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request did not finish in time
    #[error("fetching {0} timed out")]
    Timeout(String),

    /// A fixture file could not be read
    #[error("failed to read fixture {path}")]
    FixtureIo {
        /// Fixture path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A payload could not be decoded
    #[error("failed to decode {what}")]
    Decode {
        /// What was being decoded
        what: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

fn reset_hint(reset: &Option<i64>) -> String {
    reset
        .map(|r| format!(" (resets at unix time {r})"))
        .unwrap_or_default()
}

/// Convenience alias for fetch results
pub type FetchResult<T> = std::result::Result<T, FetchError>;
