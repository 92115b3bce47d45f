// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! GitHub REST source
//!
//! Listing failures are fatal for the run. Each enrichment field is fetched
//! concurrently under its own timeout, and a failed field falls back to its
//! default without touching its siblings.

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::pipeline::SignalSource;
use crate::types::{CommitRecord, EnrichmentBundle, ReadmeInfo, RepositorySnapshot, RootListing};
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const PAGE_SIZE: usize = 100;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    owner: ApiOwner,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    has_projects: bool,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    license: Option<serde_json::Value>,
    description: Option<String>,
    #[serde(default)]
    html_url: String,
}

impl From<ApiRepository> for RepositorySnapshot {
    fn from(api: ApiRepository) -> Self {
        Self {
            pushed_at: api.pushed_at.unwrap_or(api.updated_at),
            name: api.name,
            owner: api.owner.login,
            created_at: api.created_at,
            updated_at: api.updated_at,
            is_fork: api.fork,
            is_archived: api.archived,
            has_issues: api.has_issues,
            has_projects: api.has_projects,
            has_wiki: api.has_wiki,
            size_kb: api.size,
            stars: api.stargazers_count,
            forks: api.forks_count,
            open_issues: api.open_issues_count,
            has_license: api.license.is_some_and(|l| !l.is_null()),
            description: api.description,
            url: api.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    #[serde(default)]
    message: String,
    author: Option<ApiSignature>,
    committer: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    commit: ApiCommitDetail,
}

impl From<ApiCommit> for CommitRecord {
    fn from(api: ApiCommit) -> Self {
        let detail = api.commit;
        let timestamp = detail
            .author
            .and_then(|a| a.date)
            .or_else(|| detail.committer.and_then(|c| c.date))
            .unwrap_or_default();
        CommitRecord::new(timestamp, &detail.message)
    }
}

#[derive(Debug, Deserialize)]
struct ApiContent {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

fn root_listing(entries: &[ApiContent]) -> RootListing {
    let files = entries.iter().filter(|e| e.kind != "dir").map(|e| e.name.as_str());
    let dirs = entries.iter().filter(|e| e.kind == "dir").map(|e| e.name.as_str());
    RootListing::new(files, dirs)
}

// =============================================================================
// Client
// =============================================================================

/// GitHub REST API client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
    list_timeout: Duration,
    field_timeout: Duration,
    commit_pages: u32,
    repo_pages: u32,
}

impl GitHubClient {
    /// Build a client from fetch settings and an optional token
    pub fn new(config: &FetchConfig, token: Option<String>) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            list_timeout: Duration::from_secs(config.list_timeout_secs.max(1)),
            field_timeout: Duration::from_secs(config.field_timeout_secs.max(1)),
            commit_pages: config.commit_pages.max(1),
            repo_pages: config.repo_pages.max(1),
        })
    }

    async fn get(&self, path: &str, accept: Option<&'static str>) -> FetchResult<Response> {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }
        let response = request.send().await?;
        check_status(response, &url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> FetchResult<T> {
        let response = self.get(path, None).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            what: path.to_string(),
            source,
        })
    }

    async fn fetch_languages(&self, repo: &RepositorySnapshot) -> FetchResult<BTreeMap<String, u64>> {
        self.get_json(&format!("/repos/{}/{}/languages", repo.owner, repo.name))
            .await
    }

    async fn fetch_commits(&self, repo: &RepositorySnapshot) -> FetchResult<Vec<CommitRecord>> {
        let mut commits = Vec::new();
        for page in 1..=self.commit_pages {
            let path = format!(
                "/repos/{}/{}/commits?per_page={PAGE_SIZE}&page={page}",
                repo.owner, repo.name
            );
            let batch: Vec<ApiCommit> = match self.get_json(&path).await {
                Ok(batch) => batch,
                // Empty repository
                Err(FetchError::Status { status: 409, .. }) => break,
                Err(e) => return Err(e),
            };
            let short = batch.len() < PAGE_SIZE;
            commits.extend(batch.into_iter().map(CommitRecord::from));
            if short {
                break;
            }
        }
        Ok(commits)
    }

    async fn fetch_tag_count(&self, repo: &RepositorySnapshot) -> FetchResult<u32> {
        let tags: Vec<serde_json::Value> = self
            .get_json(&format!(
                "/repos/{}/{}/tags?per_page={PAGE_SIZE}",
                repo.owner, repo.name
            ))
            .await?;
        Ok(u32::try_from(tags.len()).unwrap_or(u32::MAX))
    }

    async fn fetch_readme(&self, repo: &RepositorySnapshot) -> FetchResult<ReadmeInfo> {
        let path = format!("/repos/{}/{}/readme", repo.owner, repo.name);
        match self.get(&path, Some("application/vnd.github.raw")).await {
            Ok(response) => Ok(ReadmeInfo::from_text(&response.text().await?)),
            Err(FetchError::Status { status: 404, .. }) => Ok(ReadmeInfo::default()),
            Err(e) => Err(e),
        }
    }

    async fn fetch_root(&self, repo: &RepositorySnapshot) -> FetchResult<RootListing> {
        let path = format!("/repos/{}/{}/contents", repo.owner, repo.name);
        match self.get_json::<Vec<ApiContent>>(&path).await {
            Ok(entries) => Ok(root_listing(&entries)),
            Err(FetchError::Status { status: 404, .. }) => Ok(RootListing::default()),
            Err(e) => Err(e),
        }
    }

    /// Await `fetch` under the field timeout, substituting the default on failure
    async fn or_default<T, F>(&self, repo: &str, field: &'static str, fetch: F) -> T
    where
        T: Default,
        F: Future<Output = FetchResult<T>>,
    {
        let result = tokio::time::timeout(self.field_timeout, fetch)
            .await
            .unwrap_or_else(|_| Err(FetchError::Timeout(format!("{field} of {repo}"))));
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(repo, field, error = %e, "Field fetch failed, using default");
                T::default()
            }
        }
    }
}

fn check_status(response: Response, url: &str) -> FetchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let remaining = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let reset = response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());

    Err(match status {
        StatusCode::UNAUTHORIZED => FetchError::Unauthorized(url.to_string()),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited { reset },
        StatusCode::FORBIDDEN if remaining == Some(0) => FetchError::RateLimited { reset },
        _ => FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        },
    })
}

impl GitHubClient {
    async fn list_pages(&self, account: &str) -> FetchResult<Vec<RepositorySnapshot>> {
        let mut repos = Vec::new();
        for page in 1..=self.repo_pages {
            let path = format!("/users/{account}/repos?type=owner&per_page={PAGE_SIZE}&page={page}");
            let batch: Vec<ApiRepository> = match self.get_json(&path).await {
                Ok(batch) => batch,
                Err(FetchError::Status { status: 404, .. }) => {
                    return Err(FetchError::AccountNotFound(account.to_string()));
                }
                Err(e) => return Err(e),
            };
            let short = batch.len() < PAGE_SIZE;
            repos.extend(batch.into_iter().map(RepositorySnapshot::from));
            if short {
                break;
            }
        }
        debug!("Listed {} repositories for {}", repos.len(), account);
        Ok(repos)
    }
}

impl SignalSource for GitHubClient {
    async fn list_repositories(&self, account: &str) -> FetchResult<Vec<RepositorySnapshot>> {
        tokio::time::timeout(self.list_timeout, self.list_pages(account))
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Timeout(format!("repository listing of {account}")))
            })
    }

    async fn enrich(&self, repo: &RepositorySnapshot) -> EnrichmentBundle {
        let name = repo.name.as_str();
        let (languages, commits, tag_count, readme, root) = tokio::join!(
            self.or_default(name, "languages", self.fetch_languages(repo)),
            self.or_default(name, "commits", self.fetch_commits(repo)),
            self.or_default(name, "tags", self.fetch_tag_count(repo)),
            self.or_default(name, "readme", self.fetch_readme(repo)),
            self.or_default(name, "root", self.fetch_root(repo)),
        );
        debug!(
            repo = name,
            languages = languages.len(),
            commits = commits.len(),
            tags = tag_count,
            "Enriched repository"
        );
        EnrichmentBundle {
            languages,
            commits,
            tag_count,
            readme,
            root,
        }
    }
}
