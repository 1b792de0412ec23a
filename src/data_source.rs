//! Capabilities the fork ranking pipeline consumes, and the two strategies
//! that provide them.

use crate::config::Config;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::scrape::ScrapeClient;
use crate::github::types::{Counts, RepositoryRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Authenticated GitHub REST API.
    Api,
    /// Unauthenticated HTML pages on the GitHub website.
    Scrape,
}

impl Strategy {
    pub fn default_schedule(self) -> Schedule {
        match self {
            Strategy::Api => Schedule::Sequential,
            Strategy::Scrape => Schedule::Unbounded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// One comparison at a time.
    Sequential,
    /// One task per fork, no ceiling.
    Unbounded,
}

/// Lists forks one page at a time. Pages are numbered from 1; an empty page
/// marks the end. See [`crate::github::network::list_forks`].
#[async_trait]
pub trait ForkSource: Send + Sync {
    async fn fork_page(&self, parent: &RepositoryRef, page: u32) -> Result<Vec<RepositoryRef>>;
}

#[async_trait]
pub trait ComparisonSource: Send + Sync {
    /// Ahead/behind counts of `fork`'s default branch against `parent`'s.
    async fn fetch_counts(&self, fork: &RepositoryRef, parent: &RepositoryRef) -> Result<Counts>;

    /// Like [`fetch_counts`](Self::fetch_counts), but a failure is logged and
    /// reported as [`Counts::NEUTRAL`].
    async fn compare(&self, fork: &RepositoryRef, parent: &RepositoryRef) -> Counts {
        match self.fetch_counts(fork, parent).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(fork = %fork, error = %e, "comparison failed");
                Counts::NEUTRAL
            }
        }
    }
}

pub struct Sources {
    pub forks: Arc<dyn ForkSource>,
    pub comparisons: Arc<dyn ComparisonSource>,
}

impl Sources {
    pub fn shared<T>(source: T) -> Self
    where
        T: ForkSource + ComparisonSource + 'static,
    {
        let source = Arc::new(source);
        Self {
            forks: source.clone(),
            comparisons: source,
        }
    }
}

pub fn init_sources(config: &Config) -> Result<Sources> {
    match (config.resolved_strategy(), config.token()) {
        (Strategy::Api, Some(token)) => Ok(Sources::shared(GitHubClient::new(
            token,
            config.api_url.as_deref(),
            config.page_size(),
        )?)),
        _ => Ok(Sources::shared(ScrapeClient::new(
            &config.web_url,
            &config.user_agent,
        )?)),
    }
}
