use crate::data_source::{ComparisonSource, ForkSource};
use crate::error::{ForkRankError, Result};
use crate::github::types::{Counts, RepositoryRef};
use async_trait::async_trait;
use octocrab::Octocrab;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// GitHub REST API strategy.
pub struct GitHubClient {
    octo: Octocrab,
    page_size: u8,
    // repository key -> default branch
    default_branches: Mutex<HashMap<String, String>>,
}

impl GitHubClient {
    pub fn new(token: &str, api_url: Option<&str>, page_size: u8) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| ForkRankError::GitHub(e.to_string()))?;
        }
        let octo = builder
            .build()
            .map_err(|e| ForkRankError::GitHub(e.to_string()))?;

        Ok(Self {
            octo,
            page_size,
            default_branches: Mutex::new(HashMap::new()),
        })
    }

    fn cached_branch(&self, repo: &RepositoryRef) -> Option<String> {
        self.default_branches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(repo.key())
            .cloned()
    }

    fn remember_branch(&self, repo: &RepositoryRef, branch: String) {
        self.default_branches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(repo.key().to_string(), branch);
    }

    async fn default_branch(&self, repo: &RepositoryRef) -> Result<String> {
        if let Some(branch) = self.cached_branch(repo) {
            return Ok(branch);
        }

        let record = self
            .octo
            .repos(repo.owner(), repo.name())
            .get()
            .await
            .map_err(|e| ForkRankError::GitHub(e.to_string()))?;
        let branch = record.default_branch.ok_or_else(|| {
            ForkRankError::GitHub(format!("{repo} reports no default branch"))
        })?;

        self.remember_branch(repo, branch.clone());
        Ok(branch)
    }
}

#[async_trait]
impl ForkSource for GitHubClient {
    async fn fork_page(&self, parent: &RepositoryRef, page: u32) -> Result<Vec<RepositoryRef>> {
        let result = self
            .octo
            .repos(parent.owner(), parent.name())
            .list_forks()
            .per_page(self.page_size)
            .page(page)
            .send()
            .await
            .map_err(|e| ForkRankError::GitHub(e.to_string()))?;

        let mut forks = Vec::with_capacity(result.items.len());
        for record in &result.items {
            let Some(fork) = RepositoryRef::from_api(record) else {
                debug!(name = %record.name, "skipping fork without owner");
                continue;
            };
            if let Some(branch) = &record.default_branch {
                self.remember_branch(&fork, branch.clone());
            }
            forks.push(fork);
        }

        Ok(forks)
    }
}

#[async_trait]
impl ComparisonSource for GitHubClient {
    async fn fetch_counts(&self, fork: &RepositoryRef, parent: &RepositoryRef) -> Result<Counts> {
        let base = self.default_branch(parent).await?;
        let head = format!(
            "{}:{}:{}",
            fork.owner(),
            fork.name(),
            self.default_branch(fork).await?
        );

        let comparison = self
            .octo
            .commits(parent.owner(), parent.name())
            .compare(base, head)
            .send()
            .await
            .map_err(|e| ForkRankError::GitHub(e.to_string()))?;

        debug!(
            fork = %fork,
            ahead = comparison.ahead_by,
            behind = comparison.behind_by,
            "compared"
        );
        Ok(Counts::new(comparison.ahead_by, comparison.behind_by))
    }
}
