#![cfg(test)]

use crate::data_source::{ComparisonSource, ForkSource};
use crate::error::{ForkRankError, Result};
use crate::github::types::{Counts, RepositoryRef};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn parent() -> RepositoryRef {
    RepositoryRef::new("acme", "widget")
}

pub fn fork(owner: &str) -> RepositoryRef {
    RepositoryRef::new(owner, "widget")
}

/// Serves fixed pages; pages past the end are empty.
pub struct PagedForks {
    pages: Vec<Vec<RepositoryRef>>,
    fail_at: Option<u32>,
    requested: Mutex<Vec<u32>>,
}

impl PagedForks {
    pub fn from_pages(pages: Vec<Vec<RepositoryRef>>) -> Self {
        Self {
            pages,
            fail_at: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sizes(sizes: &[usize]) -> Self {
        let pages = sizes
            .iter()
            .enumerate()
            .map(|(page, &size)| (0..size).map(|i| fork(&format!("user{page}-{i}"))).collect())
            .collect();
        Self::from_pages(pages)
    }

    pub fn failing_at(mut self, page: u32) -> Self {
        self.fail_at = Some(page);
        self
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForkSource for PagedForks {
    async fn fork_page(&self, _parent: &RepositoryRef, page: u32) -> Result<Vec<RepositoryRef>> {
        self.requested.lock().unwrap().push(page);
        if self.fail_at == Some(page) {
            return Err(ForkRankError::GitHub("page unavailable".to_string()));
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

/// Answers from a table keyed by fork key; unknown forks fail.
#[derive(Default)]
pub struct FixedComparisons {
    counts: HashMap<String, Counts>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FixedComparisons {
    pub fn new(entries: &[(&str, i64, i64)]) -> Self {
        Self {
            counts: entries
                .iter()
                .map(|&(key, ahead, behind)| (key.to_string(), Counts::new(ahead, behind)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComparisonSource for FixedComparisons {
    async fn fetch_counts(&self, fork: &RepositoryRef, _parent: &RepositoryRef) -> Result<Counts> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(fork.key()) {
            tokio::time::sleep(*delay).await;
        }
        self.counts
            .get(fork.key())
            .copied()
            .ok_or_else(|| ForkRankError::GitHub(format!("no comparison for {fork}")))
    }
}
