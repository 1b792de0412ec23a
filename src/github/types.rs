use crate::error::{ForkRankError, Result};
use std::fmt;

/// An `owner/name` pair. `key` is always the two joined by `/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
    key: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let key = format!("{owner}/{name}");
        Self { owner, name, key }
    }

    /// Parses user input of the form `owner/name`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches(".git");
        match trimmed.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self::new(*owner, *name)),
            _ => Err(ForkRankError::InvalidRepository(input.to_string())),
        }
    }

    /// Builds a reference from a repository record returned by the GitHub API.
    pub fn from_api(record: &octocrab::models::Repository) -> Option<Self> {
        let owner = record.owner.as_ref()?.login.clone();
        Some(Self::new(owner, record.name.clone()))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Ahead/behind commit counts of a fork relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counts {
    pub ahead: i64,
    pub behind: i64,
}

impl Counts {
    /// Returned when a comparison failed.
    pub const NEUTRAL: Counts = Counts { ahead: 0, behind: 0 };
    /// Returned when the page carried no divergence marker.
    pub const UNKNOWN: Counts = Counts {
        ahead: -1,
        behind: -1,
    };

    pub fn new(ahead: i64, behind: i64) -> Self {
        Self { ahead, behind }
    }

    pub fn is_ahead(&self) -> bool {
        self.ahead > 0
    }

    pub fn net_lead(&self) -> i64 {
        self.ahead - self.behind
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonResult {
    pub fork: RepositoryRef,
    pub counts: Counts,
}

impl ComparisonResult {
    pub fn net_lead(&self) -> i64 {
        self.counts.net_lead()
    }
}
