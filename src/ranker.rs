use crate::github::types::ComparisonResult;
use itertools::Itertools;
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub key: String,
    pub net_lead: i64,
}

/// Forks ordered by net lead, highest first. Equal leads are ordered by fork
/// key so the ranking does not depend on completion order.
#[derive(Debug, Default)]
pub struct RankedSet {
    entries: Vec<RankedEntry>,
}

impl RankedSet {
    pub fn build<'a>(results: impl IntoIterator<Item = &'a ComparisonResult>) -> Self {
        let entries = results
            .into_iter()
            .map(|r| RankedEntry {
                key: r.fork.key().to_string(),
                net_lead: r.net_lead(),
            })
            .sorted_by(|a, b| {
                (Reverse(a.net_lead), &a.key).cmp(&(Reverse(b.net_lead), &b.key))
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
