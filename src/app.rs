use crate::comparator::Comparator;
use crate::data_source::{Schedule, Sources};
use crate::error::Result;
use crate::github::network;
use crate::github::types::RepositoryRef;
use crate::ranker::RankedSet;
use crate::report;
use std::io::Write;
use tracing::info;

/// The fork ranking pipeline over one pair of sources.
pub struct App {
    sources: Sources,
    schedule: Schedule,
}

impl App {
    pub fn new(sources: Sources, schedule: Schedule) -> Self {
        Self { sources, schedule }
    }

    /// Lists, compares, ranks and prints the forks of `parent`. Returns the
    /// number of rows written.
    pub async fn run(&self, parent: &RepositoryRef, out: &mut impl Write) -> Result<usize> {
        let forks = network::list_forks(self.sources.forks.as_ref(), parent).await;
        info!(repo = %parent, forks = forks.len(), schedule = ?self.schedule, "listed forks");

        let comparator = Comparator::new(self.sources.comparisons.clone(), self.schedule);
        let ahead = comparator.run(parent, &forks).await;

        let ranked = RankedSet::build(ahead.values());
        if ranked.is_empty() {
            info!(repo = %parent, "no fork is ahead");
        }
        report::write_report(out, &ranked, &ahead)?;
        Ok(ranked.len())
    }
}
