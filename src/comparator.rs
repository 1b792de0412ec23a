use crate::data_source::{ComparisonSource, Schedule};
use crate::github::types::{ComparisonResult, Counts, RepositoryRef};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Fork key -> result, for forks strictly ahead of the parent.
pub type AheadForks = BTreeMap<String, ComparisonResult>;

pub struct Comparator {
    source: Arc<dyn ComparisonSource>,
    schedule: Schedule,
}

impl Comparator {
    pub fn new(source: Arc<dyn ComparisonSource>, schedule: Schedule) -> Self {
        Self { source, schedule }
    }

    /// Compares every fork against `parent` and keeps those with `ahead > 0`.
    /// Failed or inconclusive comparisons are simply absent from the result.
    pub async fn run(&self, parent: &RepositoryRef, forks: &[RepositoryRef]) -> AheadForks {
        let total = forks.len();
        let mut ahead = AheadForks::new();
        let mut done = 0usize;

        let mut record = |fork: RepositoryRef, counts: Counts| {
            done += 1;
            debug!(done, total, fork = %fork, ahead = counts.ahead, behind = counts.behind, "progress");
            if counts.is_ahead() {
                ahead.insert(fork.key().to_string(), ComparisonResult { fork, counts });
            }
        };

        match self.schedule {
            Schedule::Sequential => {
                for fork in forks {
                    let counts = self.source.compare(fork, parent).await;
                    record(fork.clone(), counts);
                }
            }
            Schedule::Unbounded => {
                let (tx, mut rx) = mpsc::unbounded_channel::<(RepositoryRef, Counts)>();
                for fork in forks {
                    let tx = tx.clone();
                    let source = self.source.clone();
                    let fork = fork.clone();
                    let parent = parent.clone();
                    tokio::spawn(async move {
                        let counts = source.compare(&fork, &parent).await;
                        let _ = tx.send((fork, counts));
                    });
                }
                drop(tx);

                // exactly one message per fork; None only if a task died
                for _ in 0..total {
                    match rx.recv().await {
                        Some((fork, counts)) => record(fork, counts),
                        None => {
                            warn!(total, "comparison task exited without reporting");
                            break;
                        }
                    }
                }
            }
        }

        info!(total, ahead = ahead.len(), "comparisons finished");
        ahead
    }
}
