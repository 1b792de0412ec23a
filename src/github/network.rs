use crate::data_source::ForkSource;
use crate::github::types::RepositoryRef;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Walks pages from 1 until a page comes back empty.
///
/// A failed page ends the walk with whatever was gathered so far. Forks
/// repeated across pages are kept once, in first-seen order.
pub async fn list_forks(source: &dyn ForkSource, parent: &RepositoryRef) -> Vec<RepositoryRef> {
    let mut forks = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page = 1u32;

    loop {
        let items = match source.fork_page(parent, page).await {
            Ok(items) => items,
            Err(e) => {
                warn!(repo = %parent, page, error = %e, "listing forks failed, keeping partial list");
                break;
            }
        };

        if items.is_empty() {
            break;
        }

        debug!(repo = %parent, page, count = items.len(), "fork page");
        for fork in items {
            if seen.insert(fork.key().to_string()) {
                forks.push(fork);
            }
        }
        page += 1;
    }

    forks
}
