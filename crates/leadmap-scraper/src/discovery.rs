//! Link discovery: the producer side of the pipeline.
//!
//! One tab is driven through an incremental scroll/collect loop against the
//! search results feed. Newly seen place links are deduplicated and,
//! when a shared queue is supplied, streamed into it as soon as they appear
//! so extraction workers can start before discovery finishes.

use crate::queue::{Task, WorkQueue};
use crate::scripts::{
    build_search_url, COLLECT_LINKS_JS, ENABLE_LIVE_RESULTS_JS, FEED_SELECTOR, SCROLL_FEED_JS,
};
use crate::timeout::sliced;
use leadmap_core::{Browse, TabHandle, Viewport};
use std::collections::HashSet;
use std::time::Duration;

/// Tunables for one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Consecutive zero-growth rounds before giving up on the feed
    pub max_stall_rounds: u32,
    /// Delay between scroll rounds, a courtesy to lazy loading
    pub scroll_delay: Duration,
    /// Budget for the results feed to become ready
    pub feed_budget: Duration,
    /// Viewport for the discovery tab
    pub viewport: Viewport,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            max_stall_rounds: 5,
            scroll_delay: Duration::from_millis(800),
            feed_budget: Duration::from_secs(30),
            viewport: Viewport::default(),
        }
    }
}

/// Discover up to `target` place links for a query with default options.
///
/// When `queue` is supplied, each newly seen link is enqueued the moment it
/// is found. All failures here are terminal for this call and yield an empty
/// result; nothing is retried and no error escapes.
pub async fn discover<S: Browse>(
    session: &S,
    query: &str,
    target: usize,
    queue: Option<&WorkQueue>,
) -> Vec<String> {
    discover_with(session, query, target, queue, &DiscoverOptions::default()).await
}

/// [`discover`] with explicit options.
pub async fn discover_with<S: Browse>(
    session: &S,
    query: &str,
    target: usize,
    queue: Option<&WorkQueue>,
    opts: &DiscoverOptions,
) -> Vec<String> {
    if target == 0 {
        return Vec::new();
    }

    let tab = match session.open_tab(opts.viewport).await {
        Ok(tab) => tab,
        Err(e) => {
            tracing::warn!("could not open discovery tab: {}", e);
            return Vec::new();
        }
    };

    let links = collect_links(&tab, query, target, queue, opts).await;

    // The tab is closed on every exit path; close errors are swallowed.
    if let Err(e) = tab.close().await {
        tracing::debug!("discovery tab close failed: {}", e);
    }

    links
}

async fn collect_links<T: TabHandle>(
    tab: &T,
    query: &str,
    target: usize,
    queue: Option<&WorkQueue>,
    opts: &DiscoverOptions,
) -> Vec<String> {
    let search_url = build_search_url(query);
    if let Err(e) = tab.navigate(&search_url).await {
        tracing::warn!("search navigation failed for {:?}: {}", query, e);
        return Vec::new();
    }

    match sliced(tab.wait_for(FEED_SELECTOR), async {}, opts.feed_budget).await {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            tracing::warn!("results feed failed to load for {:?}: {}", query, e);
            return Vec::new();
        }
        None => {
            tracing::warn!("results feed never became ready for {:?}", query);
            return Vec::new();
        }
    }

    // Keep results updating while the map pans. Best-effort: the script
    // suppresses the click when the control is already active, and a missing
    // control is no reason to abandon discovery.
    if let Err(e) = tab.evaluate(ENABLE_LIVE_RESULTS_JS).await {
        tracing::debug!("live-results toggle failed: {}", e);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut links: Vec<String> = Vec::new();
    let mut stall_rounds = 0;

    while links.len() < target && stall_rounds < opts.max_stall_rounds {
        let batch: Vec<String> = match tab.evaluate(COLLECT_LINKS_JS).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("link collection round failed: {}", e);
                Vec::new()
            }
        };

        let before = links.len();
        for href in batch {
            if links.len() >= target {
                break;
            }
            if seen.insert(href.clone()) {
                if let Some(queue) = queue {
                    queue.push(Task::Visit(href.clone()));
                }
                links.push(href);
            }
        }

        if links.len() == before {
            stall_rounds += 1;
        } else {
            stall_rounds = 0;
        }

        if links.len() >= target {
            break;
        }

        if let Err(e) = tab.evaluate(SCROLL_FEED_JS).await {
            tracing::debug!("feed scroll failed: {}", e);
        }
        tokio::time::sleep(opts.scroll_delay).await;
    }

    tracing::debug!("discovered {} links for {:?}", links.len(), query);
    links
}
