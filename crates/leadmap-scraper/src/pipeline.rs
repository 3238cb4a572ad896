//! Pipeline entry point: discovery and extraction running concurrently.
//!
//! Workers are spawned first, then discovery streams links into the shared
//! queue as it finds them, so extraction begins while the feed is still
//! scrolling. Shutdown is the pool handshake in [`crate::pool`].

use crate::discovery::{discover_with, DiscoverOptions};
use crate::error::Result;
use crate::pool::{effective_worker_count, spawn_workers};
use crate::queue::{LeadSink, WorkQueue};
use crate::worker::ExtractBudgets;
use leadmap_core::{AppConfig, Browse, Lead, Viewport};
use std::sync::Arc;
use std::time::Duration;

/// Tunables for one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Stop discovering once this many links are found
    pub target_leads: usize,
    /// Ceiling on concurrent extraction tabs
    pub max_tabs: usize,
    /// Per-phase extraction budgets
    pub budgets: ExtractBudgets,
    /// Viewport for every extraction tab
    pub viewport: Viewport,
    /// Discovery loop tunables
    pub discovery: DiscoverOptions,
}

impl ScrapeOptions {
    /// Options with default budgets for a given target and tab ceiling.
    #[must_use]
    pub fn new(target_leads: usize, max_tabs: usize) -> Self {
        Self {
            target_leads,
            max_tabs,
            budgets: ExtractBudgets::default(),
            viewport: Viewport::default(),
            discovery: DiscoverOptions::default(),
        }
    }

    /// Options derived from the application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let viewport = Viewport::new(config.browser.viewport_width, config.browser.viewport_height);
        Self {
            target_leads: config.scraper.target_leads,
            max_tabs: config.scraper.max_tabs,
            budgets: ExtractBudgets {
                navigation: Duration::from_secs(config.browser.navigation_timeout_secs),
                ready: Duration::from_secs(config.browser.ready_timeout_secs),
            },
            viewport,
            discovery: DiscoverOptions {
                max_stall_rounds: config.scraper.max_stall_rounds,
                scroll_delay: Duration::from_millis(config.scraper.scroll_delay_ms),
                feed_budget: Duration::from_secs(config.browser.ready_timeout_secs),
                viewport,
            },
        }
    }
}

/// Run the full pipeline for a search query and return the extracted leads.
///
/// Returns an error only when no worker tab could be prepared; per-item
/// extraction failures and discovery trouble degrade to fewer leads instead.
pub async fn scrape_with<S: Browse>(
    session: &S,
    query: &str,
    opts: &ScrapeOptions,
) -> Result<Vec<Lead>> {
    if opts.target_leads == 0 {
        return Ok(Vec::new());
    }

    let queue = Arc::new(WorkQueue::new());
    let sink = Arc::new(LeadSink::new());

    let count = effective_worker_count(opts.max_tabs, opts.target_leads);
    let workers =
        spawn_workers(session, count, &queue, &sink, opts.budgets, opts.viewport).await?;
    tracing::info!(
        "scraping {:?}: up to {} leads across {} tabs",
        query,
        opts.target_leads,
        workers.len()
    );

    let links = discover_with(
        session,
        query,
        opts.target_leads,
        Some(queue.as_ref()),
        &opts.discovery,
    )
    .await;
    tracing::info!("discovery finished with {} links", links.len());

    workers.shutdown(&queue).await;

    let leads = sink.take();
    tracing::info!("extracted {} of {} discovered links", leads.len(), links.len());
    Ok(leads)
}
