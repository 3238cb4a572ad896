//! Scripted in-memory fakes for the [`Browse`] and [`TabHandle`] capability
//! traits.
//!
//! A [`FakeSession`] is configured up front with page fixtures and link
//! batches, then handed to the code under test in place of a live browser.
//! Every remote interaction is recorded so tests can assert on tab
//! lifecycles, cancellation, and which scripts actually ran.

use crate::scripts::{
    COLLECT_LINKS_JS, ENABLE_LIVE_RESULTS_JS, EXTRACT_LEAD_JS, FEED_SELECTOR, SCROLL_FEED_JS,
};
use async_trait::async_trait;
use leadmap_core::{Browse, ResourcePolicy, TabError, TabHandle, TabResult, Viewport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted outcome for one remote operation.
#[derive(Debug, Clone, Default)]
pub enum FakeOutcome {
    /// The operation completes immediately.
    #[default]
    Ready,
    /// The operation fails with the given message.
    Fail(String),
    /// The operation never completes.
    Hang,
}

impl FakeOutcome {
    async fn resolve(&self, err: impl FnOnce(String) -> TabError) -> TabResult<()> {
        match self {
            FakeOutcome::Ready => Ok(()),
            FakeOutcome::Fail(msg) => Err(err(msg.clone())),
            FakeOutcome::Hang => std::future::pending().await,
        }
    }
}

/// A scripted place page: what navigation and readiness do, and what the
/// extraction script returns once there.
#[derive(Debug, Clone)]
pub struct PageFixture {
    lead: Value,
    navigate: FakeOutcome,
    ready: FakeOutcome,
}

impl PageFixture {
    /// A page whose extraction script yields `lead`.
    pub fn with_lead(lead: Value) -> Self {
        Self {
            lead,
            navigate: FakeOutcome::Ready,
            ready: FakeOutcome::Ready,
        }
    }

    /// Overrides the navigation outcome.
    #[must_use]
    pub fn navigate(mut self, outcome: FakeOutcome) -> Self {
        self.navigate = outcome;
        self
    }

    /// Overrides the anchor-readiness outcome.
    #[must_use]
    pub fn ready(mut self, outcome: FakeOutcome) -> Self {
        self.ready = outcome;
        self
    }
}

#[derive(Debug, Default)]
struct SessionState {
    pages: Mutex<HashMap<String, PageFixture>>,
    link_batches: Mutex<Vec<Vec<String>>>,
    batch_cursor: AtomicUsize,
    feed: Mutex<FakeOutcome>,
    close: Mutex<FakeOutcome>,
    tab_limit: Mutex<Option<usize>>,
    opened_tabs: AtomicUsize,
    closed_tabs: AtomicUsize,
    opened_viewports: Mutex<Vec<Viewport>>,
    navigations: Mutex<Vec<String>>,
    collect_evaluations: AtomicUsize,
    extraction_evaluations: AtomicUsize,
    live_results_evaluations: AtomicUsize,
    installed_filters: Mutex<Vec<ResourcePolicy>>,
}

/// An in-memory [`Browse`] implementation backed by scripted fixtures.
#[derive(Debug, Default, Clone)]
pub struct FakeSession {
    state: Arc<SessionState>,
}

impl FakeSession {
    /// A session with no fixtures: every page extracts to null and the
    /// results feed is ready with no links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fixture for `url`.
    #[must_use]
    pub fn with_page(self, url: &str, fixture: PageFixture) -> Self {
        lock(&self.state.pages).insert(url.to_string(), fixture);
        self
    }

    /// Scripts the link batches successive collection rounds will return.
    /// Once exhausted, the last batch repeats.
    #[must_use]
    pub fn with_link_batches(self, batches: Vec<Vec<String>>) -> Self {
        *lock(&self.state.link_batches) = batches;
        self
    }

    /// Overrides the results-feed readiness outcome.
    #[must_use]
    pub fn with_feed(self, outcome: FakeOutcome) -> Self {
        *lock(&self.state.feed) = outcome;
        self
    }

    /// Overrides the tab-close outcome for every tab of this session.
    /// Close attempts are counted either way.
    #[must_use]
    pub fn with_close(self, outcome: FakeOutcome) -> Self {
        *lock(&self.state.close) = outcome;
        self
    }

    /// Caps how many tabs can be opened; further opens fail.
    #[must_use]
    pub fn with_tab_limit(self, limit: usize) -> Self {
        *lock(&self.state.tab_limit) = Some(limit);
        self
    }

    /// Number of tabs opened so far.
    pub fn opened_tabs(&self) -> usize {
        self.state.opened_tabs.load(Ordering::SeqCst)
    }

    /// Number of tab close attempts so far.
    pub fn closed_tabs(&self) -> usize {
        self.state.closed_tabs.load(Ordering::SeqCst)
    }

    /// The viewport of every opened tab, in open order.
    pub fn opened_viewports(&self) -> Vec<Viewport> {
        lock(&self.state.opened_viewports).clone()
    }

    /// Every URL navigated to, in order, across all tabs.
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.state.navigations).clone()
    }

    /// How many times the link-collection script ran.
    pub fn collect_evaluations(&self) -> usize {
        self.state.collect_evaluations.load(Ordering::SeqCst)
    }

    /// How many times the lead-extraction script ran.
    pub fn extraction_evaluations(&self) -> usize {
        self.state.extraction_evaluations.load(Ordering::SeqCst)
    }

    /// How many times the live-results toggle script ran.
    pub fn live_results_evaluations(&self) -> usize {
        self.state.live_results_evaluations.load(Ordering::SeqCst)
    }

    /// Every resource policy installed on any tab.
    pub fn installed_filters(&self) -> Vec<ResourcePolicy> {
        lock(&self.state.installed_filters).clone()
    }
}

#[async_trait]
impl Browse for FakeSession {
    type Tab = FakeTab;

    async fn open_tab(&self, viewport: Viewport) -> TabResult<Self::Tab> {
        if let Some(limit) = *lock(&self.state.tab_limit) {
            if self.state.opened_tabs.load(Ordering::SeqCst) >= limit {
                return Err(TabError::Closed("tab limit reached".to_string()));
            }
        }
        self.state.opened_tabs.fetch_add(1, Ordering::SeqCst);
        lock(&self.state.opened_viewports).push(viewport);
        Ok(FakeTab {
            session: Arc::clone(&self.state),
            tab: Arc::new(TabState::default()),
        })
    }
}

#[derive(Debug, Default)]
struct TabState {
    current_url: Mutex<Option<String>>,
    stop_loading_calls: AtomicUsize,
}

/// A tab handle over the shared [`FakeSession`] script.
#[derive(Debug, Clone)]
pub struct FakeTab {
    session: Arc<SessionState>,
    tab: Arc<TabState>,
}

impl FakeTab {
    /// How many times this tab was told to stop loading.
    pub fn stop_loading_calls(&self) -> usize {
        self.tab.stop_loading_calls.load(Ordering::SeqCst)
    }

    fn fixture(&self, url: &str) -> Option<PageFixture> {
        lock(&self.session.pages).get(url).cloned()
    }

    fn current_fixture(&self) -> Option<PageFixture> {
        let url = lock(&self.tab.current_url).clone()?;
        self.fixture(&url)
    }

    fn next_link_batch(&self) -> Vec<String> {
        let batches = lock(&self.session.link_batches);
        if batches.is_empty() {
            return Vec::new();
        }
        let cursor = self.session.batch_cursor.fetch_add(1, Ordering::SeqCst);
        batches[cursor.min(batches.len() - 1)].clone()
    }
}

#[async_trait]
impl TabHandle for FakeTab {
    async fn navigate(&self, url: &str) -> TabResult<()> {
        lock(&self.session.navigations).push(url.to_string());
        let outcome = self
            .fixture(url)
            .map(|f| f.navigate)
            .unwrap_or_default();
        outcome.resolve(TabError::Navigation).await?;
        *lock(&self.tab.current_url) = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> TabResult<()> {
        let outcome = if selector == FEED_SELECTOR {
            lock(&self.session.feed).clone()
        } else {
            self.current_fixture().map(|f| f.ready).unwrap_or_default()
        };
        outcome.resolve(TabError::Selector).await
    }

    async fn evaluate(&self, script: &str) -> TabResult<Value> {
        if script == COLLECT_LINKS_JS {
            self.session.collect_evaluations.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from(self.next_link_batch()))
        } else if script == EXTRACT_LEAD_JS {
            self.session
                .extraction_evaluations
                .fetch_add(1, Ordering::SeqCst);
            Ok(self
                .current_fixture()
                .map_or(Value::Null, |f| f.lead))
        } else if script == ENABLE_LIVE_RESULTS_JS {
            self.session
                .live_results_evaluations
                .fetch_add(1, Ordering::SeqCst);
            Ok(Value::Bool(true))
        } else if script == SCROLL_FEED_JS {
            Ok(Value::Null)
        } else {
            Err(TabError::Evaluation(format!(
                "unscripted evaluation: {script}"
            )))
        }
    }

    async fn install_request_filter(&self, policy: ResourcePolicy) -> TabResult<()> {
        lock(&self.session.installed_filters).push(policy);
        Ok(())
    }

    async fn stop_loading(&self) -> TabResult<()> {
        self.tab.stop_loading_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> TabResult<()> {
        self.session.closed_tabs.fetch_add(1, Ordering::SeqCst);
        let outcome = lock(&self.session.close).clone();
        outcome.resolve(TabError::Closed).await
    }
}
