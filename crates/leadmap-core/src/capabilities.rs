//! Browser capability traits.
//!
//! The scraping core never talks to an automation engine directly; it is
//! written against [`Browse`] (open tabs) and [`TabHandle`] (drive one tab).
//! Any engine that can satisfy these traits is pluggable: the production
//! implementation lives in `leadmap-browser`, and the test suite supplies
//! scripted fakes.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Errors surfaced by tab-level operations.
#[derive(Debug, Clone, Error)]
pub enum TabError {
    /// Navigation to a URL failed
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Script evaluation failed or produced an unusable value
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// A selector lookup failed at the protocol level
    #[error("selector lookup failed: {0}")]
    Selector(String),

    /// The tab or its session is gone
    #[error("tab closed: {0}")]
    Closed(String),
}

/// Result alias for capability operations.
pub type TabResult<T> = std::result::Result<T, TabError>;

/// Viewport dimensions for a newly opened tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport with explicit dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    /// The minimal 800x600 viewport used across the pipeline.
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Coarse resource classes for request filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Top-level or frame document
    Document,
    /// CSS
    Stylesheet,
    /// JavaScript
    Script,
    /// Images
    Image,
    /// Audio/video
    Media,
    /// Web fonts
    Font,
    /// XHR/fetch requests
    Xhr,
    /// Ping/beacon requests
    Ping,
    /// WebSocket connections
    WebSocket,
    /// Anything else
    Other,
}

/// Predicate deciding which request classes a tab should abort.
///
/// The pipeline installs [`ResourcePolicy::block_heavy`] on every extraction
/// tab: aborting images, media, fonts, pings and websockets cuts bandwidth
/// and render cost, and extraction only reads text content anyway.
#[derive(Debug, Clone, Default)]
pub struct ResourcePolicy {
    blocked: HashSet<ResourceKind>,
}

impl ResourcePolicy {
    /// A policy that blocks nothing.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// The standard extraction-tab policy: abort heavy resource classes.
    #[must_use]
    pub fn block_heavy() -> Self {
        Self::allow_all()
            .block(ResourceKind::Image)
            .block(ResourceKind::Media)
            .block(ResourceKind::Font)
            .block(ResourceKind::Ping)
            .block(ResourceKind::WebSocket)
    }

    /// Add a resource class to the blocked set.
    #[must_use]
    pub fn block(mut self, kind: ResourceKind) -> Self {
        self.blocked.insert(kind);
        self
    }

    /// Whether a request of the given class should be aborted.
    #[must_use]
    pub fn should_block(&self, kind: ResourceKind) -> bool {
        self.blocked.contains(&kind)
    }
}

/// One browser tab, exclusively owned by a single producer or worker for its
/// whole lifetime and reused across many work items.
#[async_trait]
pub trait TabHandle: Send + Sync {
    /// Navigate to a URL.
    ///
    /// Carries no timeout of its own; callers that need a budget wrap this
    /// in a sliced wait and use [`TabHandle::stop_loading`] as the
    /// cancellation handle.
    async fn navigate(&self, url: &str) -> TabResult<()>;

    /// Resolve once an element matching `selector` exists in the document.
    ///
    /// Implementations may poll indefinitely; the caller owns the budget.
    async fn wait_for(&self, selector: &str) -> TabResult<()>;

    /// Evaluate a script in the page and return its JSON value.
    async fn evaluate(&self, script: &str) -> TabResult<Value>;

    /// Install a request filter that aborts blocked resource classes.
    async fn install_request_filter(&self, policy: ResourcePolicy) -> TabResult<()>;

    /// Best-effort cancellation of an in-flight navigation.
    async fn stop_loading(&self) -> TabResult<()>;

    /// Close the tab. Closing an already-closed tab must not panic.
    async fn close(&self) -> TabResult<()>;
}

/// A browser session capable of opening tabs.
#[async_trait]
pub trait Browse: Send + Sync {
    /// The tab type this session produces. `Clone` lets the orchestrator
    /// retain a teardown handle while a worker task owns the tab.
    type Tab: TabHandle + Clone + Send + Sync + 'static;

    /// Open a new tab with the given viewport.
    async fn open_tab(&self, viewport: Viewport) -> TabResult<Self::Tab>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let vp = Viewport::default();
        assert_eq!(vp.width, 800);
        assert_eq!(vp.height, 600);
    }

    #[test]
    fn test_block_heavy_policy() {
        let policy = ResourcePolicy::block_heavy();
        assert!(policy.should_block(ResourceKind::Image));
        assert!(policy.should_block(ResourceKind::Media));
        assert!(policy.should_block(ResourceKind::Font));
        assert!(policy.should_block(ResourceKind::Ping));
        assert!(policy.should_block(ResourceKind::WebSocket));

        assert!(!policy.should_block(ResourceKind::Document));
        assert!(!policy.should_block(ResourceKind::Script));
        assert!(!policy.should_block(ResourceKind::Xhr));
    }

    #[test]
    fn test_allow_all_policy() {
        let policy = ResourcePolicy::allow_all();
        assert!(!policy.should_block(ResourceKind::Image));
        assert!(!policy.should_block(ResourceKind::Document));
    }

    #[test]
    fn test_tab_error_display() {
        let err = TabError::Navigation("net::ERR_FAILED".to_string());
        assert_eq!(err.to_string(), "navigation failed: net::ERR_FAILED");
    }
}
