//! Extraction worker: one persistent tab draining the shared queue.

use crate::queue::{LeadSink, Task, WorkQueue};
use crate::scripts::{EXTRACT_LEAD_JS, LEAD_ANCHOR_SELECTOR};
use crate::timeout::sliced;
use leadmap_core::{Lead, TabError, TabHandle};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Independent per-phase timeout budgets for one extraction attempt.
///
/// These are not a single end-to-end deadline: a navigation that times out
/// abandons the item immediately, it never lets the ready-wait "catch up".
#[derive(Debug, Clone, Copy)]
pub struct ExtractBudgets {
    /// Navigation budget
    pub navigation: Duration,
    /// Ready-wait budget (anchor element present)
    pub ready: Duration,
}

impl Default for ExtractBudgets {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(45),
            ready: Duration::from_secs(30),
        }
    }
}

/// Why a single work item produced no record.
///
/// Every variant is contained within the worker loop; none of them ever
/// aborts the worker or propagates to the orchestrator.
#[derive(Debug, Error)]
pub enum ItemFailure {
    /// Navigation exceeded its budget
    #[error("navigation timed out")]
    NavigationTimeout,

    /// The anchor element never appeared within budget
    #[error("ready-wait timed out")]
    ReadyTimeout,

    /// The extraction script ran but found no anchor element
    #[error("no anchor element in document")]
    MissingAnchor,

    /// A tab operation failed outright
    #[error(transparent)]
    Tab(#[from] TabError),
}

/// Attempt to extract a lead from one place URL.
///
/// Three phases: navigate (sliced, cancelled via `stop_loading` on budget
/// exhaustion), wait for the anchor element (sliced; dropping the wait is
/// its cancellation), then a single extraction `evaluate`. A timed-out or
/// failed phase abandons the item; later phases never run.
pub async fn extract_lead<T: TabHandle>(
    tab: &T,
    url: &str,
    budgets: &ExtractBudgets,
) -> Result<Lead, ItemFailure> {
    let cancel_navigation = async {
        let _ = tab.stop_loading().await;
    };
    match sliced(tab.navigate(url), cancel_navigation, budgets.navigation).await {
        None => return Err(ItemFailure::NavigationTimeout),
        Some(Err(e)) => return Err(e.into()),
        Some(Ok(())) => {}
    }

    match sliced(tab.wait_for(LEAD_ANCHOR_SELECTOR), async {}, budgets.ready).await {
        None => return Err(ItemFailure::ReadyTimeout),
        Some(Err(e)) => return Err(e.into()),
        Some(Ok(())) => {}
    }

    let value = tab.evaluate(EXTRACT_LEAD_JS).await?;
    Lead::from_value(&value).ok_or(ItemFailure::MissingAnchor)
}

/// Worker loop: pull items from the queue until the shutdown sentinel.
///
/// Successful extractions are appended to the sink; failures are logged and
/// dropped. The dequeue is acknowledged unconditionally, success or failure,
/// so the queue's join count stays correct.
pub async fn run_worker<T: TabHandle>(
    tab: T,
    queue: Arc<WorkQueue>,
    sink: Arc<LeadSink>,
    budgets: ExtractBudgets,
) {
    loop {
        match queue.pop().await {
            Task::Shutdown => {
                queue.ack();
                break;
            }
            Task::Visit(url) => {
                match extract_lead(&tab, &url, &budgets).await {
                    Ok(lead) => {
                        tracing::debug!("extracted lead {} from {}", lead.name, url);
                        sink.push(lead);
                    }
                    Err(failure) => {
                        tracing::debug!("no lead from {}: {}", url, failure);
                    }
                }
                queue.ack();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeOutcome, FakeSession, PageFixture};
    use leadmap_core::Browse;
    use serde_json::json;

    fn fast_budgets() -> ExtractBudgets {
        ExtractBudgets {
            navigation: Duration::from_millis(50),
            ready: Duration::from_millis(50),
        }
    }

    fn lead_fixture(name: &str) -> PageFixture {
        PageFixture::with_lead(json!({
            "name": name,
            "address": "N/A",
            "phone": "N/A",
            "website": "N/A",
        }))
    }

    #[tokio::test]
    async fn test_extract_lead_success() {
        let session = FakeSession::new().with_page("https://m/place/a", lead_fixture("Ace"));
        let tab = session.open_tab(Default::default()).await.expect("tab");

        let lead = extract_lead(&tab, "https://m/place/a", &fast_budgets())
            .await
            .expect("lead extracted");
        assert_eq!(lead.name, "Ace");
        assert!(lead.address.is_none());
    }

    #[tokio::test]
    async fn test_navigation_timeout_cancels_and_fails() {
        let session = FakeSession::new()
            .with_page("https://m/place/a", lead_fixture("Ace").navigate(FakeOutcome::Hang));
        let tab = session.open_tab(Default::default()).await.expect("tab");

        let failure = extract_lead(&tab, "https://m/place/a", &fast_budgets())
            .await
            .expect_err("should time out");
        assert!(matches!(failure, ItemFailure::NavigationTimeout));
        // Budget exhaustion actively cancels the navigation.
        assert_eq!(tab.stop_loading_calls(), 1);
    }

    #[tokio::test]
    async fn test_ready_timeout_fails_without_evaluate() {
        let session = FakeSession::new()
            .with_page("https://m/place/a", lead_fixture("Ace").ready(FakeOutcome::Hang));
        let tab = session.open_tab(Default::default()).await.expect("tab");

        let failure = extract_lead(&tab, "https://m/place/a", &fast_budgets())
            .await
            .expect_err("should time out");
        assert!(matches!(failure, ItemFailure::ReadyTimeout));
        assert_eq!(session.extraction_evaluations(), 0);
    }

    #[tokio::test]
    async fn test_null_extraction_is_missing_anchor() {
        let session = FakeSession::new()
            .with_page("https://m/place/a", PageFixture::with_lead(serde_json::Value::Null));
        let tab = session.open_tab(Default::default()).await.expect("tab");

        let failure = extract_lead(&tab, "https://m/place/a", &fast_budgets())
            .await
            .expect_err("null result produces no record");
        assert!(matches!(failure, ItemFailure::MissingAnchor));
    }

    #[tokio::test]
    async fn test_navigation_error_is_tab_failure() {
        let session = FakeSession::new().with_page(
            "https://m/place/a",
            lead_fixture("Ace").navigate(FakeOutcome::Fail("net::ERR_FAILED".to_string())),
        );
        let tab = session.open_tab(Default::default()).await.expect("tab");

        let failure = extract_lead(&tab, "https://m/place/a", &fast_budgets())
            .await
            .expect_err("navigation error fails the item");
        assert!(matches!(failure, ItemFailure::Tab(_)));
    }

    #[tokio::test]
    async fn test_worker_survives_failures_and_acks_everything() {
        let session = FakeSession::new()
            .with_page("https://m/place/bad", lead_fixture("Bad").navigate(FakeOutcome::Hang))
            .with_page("https://m/place/good", lead_fixture("Good"));
        let tab = session.open_tab(Default::default()).await.expect("tab");

        let queue = Arc::new(WorkQueue::new());
        let sink = Arc::new(LeadSink::new());
        queue.push(Task::Visit("https://m/place/bad".to_string()));
        queue.push(Task::Visit("https://m/place/good".to_string()));
        queue.push(Task::Shutdown);

        run_worker(tab, queue.clone(), sink.clone(), fast_budgets()).await;

        // The failed item did not stop the worker, and every pop was acked.
        assert_eq!(queue.outstanding(), 0);
        let leads = sink.take();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Good");
    }
}
