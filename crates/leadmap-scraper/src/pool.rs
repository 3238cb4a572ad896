//! Fixed-size extraction worker pool.
//!
//! The pool opens one long-lived tab per worker, spawns the worker loops,
//! and owns the shutdown handshake: one [`Task::Shutdown`] sentinel per
//! worker, then a queue join, then tab teardown. Tabs are opened up front so
//! a setup failure can unwind cleanly before any worker runs.

use crate::error::{Result, ScrapeError};
use crate::queue::{LeadSink, Task, WorkQueue};
use crate::worker::{run_worker, ExtractBudgets};
use leadmap_core::{Browse, Lead, ResourcePolicy, TabHandle, Viewport};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Number of workers actually worth running: never more than the work
/// available, never more than the tab ceiling, never zero.
#[must_use]
pub fn effective_worker_count(max_tabs: usize, work: usize) -> usize {
    max_tabs.min(work).max(1)
}

/// Open a tab prepared for extraction: the configured viewport, heavy
/// resource classes aborted. The tab is closed again if preparation fails
/// partway.
pub(crate) async fn open_extraction_tab<S: Browse>(
    session: &S,
    viewport: Viewport,
) -> Result<S::Tab> {
    let tab = session.open_tab(viewport).await?;
    if let Err(e) = tab.install_request_filter(ResourcePolicy::block_heavy()).await {
        if let Err(close_err) = tab.close().await {
            tracing::debug!("closing half-prepared tab failed: {}", close_err);
        }
        return Err(ScrapeError::TabSetup(e));
    }
    Ok(tab)
}

/// Live worker tasks plus the tab handles retained for teardown.
pub(crate) struct TabWorkers<T> {
    tabs: Vec<T>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: TabHandle + Clone + Send + Sync + 'static> TabWorkers<T> {
    /// Number of running workers.
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Signal and wait out the pool: one sentinel per worker, a join on the
    /// queue so every pushed item is acknowledged, then worker tasks and
    /// finally the tabs themselves.
    pub(crate) async fn shutdown(self, queue: &WorkQueue) {
        for _ in 0..self.handles.len() {
            queue.push(Task::Shutdown);
        }
        queue.join().await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!("worker task failed: {}", e);
            }
        }

        for tab in self.tabs {
            if let Err(e) = tab.close().await {
                tracing::debug!("worker tab close failed: {}", e);
            }
        }
    }
}

/// Open `count` extraction tabs and start a worker loop on each.
///
/// All tabs are opened before any worker is spawned; if one fails, the
/// already-open tabs are closed and the error is returned with nothing
/// running.
pub(crate) async fn spawn_workers<S: Browse>(
    session: &S,
    count: usize,
    queue: &Arc<WorkQueue>,
    sink: &Arc<LeadSink>,
    budgets: ExtractBudgets,
    viewport: Viewport,
) -> Result<TabWorkers<S::Tab>> {
    let mut tabs = Vec::with_capacity(count);
    for _ in 0..count {
        match open_extraction_tab(session, viewport).await {
            Ok(tab) => tabs.push(tab),
            Err(e) => {
                for tab in &tabs {
                    if let Err(close_err) = tab.close().await {
                        tracing::debug!("unwinding tab close failed: {}", close_err);
                    }
                }
                return Err(e);
            }
        }
    }

    let handles = tabs
        .iter()
        .map(|tab| {
            tokio::spawn(run_worker(
                tab.clone(),
                Arc::clone(queue),
                Arc::clone(sink),
                budgets,
            ))
        })
        .collect();

    Ok(TabWorkers { tabs, handles })
}

/// Extract leads from an already-known list of place links with default
/// budgets.
pub async fn run_pool<S: Browse>(
    session: &S,
    urls: &[String],
    max_tabs: usize,
) -> Result<Vec<Lead>> {
    run_pool_with(session, urls, max_tabs, ExtractBudgets::default()).await
}

/// [`run_pool`] with explicit per-phase budgets.
pub async fn run_pool_with<S: Browse>(
    session: &S,
    urls: &[String],
    max_tabs: usize,
    budgets: ExtractBudgets,
) -> Result<Vec<Lead>> {
    if urls.is_empty() {
        return Ok(Vec::new());
    }

    let queue = Arc::new(WorkQueue::new());
    let sink = Arc::new(LeadSink::new());
    for url in urls {
        queue.push(Task::Visit(url.clone()));
    }

    let count = effective_worker_count(max_tabs, urls.len());
    let workers =
        spawn_workers(session, count, &queue, &sink, budgets, Viewport::default()).await?;
    tracing::debug!("extracting {} links across {} tabs", urls.len(), workers.len());
    workers.shutdown(&queue).await;

    Ok(sink.take())
}
