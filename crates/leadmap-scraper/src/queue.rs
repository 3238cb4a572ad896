//! Shared work queue and result sink.
//!
//! [`WorkQueue`] is the single coordination point between the discovery
//! producer and the extraction workers: a FIFO multi-producer/multi-consumer
//! queue of [`Task`]s with asyncio-style completion bookkeeping. Every pushed
//! task must be acknowledged after processing; [`WorkQueue::join`] resolves
//! only once everything pushed has been both popped and acknowledged, which
//! gives the orchestrator its happens-before edge for teardown.

use leadmap_core::Lead;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

// A panic while one of these guards is held only ever interrupts a plain
// push/pop on the inner collection, which cannot leave it inconsistent, so
// poisoned locks are recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One queue element: a unit of extraction work or a shutdown sentinel.
///
/// Exactly one `Shutdown` is pushed per worker at shutdown time. Because the
/// queue is FIFO, a worker only sees its sentinel after every previously
/// enqueued item has been handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Visit this place URL and extract a lead from it
    Visit(String),
    /// No more work for the worker that pops this
    Shutdown,
}

/// FIFO MPMC queue with pop/acknowledge accounting.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<Task>>,
    item_ready: Notify,
    /// Pushed but not yet acknowledged.
    outstanding: AtomicUsize,
    drained: Notify,
}

impl WorkQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a task. Never blocks.
    pub fn push(&self, task: Task) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        lock(&self.items).push_back(task);
        self.item_ready.notify_one();
    }

    /// Dequeue the next task, waiting until one is available.
    pub async fn pop(&self) -> Task {
        loop {
            // The notified future must exist before the emptiness check, or a
            // push landing between check and await would be missed.
            let notified = self.item_ready.notified();
            {
                let mut items = lock(&self.items);
                if let Some(task) = items.pop_front() {
                    if !items.is_empty() {
                        // Pass the wakeup along: Notify stores at most one
                        // permit, so a burst of pushes can under-notify.
                        self.item_ready.notify_one();
                    }
                    return task;
                }
            }
            notified.await;
        }
    }

    /// Acknowledge one previously popped task as fully processed.
    ///
    /// Must be called exactly once per pop, success or failure, since the join
    /// count only stays correct if failed items are acknowledged too.
    pub fn ack(&self) {
        let prev = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev > 0, "ack without matching push");
        if prev == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every pushed task has been popped and acknowledged.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Tasks pushed but not yet acknowledged.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

/// Append-only shared collection of extracted leads.
///
/// Workers append in completion order, so the final order carries no
/// relation to discovery order.
#[derive(Debug, Default)]
pub struct LeadSink {
    leads: Mutex<Vec<Lead>>,
}

impl LeadSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one lead.
    pub fn push(&self, lead: Lead) {
        lock(&self.leads).push(lead);
    }

    /// Number of leads collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.leads).len()
    }

    /// Whether the sink is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the sink, leaving it empty.
    #[must_use]
    pub fn take(&self) -> Vec<Lead> {
        std::mem::take(&mut *lock(&self.leads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.push(Task::Visit("u1".to_string()));
        queue.push(Task::Visit("u2".to_string()));
        queue.push(Task::Shutdown);

        assert_eq!(queue.pop().await, Task::Visit("u1".to_string()));
        assert_eq!(queue.pop().await, Task::Visit("u2".to_string()));
        assert_eq!(queue.pop().await, Task::Shutdown);
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(WorkQueue::new());

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(Task::Visit("late".to_string()));

        let task = consumer.await.expect("consumer task");
        assert_eq!(task, Task::Visit("late".to_string()));
    }

    #[tokio::test]
    async fn test_join_waits_for_acks() {
        let queue = Arc::new(WorkQueue::new());
        queue.push(Task::Visit("u1".to_string()));
        queue.push(Task::Visit("u2".to_string()));

        let _ = queue.pop().await;
        let _ = queue.pop().await;
        queue.ack();

        // One task popped but unacknowledged: join must still block.
        let pending = tokio::time::timeout(Duration::from_millis(30), queue.join()).await;
        assert!(pending.is_err(), "join resolved before final ack");

        queue.ack();
        tokio::time::timeout(Duration::from_millis(100), queue.join())
            .await
            .expect("join after all acks");
        assert_eq!(queue.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_join_on_empty_queue_returns_immediately() {
        let queue = WorkQueue::new();
        tokio::time::timeout(Duration::from_millis(50), queue.join())
            .await
            .expect("empty join");
    }

    #[tokio::test]
    async fn test_concurrent_consumers_drain_everything() {
        let queue = Arc::new(WorkQueue::new());
        for i in 0..20 {
            queue.push(Task::Visit(format!("u{i}")));
        }
        queue.push(Task::Shutdown);
        queue.push(Task::Shutdown);

        let mut consumers = Vec::new();
        for _ in 0..2 {
            let queue = queue.clone();
            consumers.push(tokio::spawn(async move {
                let mut seen = 0;
                loop {
                    match queue.pop().await {
                        Task::Visit(_) => {
                            seen += 1;
                            queue.ack();
                        }
                        Task::Shutdown => {
                            queue.ack();
                            break;
                        }
                    }
                }
                seen
            }));
        }

        let mut total = 0;
        for consumer in consumers {
            total += consumer.await.expect("consumer task");
        }
        assert_eq!(total, 20);

        tokio::time::timeout(Duration::from_millis(100), queue.join())
            .await
            .expect("join after drain");
    }

    #[tokio::test]
    async fn test_sink_take_leaves_empty() {
        let sink = LeadSink::new();
        sink.push(Lead {
            name: "Ace".to_string(),
            address: None,
            phone: None,
            website: None,
        });
        assert_eq!(sink.len(), 1);

        let leads = sink.take();
        assert_eq!(leads.len(), 1);
        assert!(sink.is_empty());
    }
}
