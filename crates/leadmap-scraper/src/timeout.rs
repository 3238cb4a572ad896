//! Slice-based timeout supervision.
//!
//! Instead of one oversized timer per phase, a budget is enforced by polling
//! the operation in short fixed slices. This keeps every wait interruptible
//! at slice granularity, which lets a worker compose several sequentially
//! timeout-governed phases and abandon a stuck remote operation promptly.

use std::future::Future;
use std::time::Duration;

/// Granularity of sliced waits.
pub const WAIT_SLICE: Duration = Duration::from_secs(2);

/// Run `op` under a total `budget`, polling in [`WAIT_SLICE`] increments.
///
/// Returns `Some(output)` when the operation completes within budget and
/// `None` on exhaustion. On exhaustion the `cancel` future runs first:
/// best-effort cancellation whose own errors the caller is expected to have
/// swallowed inside the future.
///
/// An operation that completes exactly at a slice boundary is reported as
/// success; the race resolves in favor of completion.
pub async fn sliced<T>(
    op: impl Future<Output = T>,
    cancel: impl Future<Output = ()>,
    budget: Duration,
) -> Option<T> {
    sliced_with(op, cancel, budget, WAIT_SLICE).await
}

/// [`sliced`] with an explicit slice size.
pub async fn sliced_with<T>(
    op: impl Future<Output = T>,
    cancel: impl Future<Output = ()>,
    budget: Duration,
    slice: Duration,
) -> Option<T> {
    tokio::pin!(op);
    let mut remaining = budget;

    loop {
        let step = remaining.min(slice);
        match tokio::time::timeout(step, &mut op).await {
            Ok(output) => return Some(output),
            Err(_) => {
                remaining = remaining.saturating_sub(step);
                if remaining.is_zero() {
                    cancel.await;
                    return None;
                }
            }
        }
    }
}
