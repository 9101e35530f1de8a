//! Deadline helper.
//!
//! The streaming core has no built-in timeout. A deadline is expressed by
//! racing a timer against the same cancellation token the stream observes.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancel `token` once `duration` elapses.
///
/// The timer task exits early if the token is cancelled by someone else.
/// Abort the returned handle to disarm the deadline.
pub fn cancel_after(token: &CancellationToken, duration: Duration) -> JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(duration) => {
                debug!(after_ms = duration.as_millis() as u64, "deadline reached");
                token.cancel();
            }
        }
    })
}
