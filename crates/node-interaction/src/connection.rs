use std::{ops::ControlFlow, time::Duration};

use anyhow::{Context as _, Result};
use gunash_common::futures::{PollingWaitBehavior, poll};

/// How connection attempts to a freshly started node are retried.
///
/// A node that was just launched refuses connections until it finishes starting, so every failed
/// attempt is discarded and retried after [`interval`]. With no [`max_wait`] the attempts go on
/// forever; callers that want to give up earlier either set it or drop the future.
///
/// [`interval`]: ConnectRetryPolicy::interval
/// [`max_wait`]: ConnectRetryPolicy::max_wait
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectRetryPolicy {
    /// The time to wait between two attempts.
    pub interval: Duration,
    /// The total amount of waiting after which the node is considered unreachable.
    pub max_wait: Option<Duration>,
}

impl ConnectRetryPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);
}

impl Default for ConnectRetryPolicy {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_wait: None,
        }
    }
}

/// Calls `connect` until it produces a connection, waiting according to the [`ConnectRetryPolicy`]
/// between the attempts. Errors from the attempts are never surfaced, only exhausting the
/// [`ConnectRetryPolicy::max_wait`] is.
pub async fn establish_connection<C, F>(
    policy: ConnectRetryPolicy,
    mut connect: impl FnMut() -> F,
) -> Result<C>
where
    F: Future<Output = Result<C>>,
{
    poll(
        policy.max_wait,
        PollingWaitBehavior::Constant(policy.interval),
        || {
            let attempt = connect();
            async move {
                match attempt.await {
                    Ok(connection) => Ok(ControlFlow::Break(connection)),
                    Err(error) => {
                        tracing::debug!(%error, "Node is not reachable yet");
                        Ok(ControlFlow::Continue(()))
                    }
                }
            }
        },
    )
    .await
    .context("Failed to establish a connection to the node")
}
