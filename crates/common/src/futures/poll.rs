use std::{ops::ControlFlow, time::Duration};

use anyhow::{Context as _, Result, anyhow};

const EXPONENTIAL_BACKOFF_MAX_WAIT_DURATION: Duration = Duration::from_secs(60);

/// A function that polls for a fallible future for some period of time and errors if it fails to
/// get a result after polling.
///
/// Given a future that returns a [`Result<ControlFlow<O, ()>>`], this function calls the future
/// repeatedly (with some wait period) until the future returns a [`ControlFlow::Break`] or until it
/// returns an [`Err`] in which case the function stops polling and returns the error.
///
/// If the future keeps returning [`ControlFlow::Continue`] and fails to return a [`Break`] within
/// the permitted polling duration then this function returns an [`Err`]. A polling duration of
/// [`None`] means that there is no limit and the function keeps polling until it gets a [`Break`].
///
/// The future returned by this function can be dropped at any point to cancel the polling, which
/// also drops the attempt that's in flight.
///
/// [`Break`]: ControlFlow::Break
/// [`Continue`]: ControlFlow::Continue
pub async fn poll<F, O>(
    polling_duration: impl Into<Option<Duration>>,
    polling_wait_behavior: PollingWaitBehavior,
    mut future: impl FnMut() -> F,
) -> Result<O>
where
    F: Future<Output = Result<ControlFlow<O, ()>>>,
{
    let mut retries = 0u32;
    let mut total_wait_duration = Duration::ZERO;
    let max_allowed_wait_duration = polling_duration.into();

    loop {
        if max_allowed_wait_duration.is_some_and(|max| total_wait_duration >= max) {
            break Err(anyhow!(
                "Polling failed after {} retries and a total of {:?} of wait time",
                retries,
                total_wait_duration
            ));
        }

        match future()
            .await
            .context("Polled future returned an error during polling loop")?
        {
            ControlFlow::Continue(()) => {
                let next_wait_duration = polling_wait_behavior.wait_duration(retries);
                let next_wait_duration = match max_allowed_wait_duration {
                    Some(max_allowed_wait_duration) => next_wait_duration
                        .min(max_allowed_wait_duration.saturating_sub(total_wait_duration)),
                    None => next_wait_duration,
                };
                total_wait_duration += next_wait_duration;
                retries = retries.saturating_add(1);

                tracing::trace!(retries, ?next_wait_duration, "Polled future not ready yet");
                tokio::time::sleep(next_wait_duration).await;
            }
            ControlFlow::Break(output) => {
                break Ok(output);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PollingWaitBehavior {
    Constant(Duration),
    #[default]
    ExponentialBackoff,
}

impl PollingWaitBehavior {
    /// The amount of time to wait after the given number of failed attempts.
    pub fn wait_duration(&self, retries: u32) -> Duration {
        match self {
            Self::Constant(duration) => *duration,
            Self::ExponentialBackoff => Duration::from_secs(2u64.saturating_pow(retries))
                .min(EXPONENTIAL_BACKOFF_MAX_WAIT_DURATION),
        }
    }
}
