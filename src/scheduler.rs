//! Fixed-interval recording loop
//!
//! The loop is strictly sequential: the task runs to completion inside the
//! loop body before the next wait is armed, so attempts never overlap and
//! late ticks are delayed rather than queued. Cancellation is cooperative
//! and observed only at the wait boundary, never mid-task.

use anyhow::Result;
use log::{error, info, warn};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Interval applied when the configured one is not positive
pub const DEFAULT_INTERVAL_MINUTES: i64 = 10;

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval_minutes: i64) -> Self {
        let minutes = if interval_minutes <= 0 {
            warn!("scheduler interval not configured, using default {DEFAULT_INTERVAL_MINUTES} minutes");
            DEFAULT_INTERVAL_MINUTES
        } else {
            interval_minutes
        };

        Self {
            interval: Duration::from_secs(minutes as u64 * 60),
        }
    }

    /// Run `task` once per interval until `cancel` fires.
    ///
    /// Consumes the scheduler: once this returns the instance is gone, and
    /// starting again requires a new one. Task failures are logged and the
    /// loop continues.
    pub async fn run<F>(self, mut task: F, cancel: CancellationToken)
    where
        F: FnMut() -> Result<()>,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick of a tokio interval completes immediately; consume
        // it so the first run happens one full interval after start
        ticker.tick().await;

        info!("scheduler started with interval: {:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = task() {
                        error!("scheduled record failed: {err:#}");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("scheduler stopped");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_non_positive_interval_corrected() {
        assert_eq!(
            Scheduler::new(0).interval,
            Duration::from_secs(DEFAULT_INTERVAL_MINUTES as u64 * 60)
        );
        assert_eq!(
            Scheduler::new(-5).interval,
            Duration::from_secs(DEFAULT_INTERVAL_MINUTES as u64 * 60)
        );
        assert_eq!(Scheduler::new(2).interval, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_runs_repeatedly_until_cancelled() {
        let scheduler = Scheduler {
            interval: Duration::from_millis(10),
        };
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let mut count = 0;
        scheduler
            .run(
                || {
                    count += 1;
                    Ok(())
                },
                cancel,
            )
            .await;

        assert!(count >= 2, "expected at least two runs, got {count}");
    }

    #[tokio::test]
    async fn test_task_failure_does_not_stop_loop() {
        let scheduler = Scheduler {
            interval: Duration::from_millis(10),
        };
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let mut count = 0;
        scheduler
            .run(
                || {
                    count += 1;
                    Err(anyhow!("boom"))
                },
                cancel,
            )
            .await;

        assert!(count >= 2, "loop should survive failures, got {count}");
    }

    #[tokio::test]
    async fn test_cancelled_before_first_tick_runs_nothing() {
        let scheduler = Scheduler {
            interval: Duration::from_secs(3600),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut count = 0;
        scheduler
            .run(
                || {
                    count += 1;
                    Ok(())
                },
                cancel,
            )
            .await;

        assert_eq!(count, 0);
    }
}
