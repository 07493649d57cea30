//! Polling driver and new-message detection shared by both loops.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use common::AppResult;

/// Run `tick` every `period` until `shutdown` resolves.
///
/// The first tick fires immediately. A failed tick is logged and the loop
/// carries on; returns how many ticks ran.
pub async fn run_polling<F, Fut, S>(period: Duration, shutdown: S, mut tick: F) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<()>>,
    S: Future<Output = ()>,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!(ticks, "polling stopped");
                return ticks;
            }
            _ = interval.tick() => {
                ticks += 1;
                if let Err(e) = tick().await {
                    warn!(error = %e, code = e.code(), "poll tick failed");
                }
            }
        }
    }
}

/// Tracks a message count across ticks to spot growth.
#[derive(Debug, Default)]
pub struct MessageWatch {
    last_count: usize,
    primed: bool,
}

impl MessageWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest count.
    ///
    /// Returns the previous count when the new one is larger. The first
    /// observation only sets the baseline.
    pub fn observe(&mut self, count: usize) -> Option<usize> {
        let grown = (self.primed && count > self.last_count).then_some(self.last_count);
        self.last_count = count;
        self.primed = true;
        grown
    }

    /// Count messages the local user just sent so they don't read as new.
    pub fn record_own(&mut self, sent: usize) {
        if self.primed {
            self.last_count += sent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_first_observation_is_baseline() {
        let mut watch = MessageWatch::new();
        assert_eq!(watch.observe(7), None);
        assert_eq!(watch.observe(7), None);
        assert_eq!(watch.observe(9), Some(7));
        assert_eq!(watch.observe(8), None);
    }

    #[test]
    fn test_own_messages_shift_baseline() {
        let mut watch = MessageWatch::new();
        watch.record_own(1);
        assert_eq!(watch.observe(3), None);

        watch.record_own(1);
        assert_eq!(watch.observe(4), None);
        assert_eq!(watch.observe(5), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_ticks_until_shutdown() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);

        let ticks = run_polling(
            Duration::from_secs(5),
            time::sleep(Duration::from_secs(12)),
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), AppError>(())
                }
            },
        )
        .await;

        // t = 0s, 5s, 10s
        assert_eq!(ticks, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_keeps_polling() {
        let ticks = run_polling(
            Duration::from_secs(2),
            time::sleep(Duration::from_secs(5)),
            || async { Err(AppError::internal("store unavailable")) },
        )
        .await;

        assert_eq!(ticks, 3);
    }
}
