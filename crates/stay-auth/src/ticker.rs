use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Fixed-interval background task driving the session-age counter.
///
/// At most one task runs per ticker: `start` replaces any previous task, and
/// the task is aborted on `stop` and on drop. The callback returns `false` to
/// end the task on its own.
#[derive(Debug)]
pub struct AgeTicker {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AgeTicker {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Spawn the ticking task. Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.stop();
        let interval = self.interval;
        self.handle = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if !on_tick() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for AgeTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let count = Arc::new(AtomicU64::new(0));
        let mut ticker = AgeTicker::new(Duration::from_secs(60));
        let counter = Arc::clone(&count);
        ticker.start(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticking() {
        let count = Arc::new(AtomicU64::new(0));
        let mut ticker = AgeTicker::new(Duration::from_secs(1));
        let counter = Arc::clone(&count);
        ticker.start(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        ticker.stop();
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(seen, 2);
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(!ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_end_the_task() {
        let mut ticker = AgeTicker::new(Duration::from_secs(1));
        ticker.start(|| false);

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(!ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_task() {
        let count = Arc::new(AtomicU64::new(0));
        let mut ticker = AgeTicker::new(Duration::from_secs(1));
        for _ in 0..3 {
            let counter = Arc::clone(&count);
            ticker.start(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            });
        }

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
