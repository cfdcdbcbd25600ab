use std::time::Duration;

use exam_core::model::{SessionClock, format_mm_ss};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Drives the session clock: one tick per second of wall-clock time,
/// independent of which part is currently displayed.
///
/// `MissedTickBehavior::Delay` keeps ticks strictly sequential: a tick
/// may arrive late but never double-fires. The ticker must be shut down
/// on session teardown; dropping it aborts the task as a backstop.
pub struct SessionTicker {
    timed: bool,
    seconds: watch::Receiver<u32>,
    handle: JoinHandle<()>,
}

impl SessionTicker {
    /// Spawn the 1 s interval driving the given clock.
    #[must_use]
    pub fn start(clock: SessionClock) -> Self {
        let timed = clock.is_timed();
        let (tx, seconds) = watch::channel(clock.seconds());

        let handle = tokio::spawn(async move {
            let mut clock = clock;
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; the countdown starts
            // one full second later
            interval.tick().await;
            loop {
                interval.tick().await;
                clock.tick();
                if tx.send(clock.seconds()).is_err() {
                    break;
                }
            }
        });

        Self {
            timed,
            seconds,
            handle,
        }
    }

    /// Remaining seconds when timed, elapsed seconds when untimed.
    #[must_use]
    pub fn seconds(&self) -> u32 {
        *self.seconds.borrow()
    }

    /// A receiver observers can await for per-second updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.seconds.clone()
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.timed
    }

    /// A timed session whose countdown reached zero. Expiry is
    /// observable state only; the ticker never auto-submits.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.timed && self.seconds() == 0
    }

    /// `mm:ss` form of the current counter.
    #[must_use]
    pub fn display(&self) -> String {
        format_mm_ss(self.seconds())
    }

    /// Cancel the interval. Safe to call more than once.
    pub fn shutdown(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, sleep};

    async fn settle(secs: u64) {
        // let the spawned task set up its interval before time moves
        sleep(Duration::from_millis(1)).await;
        // step past each tick boundary so the paused clock fires them in order
        for _ in 0..secs {
            advance(Duration::from_secs(1)).await;
            sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn untimed_ticker_counts_up() {
        let ticker = SessionTicker::start(SessionClock::new(None));
        assert_eq!(ticker.seconds(), 0);
        assert!(!ticker.is_timed());

        settle(3).await;
        assert_eq!(ticker.seconds(), 3);
        assert!(!ticker.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn timed_ticker_counts_down_to_zero_and_stops_there() {
        let ticker = SessionTicker::start(SessionClock::new(Some(2)));
        assert_eq!(ticker.seconds(), 2);

        settle(2).await;
        assert_eq!(ticker.seconds(), 0);
        assert!(ticker.is_expired());

        settle(5).await;
        assert_eq!(ticker.seconds(), 0, "floored at zero, never negative");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_the_interval() {
        let ticker = SessionTicker::start(SessionClock::new(None));
        settle(2).await;
        assert_eq!(ticker.seconds(), 2);

        ticker.shutdown();
        settle(1).await;
        assert!(ticker.is_stopped());

        settle(4).await;
        assert_eq!(ticker.seconds(), 2, "no ticks after teardown");
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_every_second() {
        let ticker = SessionTicker::start(SessionClock::new(Some(10)));
        let mut rx = ticker.subscribe();

        settle(1).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 9);

        settle(1).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn display_formats_mm_ss() {
        let ticker = SessionTicker::start(SessionClock::new(Some(125)));
        assert_eq!(ticker.display(), "02:05");
        settle(1).await;
        assert_eq!(ticker.display(), "02:04");
    }
}
