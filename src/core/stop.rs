//! Cooperative shutdown flag shared by every engine loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::common::constants::STOP_CHECK_INTERVAL_MS;
use crate::time::TimeSource;

/// Shared "keep running" flag.
///
/// Cloning is cheap; all clones observe the same flag. Loops wait through
/// [`StopSignal::sleep`] so a stop request is noticed within one chunk.
#[derive(Clone, Debug)]
pub struct StopSignal {
    running: Arc<AtomicBool>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Sleep for `duration`, waking at least once per second to re-check the flag.
    ///
    /// Returns `true` if the full duration elapsed, `false` if stopped early.
    pub fn sleep(&self, duration: Duration, time: &dyn TimeSource) -> bool {
        self.sleep_in_chunks(duration, Duration::from_millis(STOP_CHECK_INTERVAL_MS), time)
    }

    /// Sleep for `duration` in chunks no longer than `chunk`.
    pub fn sleep_in_chunks(&self, duration: Duration, chunk: Duration, time: &dyn TimeSource) -> bool {
        let chunk = if chunk.is_zero() {
            Duration::from_millis(STOP_CHECK_INTERVAL_MS)
        } else {
            chunk
        };
        let mut remaining = duration;

        while !remaining.is_zero() {
            if !self.is_running() || time.is_ended() {
                return false;
            }
            let step = remaining.min(chunk);
            time.sleep(step);
            remaining -= step;
        }

        self.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::source::SteppedTimeSource;

    #[test]
    fn test_sleep_completes_when_running() {
        let stop = StopSignal::new();
        let time = SteppedTimeSource::at_hour(9);
        assert!(stop.sleep(Duration::from_secs(90), &time));
        assert_eq!(time.total_slept(), Duration::from_secs(90));
    }

    #[test]
    fn test_sleep_returns_immediately_when_stopped() {
        let stop = StopSignal::new();
        let time = SteppedTimeSource::at_hour(9);
        stop.stop();
        assert!(!stop.sleep(Duration::from_secs(90), &time));
        assert_eq!(time.total_slept(), Duration::ZERO);
    }

    #[test]
    fn test_clones_share_flag() {
        let stop = StopSignal::new();
        let other = stop.clone();
        other.stop();
        assert!(!stop.is_running());
    }

    /// Clock that raises the stop flag after a number of sleeps.
    struct StoppingClock {
        inner: SteppedTimeSource,
        stop: StopSignal,
        stop_after: usize,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl TimeSource for StoppingClock {
        fn now(&self) -> chrono::DateTime<chrono::Local> {
            self.inner.now()
        }
        fn sleep(&self, duration: Duration) {
            self.inner.sleep(duration);
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if calls == self.stop_after {
                self.stop.stop();
            }
        }
        fn is_simulated(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_stop_observed_within_one_chunk() {
        let stop = StopSignal::new();
        let clock = StoppingClock {
            inner: SteppedTimeSource::at_hour(9),
            stop: stop.clone(),
            stop_after: 3,
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        assert!(!stop.sleep(Duration::from_secs(300), &clock));
        // Three one-second chunks ran before the flag was seen
        assert_eq!(clock.inner.total_slept(), Duration::from_secs(3));
    }
}
