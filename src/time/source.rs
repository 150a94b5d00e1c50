//! Time source abstraction for supporting both real-time and simulated time.
//!
//! Every loop in the engine reads the clock and sleeps through a [`TimeSource`]
//! handed to it at construction. The daemon uses [`RealTimeSource`]; the
//! `simulate` command uses [`SimulatedTimeSource`] to run a whole day of weather
//! in minutes; tests use [`SteppedTimeSource`], whose clock only moves when a
//! caller sleeps.
//!
//! A process-wide instance is also kept so the logger can prefix lines with the
//! simulated wall clock.

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::Arc;
#[cfg(any(test, feature = "testing-support"))]
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Simulated seconds per real second when none is given.
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 3600.0;

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Linearly accelerated clock shared by all engine threads.
///
/// Simulated time is derived from real elapsed time, so several threads
/// sleeping concurrently observe one coherent clock. Sleeps are shortened by
/// the multiplier and capped at the simulation end.
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    /// Simulated seconds per real second
    time_multiplier: f64,
    real_start: Instant,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// Non-positive multipliers fall back to one simulated hour per real second.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        Self {
            start_time,
            end_time,
            time_multiplier: if multiplier > 0.0 {
                multiplier
            } else {
                DEFAULT_SIMULATION_MULTIPLIER
            },
            real_start: Instant::now(),
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.time_multiplier
    }

    fn current_time(&self) -> DateTime<Local> {
        let simulated_secs = self.real_start.elapsed().as_secs_f64() * self.time_multiplier;
        let simulated = self.start_time + chrono_from_secs(simulated_secs);
        simulated.min(self.end_time)
    }

    fn remaining(&self) -> StdDuration {
        (self.end_time - self.current_time())
            .to_std()
            .unwrap_or(StdDuration::ZERO)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        let simulated = duration.min(self.remaining());
        if simulated.is_zero() {
            // Keep callers that loop on sleep from spinning once the end is reached
            std::thread::sleep(StdDuration::from_millis(1));
            return;
        }
        std::thread::sleep(simulated.div_f64(self.time_multiplier));
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Virtual clock that advances only when slept on.
///
/// Sleeping returns immediately after moving the clock forward, which makes
/// hour-long weather phases run instantly and deterministically.
#[cfg(any(test, feature = "testing-support"))]
pub struct SteppedTimeSource {
    current: Mutex<DateTime<Local>>,
    slept: Mutex<StdDuration>,
}

#[cfg(any(test, feature = "testing-support"))]
impl SteppedTimeSource {
    pub fn new(start_time: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start_time),
            slept: Mutex::new(StdDuration::ZERO),
        }
    }

    /// Start at the given local hour of an arbitrary fixed day.
    pub fn at_hour(hour: u32) -> Self {
        let start = Local
            .with_ymd_and_hms(2025, 6, 14, hour % 24, 0, 0)
            .single()
            .unwrap_or_else(Local::now);
        Self::new(start)
    }

    pub fn advance(&self, duration: StdDuration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += chrono_from_secs(duration.as_secs_f64());
    }

    /// Total simulated time spent in `sleep` calls.
    pub fn total_slept(&self) -> StdDuration {
        *self.slept.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl TimeSource for SteppedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: StdDuration) {
        self.advance(duration);
        *self.slept.lock().unwrap_or_else(|e| e.into_inner()) += duration;
        std::thread::yield_now();
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

fn chrono_from_secs(secs: f64) -> ChronoDuration {
    ChronoDuration::seconds(secs as i64)
        + ChronoDuration::nanoseconds((secs.fract() * 1_000_000_000.0) as i64)
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Get the global time source, defaulting to the real clock.
pub fn global() -> Arc<dyn TimeSource> {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .clone()
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Check if we're running in simulation mode
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS"
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    use chrono::NaiveDateTime;

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
        .and_then(|naive| {
            Local
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| "Ambiguous or invalid local time".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_datetime_valid() {
        let parsed = parse_datetime("2025-06-14 18:30:00").unwrap();
        assert_eq!(parsed.hour(), 18);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_parse_datetime_rejects_bad_format() {
        assert!(parse_datetime("18:30").is_err());
        assert!(parse_datetime("2025-06-14T18:30:00").is_err());
    }

    #[test]
    fn test_stepped_source_advances_only_on_sleep() {
        let source = SteppedTimeSource::at_hour(17);
        let before = source.now();
        assert_eq!(source.now(), before);

        source.sleep(StdDuration::from_secs(3600));
        assert_eq!(source.now().hour(), 18);
        assert_eq!(source.total_slept(), StdDuration::from_secs(3600));
    }

    #[test]
    fn test_simulated_source_caps_at_end() {
        let start = parse_datetime("2025-06-14 10:00:00").unwrap();
        let end = parse_datetime("2025-06-14 10:00:01").unwrap();
        let source = SimulatedTimeSource::new(start, end, 1_000_000.0);

        source.sleep(StdDuration::from_secs(10));
        assert!(source.is_ended());
        assert_eq!(source.now(), end);
    }

    #[test]
    fn test_simulated_source_defaults_multiplier() {
        let start = parse_datetime("2025-06-14 10:00:00").unwrap();
        let end = parse_datetime("2025-06-14 11:00:00").unwrap();
        let source = SimulatedTimeSource::new(start, end, 0.0);
        assert_eq!(source.multiplier(), 3600.0);
        assert!(source.is_simulated());
    }
}
