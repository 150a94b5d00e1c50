//! Clock and date overlay for the player window.
//!
//! Three centered lines, refreshed every second:
//!
//! ```text
//! GOOD EVENING!
//! 18:04:12
//! SATURDAY
//! ```

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;

use super::DisplayHandle;
use crate::common::constants::OVERLAY_REFRESH_MS;
use crate::core::stop::StopSignal;
use crate::time::{Thresholds, TimeSource, classify_time};

/// Render the overlay for `now`.
pub fn overlay_text(now: &DateTime<Local>, thresholds: &Thresholds) -> String {
    let window = classify_time(now, thresholds);
    format!(
        "{}\n{}\n{}",
        window.greeting(),
        now.format("%H:%M:%S"),
        now.format("%A").to_string().to_uppercase()
    )
}

/// Push the overlay to the display every second until stopped.
pub fn run_overlay_ticker(
    display: DisplayHandle,
    thresholds: Thresholds,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
) {
    while stop.is_running() {
        display.show_overlay(overlay_text(&time.now(), &thresholds));
        if !stop.sleep(Duration::from_millis(OVERLAY_REFRESH_MS), time.as_ref()) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_overlay_text_for_evening() {
        // 2025-06-14 was a Saturday
        let now = Local.with_ymd_and_hms(2025, 6, 14, 18, 4, 12).unwrap();
        assert_eq!(
            overlay_text(&now, &Thresholds::default()),
            "GOOD EVENING!\n18:04:12\nSATURDAY"
        );
    }

    #[test]
    fn test_overlay_text_for_afternoon() {
        let now = Local.with_ymd_and_hms(2025, 6, 16, 13, 0, 0).unwrap();
        let text = overlay_text(&now, &Thresholds::default());
        assert!(text.starts_with("GOOD AFTERNOON!\n13:00:00\n"));
        assert!(text.ends_with("MONDAY"));
    }
}
