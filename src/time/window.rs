//! Time-of-day classification.
//!
//! Maps a wall-clock hour onto one of four windows using the configured
//! thresholds. Each window is the half-open interval `[start, next_start)`;
//! whatever no interval claims is night, so the mapping stays total even when
//! the thresholds are misordered or overlap.

use chrono::{DateTime, Local, Timelike};
use std::fmt;

use crate::common::constants::*;

/// The four time-of-day windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    Morning,
    Day,
    Evening,
    Night,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Morning,
        TimeWindow::Day,
        TimeWindow::Evening,
        TimeWindow::Night,
    ];

    /// Lower-case name used in wallpaper file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "morning",
            TimeWindow::Day => "day",
            TimeWindow::Evening => "evening",
            TimeWindow::Night => "night",
        }
    }

    /// Word shown in the overlay greeting ("GOOD AFTERNOON!").
    pub fn greeting_word(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "MORNING",
            TimeWindow::Day => "AFTERNOON",
            TimeWindow::Evening => "EVENING",
            TimeWindow::Night => "NIGHT",
        }
    }

    pub fn greeting(&self) -> String {
        format!("GOOD {}!", self.greeting_word())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start hours of the first three windows plus the night start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub morning_start: u32,
    pub day_start: u32,
    pub evening_start: u32,
    pub night_start: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            morning_start: DEFAULT_MORNING_START,
            day_start: DEFAULT_DAY_START,
            evening_start: DEFAULT_EVENING_START,
            night_start: DEFAULT_NIGHT_START,
        }
    }
}

impl Thresholds {
    /// True when the four starts are strictly increasing.
    pub fn is_ordered(&self) -> bool {
        self.morning_start < self.day_start
            && self.day_start < self.evening_start
            && self.evening_start < self.night_start
    }
}

/// Classify an hour into its time window.
///
/// Hours outside 0-23 are reduced modulo 24. Intervals are checked in
/// morning, day, evening order and the first match wins.
pub fn classify(hour: u32, thresholds: &Thresholds) -> TimeWindow {
    let hour = hour % 24;
    let Thresholds {
        morning_start,
        day_start,
        evening_start,
        night_start,
    } = *thresholds;

    if (morning_start..day_start).contains(&hour) {
        TimeWindow::Morning
    } else if (day_start..evening_start).contains(&hour) {
        TimeWindow::Day
    } else if (evening_start..night_start).contains(&hour) {
        TimeWindow::Evening
    } else {
        TimeWindow::Night
    }
}

/// Classify a point in time by its local hour.
pub fn classify_time(time: &DateTime<Local>, thresholds: &Thresholds) -> TimeWindow {
    classify(time.hour(), thresholds)
}
