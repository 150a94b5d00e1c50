//! Weather phases and wallpaper naming.
//!
//! The weather cycle moves through four phases in a fixed order. Together with
//! the current time window, the phase fully determines which wallpaper is on
//! screen:
//!
//! | Phase                  | Wallpaper            |
//! |------------------------|----------------------|
//! | `Clear`                | `{window}`           |
//! | `TransitioningToRain`  | `{window}_to_rain`   |
//! | `Rain`                 | `{window}_rain`      |
//! | `TransitioningToClear` | `rain_to_{window}`   |

pub mod cycle;

use rand::Rng;
use std::fmt;
use std::time::Duration;

use crate::time::TimeWindow;

pub use cycle::{PhaseEntry, WeatherCycle};

/// Position in the rain/clear cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherPhase {
    #[default]
    Clear,
    TransitioningToRain,
    Rain,
    TransitioningToClear,
}

impl WeatherPhase {
    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            WeatherPhase::Clear => WeatherPhase::TransitioningToRain,
            WeatherPhase::TransitioningToRain => WeatherPhase::Rain,
            WeatherPhase::Rain => WeatherPhase::TransitioningToClear,
            WeatherPhase::TransitioningToClear => WeatherPhase::Clear,
        }
    }

    /// Anything other than clear sky counts as a weather event.
    pub fn is_weather_event(self) -> bool {
        self != WeatherPhase::Clear
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherPhase::Clear => "Clear",
            WeatherPhase::TransitioningToRain => "Transitioning to rain",
            WeatherPhase::Rain => "Raining",
            WeatherPhase::TransitioningToClear => "Transitioning to clear",
        }
    }
}

impl fmt::Display for WeatherPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the wallpaper name for a window and phase.
pub fn wallpaper_name(window: TimeWindow, phase: WeatherPhase) -> String {
    let window = window.as_str();
    match phase {
        WeatherPhase::Clear => window.to_string(),
        WeatherPhase::TransitioningToRain => format!("{window}_to_rain"),
        WeatherPhase::Rain => format!("{window}_rain"),
        WeatherPhase::TransitioningToClear => format!("rain_to_{window}"),
    }
}

/// Whether a displayed wallpaper name belongs to a weather event.
pub fn is_weather_wallpaper(name: &str) -> bool {
    name.contains("_to_") || name.contains("_rain")
}

/// Every wallpaper name the engine can ask for.
pub fn all_wallpaper_names() -> Vec<String> {
    let phases = [
        WeatherPhase::Clear,
        WeatherPhase::TransitioningToRain,
        WeatherPhase::Rain,
        WeatherPhase::TransitioningToClear,
    ];
    TimeWindow::ALL
        .iter()
        .flat_map(|&window| phases.iter().map(move |&phase| wallpaper_name(window, phase)))
        .collect()
}

/// Durations that drive the cycle, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherTiming {
    pub transition: u64,
    pub min_rain: u64,
    pub max_rain: u64,
    pub min_clear: u64,
    pub max_clear: u64,
}

impl WeatherTiming {
    /// How long to hold a phase once entered.
    ///
    /// Rain and clear holds are drawn uniformly from their inclusive ranges.
    /// A reversed range is treated as its swapped counterpart.
    pub fn hold_for<R: Rng + ?Sized>(&self, phase: WeatherPhase, rng: &mut R) -> Duration {
        let secs = match phase {
            WeatherPhase::TransitioningToRain | WeatherPhase::TransitioningToClear => {
                self.transition
            }
            WeatherPhase::Rain => sample_inclusive(self.min_rain, self.max_rain, rng),
            WeatherPhase::Clear => sample_inclusive(self.min_clear, self.max_clear, rng),
        };
        Duration::from_secs(secs)
    }
}

fn sample_inclusive<R: Rng + ?Sized>(a: u64, b: u64, rng: &mut R) -> u64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.gen_range(lo..=hi)
}
