// Clock access and time-of-day classification
pub mod source; // Real, simulated and stepped clocks
pub mod window; // Hour -> TimeWindow classifier

pub use source::{RealTimeSource, SimulatedTimeSource, TimeSource};
pub use window::{Thresholds, TimeWindow, classify, classify_time};
