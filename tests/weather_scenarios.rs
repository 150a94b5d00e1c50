//! Day-in-the-life scenarios for the weather cycle and the status loop sharing
//! one display actor and one stepped clock.

use rainpaper::core::status::StatusLoop;
use rainpaper::core::stop::StopSignal;
use rainpaper::display::{
    DisplayActor, DisplayHandle, PresentError, ReconcileOutcome, WallpaperPresenter,
};
use rainpaper::time::source::SteppedTimeSource;
use rainpaper::time::{Thresholds, TimeSource, TimeWindow};
use rainpaper::weather::{WeatherCycle, WeatherPhase, WeatherTiming};

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Presenter that records every accepted name and refuses the ones listed.
struct Recorder {
    shown: Arc<Mutex<Vec<String>>>,
    refuse: HashSet<String>,
}

impl WallpaperPresenter for Recorder {
    fn present(&mut self, name: &str) -> Result<(), PresentError> {
        if self.refuse.contains(name) {
            return Err(PresentError::Player(format!("refused {name}")));
        }
        self.shown.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "recorder"
    }
}

struct Harness {
    display: DisplayHandle,
    join: JoinHandle<()>,
    shown: Arc<Mutex<Vec<String>>>,
    clock: Arc<SteppedTimeSource>,
}

impl Harness {
    fn at_hour(hour: u32) -> Self {
        Self::refusing(hour, &[])
    }

    fn refusing(hour: u32, refuse: &[&str]) -> Self {
        let shown = Arc::new(Mutex::new(Vec::new()));
        let presenter = Recorder {
            shown: shown.clone(),
            refuse: refuse.iter().map(|s| s.to_string()).collect(),
        };
        let (display, join) = DisplayActor::new(Box::new(presenter)).spawn().unwrap();
        Self {
            display,
            join,
            shown,
            clock: Arc::new(SteppedTimeSource::at_hour(hour)),
        }
    }

    fn cycle(&self, seed: u64) -> WeatherCycle<StdRng> {
        WeatherCycle::new(
            timing(),
            Thresholds::default(),
            self.display.clone(),
            None,
            StopSignal::new(),
            self.clock.clone(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn status(&self) -> StatusLoop {
        StatusLoop::new(
            self.display.clone(),
            Thresholds::default(),
            Duration::from_secs(60),
            StopSignal::new(),
            self.clock.clone(),
        )
    }

    fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    fn current(&self) -> Option<String> {
        self.display.snapshot().current
    }

    fn hours(&self, hours: u64) {
        self.clock.advance(Duration::from_secs(hours * 3600));
    }

    fn finish(self) {
        self.display.shutdown();
        self.join.join().unwrap();
    }
}

fn timing() -> WeatherTiming {
    WeatherTiming {
        transition: 8,
        min_rain: 30,
        max_rain: 300,
        min_clear: 60,
        max_clear: 300,
    }
}

#[test]
fn test_startup_at_six_in_the_evening_shows_evening() {
    let harness = Harness::at_hour(18);
    let mut cycle = harness.cycle(7);

    let entry = cycle.present_initial();
    assert_eq!(entry.window, TimeWindow::Evening);
    assert_eq!(entry.wallpaper, "evening");
    assert!(entry.presented);
    assert_eq!(harness.current().as_deref(), Some("evening"));

    harness.finish();
}

#[test]
fn test_full_cycle_in_the_morning() {
    let harness = Harness::at_hour(8);
    let mut cycle = harness.cycle(1);

    cycle.present_initial();
    for _ in 0..4 {
        cycle.step();
    }

    assert_eq!(
        harness.shown(),
        ["morning", "morning_to_rain", "morning_rain", "rain_to_morning", "morning"]
    );
    assert_eq!(cycle.phase(), WeatherPhase::Clear);

    harness.finish();
}

#[test]
fn test_each_phase_reads_the_window_at_entry() {
    let harness = Harness::at_hour(16);
    let mut cycle = harness.cycle(3);

    cycle.present_initial();
    assert_eq!(cycle.step().wallpaper, "day_to_rain");

    // The clock crosses into the evening while it rains
    harness.hours(1);
    assert_eq!(cycle.step().wallpaper, "evening_rain");
    assert_eq!(cycle.step().wallpaper, "rain_to_evening");
    assert_eq!(cycle.step().wallpaper, "evening");

    harness.finish();
}

#[test]
fn test_status_loop_waits_for_rain_to_clear() {
    let harness = Harness::at_hour(19);
    let mut cycle = harness.cycle(11);
    let mut status = harness.status();
    assert_eq!(status.last_observed(), TimeWindow::Evening);

    cycle.present_initial();
    cycle.step();
    cycle.step();
    assert_eq!(harness.current().as_deref(), Some("evening_rain"));

    // Night begins mid-rain; the display is left alone
    harness.hours(1);
    assert_eq!(status.check(), Some(ReconcileOutcome::DeferredToWeather));
    assert_eq!(status.last_observed(), TimeWindow::Evening);
    assert_eq!(harness.current().as_deref(), Some("evening_rain"));

    // Still deferred on the next check
    assert_eq!(status.check(), Some(ReconcileOutcome::DeferredToWeather));

    assert_eq!(cycle.step().wallpaper, "rain_to_night");
    assert_eq!(status.check(), Some(ReconcileOutcome::DeferredToWeather));

    assert_eq!(cycle.step().wallpaper, "night");
    assert_eq!(status.check(), Some(ReconcileOutcome::AlreadyShowing));
    assert_eq!(status.last_observed(), TimeWindow::Night);
    assert_eq!(status.check(), None);

    assert_eq!(
        harness.shown(),
        ["evening", "evening_to_rain", "evening_rain", "rain_to_night", "night"]
    );

    harness.finish();
}

#[test]
fn test_status_loop_updates_clear_sky() {
    let harness = Harness::at_hour(16);
    let mut cycle = harness.cycle(5);
    let mut status = harness.status();

    cycle.present_initial();
    assert_eq!(status.check(), None);

    harness.hours(1);
    assert_eq!(status.check(), Some(ReconcileOutcome::Presented));
    assert_eq!(harness.current().as_deref(), Some("evening"));
    assert_eq!(status.last_observed(), TimeWindow::Evening);

    // The next rain starts from the new window
    assert_eq!(cycle.step().wallpaper, "evening_to_rain");

    harness.finish();
}

#[test]
fn test_missing_wallpaper_keeps_previous_one() {
    let harness = Harness::refusing(13, &["day_rain"]);
    let mut cycle = harness.cycle(9);

    cycle.present_initial();
    assert!(cycle.step().presented);
    let rain = cycle.step();
    assert_eq!(rain.phase, WeatherPhase::Rain);
    assert!(!rain.presented);
    assert_eq!(harness.current().as_deref(), Some("day_to_rain"));

    // The cycle carries on regardless
    let clearing = cycle.step();
    assert!(clearing.presented);
    assert_eq!(clearing.wallpaper, "rain_to_day");

    harness.finish();
}

#[test]
fn test_failed_reconcile_is_not_retried_until_next_change() {
    let harness = Harness::refusing(16, &["evening"]);
    let mut cycle = harness.cycle(2);
    let mut status = harness.status();

    cycle.present_initial();
    harness.hours(1);
    assert_eq!(status.check(), Some(ReconcileOutcome::Failed));
    assert_eq!(status.last_observed(), TimeWindow::Evening);
    assert_eq!(status.check(), None);
    assert_eq!(harness.current().as_deref(), Some("day"));

    harness.finish();
}

#[test]
fn test_same_seed_gives_same_holds() {
    let first = Harness::at_hour(10);
    let second = Harness::at_hour(10);
    let mut a = first.cycle(1234);
    let mut b = second.cycle(1234);

    let holds_a: Vec<_> = (0..12).map(|_| a.step().hold).collect();
    let holds_b: Vec<_> = (0..12).map(|_| b.step().hold).collect();
    assert_eq!(holds_a, holds_b);

    first.finish();
    second.finish();
}

#[test]
fn test_run_stops_promptly() {
    let harness = Harness::at_hour(12);
    let stop = StopSignal::new();
    let cycle = WeatherCycle::new(
        timing(),
        Thresholds::default(),
        harness.display.clone(),
        None,
        stop.clone(),
        harness.clock.clone(),
        StdRng::seed_from_u64(4),
    );

    let worker = std::thread::spawn(move || cycle.run());
    while harness.display.snapshot().presents < 3 {
        std::thread::yield_now();
    }
    stop.stop();
    worker.join().unwrap();

    let shown = harness.shown();
    assert!(shown.len() >= 3);
    assert!(harness.clock.now() > SteppedTimeSource::at_hour(12).now());

    harness.finish();
}
