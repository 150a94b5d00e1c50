//! Rain fades driven through the public mixer seam.

use anyhow::Result;
use chrono::{DateTime, Local};
use rainpaper::audio::{
    AudioChannelState, FadeOutcome, FadeSettings, Mixer, RainFader, RainState, TrackState,
};
use rainpaper::core::stop::StopSignal;
use rainpaper::time::TimeSource;
use rainpaper::time::source::SteppedTimeSource;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum RainEvent {
    Start,
    Volume(f64),
    Stop,
}

#[derive(Default)]
struct RainLog {
    events: Mutex<Vec<RainEvent>>,
}

impl RainLog {
    fn events(&self) -> Vec<RainEvent> {
        self.events.lock().unwrap().clone()
    }

    fn volumes(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RainEvent::Volume(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

impl Mixer for RainLog {
    fn start_ambient(&self, _path: &Path, _volume: f64) -> Result<()> {
        Ok(())
    }

    fn play_track(&self, _path: &Path, _volume: f64) -> Result<()> {
        Ok(())
    }

    fn track_state(&self) -> TrackState {
        TrackState::Finished
    }

    fn stop_track(&self) {}

    fn rain_start(&self, _path: &Path) -> Result<()> {
        self.events.lock().unwrap().push(RainEvent::Start);
        Ok(())
    }

    fn rain_set_volume(&self, volume: f64) -> Result<()> {
        self.events.lock().unwrap().push(RainEvent::Volume(volume));
        Ok(())
    }

    fn rain_stop(&self) -> Result<()> {
        self.events.lock().unwrap().push(RainEvent::Stop);
        Ok(())
    }

    fn stop_all(&self) {}
}

/// Clock that lowers the stop flag after a fixed number of sleeps.
struct InterruptingClock {
    inner: SteppedTimeSource,
    stop: StopSignal,
    stop_after: usize,
    sleeps: AtomicUsize,
}

impl InterruptingClock {
    fn new(stop: StopSignal, stop_after: usize) -> Self {
        Self {
            inner: SteppedTimeSource::at_hour(21),
            stop,
            stop_after,
            sleeps: AtomicUsize::new(0),
        }
    }
}

impl TimeSource for InterruptingClock {
    fn now(&self) -> DateTime<Local> {
        self.inner.now()
    }

    fn sleep(&self, duration: Duration) {
        self.inner.sleep(duration);
        if self.sleeps.fetch_add(1, Ordering::SeqCst) + 1 == self.stop_after {
            self.stop.stop();
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

fn settings(steps: u32) -> FadeSettings {
    FadeSettings {
        steps,
        delay: Duration::from_secs(1),
        ceiling: 0.5,
    }
}

fn fader(steps: u32) -> (RainFader, Arc<RainLog>, RainState) {
    let log = Arc::new(RainLog::default());
    let state: RainState = Arc::new(Mutex::new(AudioChannelState::default()));
    let fader = RainFader::new(
        log.clone(),
        PathBuf::from("/sounds/rain.mp3"),
        settings(steps),
        state.clone(),
    );
    (fader, log, state)
}

#[test]
fn test_rain_fades_in_and_out() {
    let (fader, log, state) = fader(4);
    let stop = StopSignal::new();
    let clock = SteppedTimeSource::at_hour(14);

    assert_eq!(fader.fade_in(&stop, &clock), FadeOutcome::Completed);
    assert_eq!(log.events()[0], RainEvent::Start);
    assert_eq!(log.volumes(), [0.0, 0.125, 0.25, 0.375]);
    assert!(state.lock().unwrap().playing);
    assert_eq!(clock.total_slept(), Duration::from_secs(4));

    assert_eq!(fader.fade_out(&stop, &clock), FadeOutcome::Completed);
    assert_eq!(log.volumes()[4..], [0.5, 0.375, 0.25, 0.125]);
    assert_eq!(log.events().last(), Some(&RainEvent::Stop));
    assert_eq!(*state.lock().unwrap(), AudioChannelState::default());
}

#[test]
fn test_repeated_fades_are_skipped() {
    let (fader, log, _) = fader(2);
    let stop = StopSignal::new();
    let clock = SteppedTimeSource::at_hour(14);

    assert_eq!(fader.fade_out(&stop, &clock), FadeOutcome::Skipped);
    assert!(log.events().is_empty());

    fader.fade_in(&stop, &clock);
    assert_eq!(fader.fade_in(&stop, &clock), FadeOutcome::Skipped);
    assert_eq!(
        log.events().iter().filter(|e| **e == RainEvent::Start).count(),
        1
    );
}

#[test]
fn test_fade_in_aborts_within_one_step() {
    let (fader, log, state) = fader(20);
    let stop = StopSignal::new();
    let clock = InterruptingClock::new(stop.clone(), 5);

    assert_eq!(
        fader.fade_in(&stop, &clock),
        FadeOutcome::Aborted { at_step: 5 }
    );
    // One delay of latency at most after the stop
    assert_eq!(clock.inner.total_slept(), Duration::from_secs(5));
    assert_eq!(log.volumes().len(), 5);

    // The loop is left where the fade reached
    let reached = *state.lock().unwrap();
    assert!(reached.playing);
    assert!((reached.volume - 0.1).abs() < 1e-9);
    assert!(!log.events().contains(&RainEvent::Stop));
}

#[test]
fn test_fade_out_aborts_without_stopping_the_loop() {
    let (fader, log, state) = fader(10);
    let running = StopSignal::new();
    fader.fade_in(&running, &SteppedTimeSource::at_hour(23));

    let stop = StopSignal::new();
    let clock = InterruptingClock::new(stop.clone(), 3);
    assert_eq!(
        fader.fade_out(&stop, &clock),
        FadeOutcome::Aborted { at_step: 3 }
    );
    assert!(state.lock().unwrap().playing);
    assert!(!log.events().contains(&RainEvent::Stop));
}

#[test]
fn test_stop_before_fade_sets_no_volume() {
    let (fader, log, _) = fader(8);
    let stop = StopSignal::new();
    stop.stop();

    assert_eq!(
        fader.fade_in(&stop, &SteppedTimeSource::at_hour(6)),
        FadeOutcome::Aborted { at_step: 0 }
    );
    assert!(log.volumes().is_empty());
}
