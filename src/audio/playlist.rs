//! Shuffled music playlist and the worker that plays it.

use rand::Rng;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{Mixer, TrackState};
use crate::common::constants::{MUSIC_POLL_INTERVAL_MS, MUSIC_TRACK_COUNT};
use crate::core::stop::StopSignal;
use crate::time::TimeSource;

/// Existing `track1.mp3`..`trackN.mp3` files under `dir`, in numeric order.
pub fn discover_tracks(dir: &Path) -> Vec<PathBuf> {
    (1..=MUSIC_TRACK_COUNT)
        .map(|n| dir.join(format!("track{n}.mp3")))
        .filter(|path| path.is_file())
        .collect()
}

/// Track list shuffled once, with a wrapping cursor.
#[derive(Debug, Clone)]
pub struct MusicPlaylist {
    tracks: Vec<PathBuf>,
    index: usize,
}

impl MusicPlaylist {
    pub fn shuffled<R: Rng + ?Sized>(mut tracks: Vec<PathBuf>, rng: &mut R) -> Self {
        tracks.shuffle(rng);
        Self { tracks, index: 0 }
    }

    /// Playlist in the given order, unshuffled.
    pub fn ordered(tracks: Vec<PathBuf>) -> Self {
        Self { tracks, index: 0 }
    }

    pub fn current(&self) -> Option<&Path> {
        self.tracks.get(self.index).map(PathBuf::as_path)
    }

    /// Move to `(index + 1) mod len`.
    pub fn advance(&mut self) {
        if !self.tracks.is_empty() {
            self.index = (self.index + 1) % self.tracks.len();
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }
}

/// Result of one pass through [`MusicLoop::play_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicStep {
    /// Track played to the end; the playlist moved on
    Finished,
    /// Playback failed; the same track will be tried again
    Retry,
    /// Stop was requested
    Stopped,
}

pub struct MusicLoop {
    playlist: MusicPlaylist,
    mixer: Arc<dyn Mixer>,
    volume: f64,
    backoff: Duration,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
}

impl MusicLoop {
    pub fn new(
        playlist: MusicPlaylist,
        mixer: Arc<dyn Mixer>,
        volume: f64,
        backoff: Duration,
        stop: StopSignal,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            playlist,
            mixer,
            volume,
            backoff,
            stop,
            time,
        }
    }

    pub fn playlist(&self) -> &MusicPlaylist {
        &self.playlist
    }

    /// Play until the stop signal is set.
    pub fn run(mut self) {
        while self.stop.is_running() {
            if self.play_current() == MusicStep::Stopped {
                break;
            }
        }
        self.mixer.stop_track();
        log_debug!("Music loop stopped");
    }

    /// Play the current track once, to completion, failure or stop.
    pub fn play_current(&mut self) -> MusicStep {
        let Some(track) = self.playlist.current().map(Path::to_path_buf) else {
            return MusicStep::Stopped;
        };
        let name = track
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Err(e) = self.mixer.play_track(&track, self.volume) {
            log_error!("Error playing music {name}: {e}");
            return self.back_off();
        }
        log_indented!("Now playing: {name}");

        let poll = Duration::from_millis(MUSIC_POLL_INTERVAL_MS);
        loop {
            if !self.stop.is_running() {
                self.mixer.stop_track();
                return MusicStep::Stopped;
            }
            match self.mixer.track_state() {
                TrackState::Playing => {
                    self.stop.sleep(poll, self.time.as_ref());
                }
                TrackState::Finished => {
                    self.playlist.advance();
                    return MusicStep::Finished;
                }
                TrackState::Failed(reason) => {
                    log_error!("Error playing music {name}: {reason}");
                    return self.back_off();
                }
            }
        }
    }

    fn back_off(&self) -> MusicStep {
        if self.stop.sleep(self.backoff, self.time.as_ref()) {
            MusicStep::Retry
        } else {
            MusicStep::Stopped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::source::SteppedTimeSource;
    use anyhow::{Result, bail};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Mixer that replays scripted track states and records what was played.
    #[derive(Default)]
    struct ScriptedMixer {
        played: Mutex<Vec<PathBuf>>,
        start_failures: Mutex<usize>,
        states: Mutex<VecDeque<TrackState>>,
    }

    impl Mixer for ScriptedMixer {
        fn start_ambient(&self, _: &Path, _: f64) -> Result<()> {
            Ok(())
        }
        fn play_track(&self, path: &Path, _: f64) -> Result<()> {
            self.played.lock().unwrap().push(path.to_path_buf());
            let mut failures = self.start_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                bail!("no audio device");
            }
            Ok(())
        }
        fn track_state(&self) -> TrackState {
            self.states
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(TrackState::Finished)
        }
        fn stop_track(&self) {}
        fn rain_start(&self, _: &Path) -> Result<()> {
            Ok(())
        }
        fn rain_set_volume(&self, _: f64) -> Result<()> {
            Ok(())
        }
        fn rain_stop(&self) -> Result<()> {
            Ok(())
        }
        fn stop_all(&self) {}
    }

    fn tracks(n: usize) -> Vec<PathBuf> {
        (1..=n).map(|i| PathBuf::from(format!("track{i}.mp3"))).collect()
    }

    fn music_loop(mixer: Arc<ScriptedMixer>, n: usize) -> (MusicLoop, Arc<SteppedTimeSource>) {
        let time = Arc::new(SteppedTimeSource::at_hour(12));
        let music = MusicLoop::new(
            MusicPlaylist::ordered(tracks(n)),
            mixer,
            0.1,
            Duration::from_secs(1),
            StopSignal::new(),
            time.clone(),
        );
        (music, time)
    }

    #[test]
    fn test_shuffle_keeps_every_track() {
        let mut rng = StdRng::seed_from_u64(7);
        let playlist = MusicPlaylist::shuffled(tracks(7), &mut rng);
        let mut sorted = playlist.tracks().to_vec();
        sorted.sort();
        assert_eq!(sorted, tracks(7));
        assert_eq!(playlist.index(), 0);
    }

    #[test]
    fn test_playlist_wraps_around() {
        let mut playlist = MusicPlaylist::ordered(tracks(3));
        for _ in 0..3 {
            playlist.advance();
        }
        assert_eq!(playlist.index(), 0);
        assert_eq!(playlist.current(), Some(Path::new("track1.mp3")));
    }

    #[test]
    fn test_empty_playlist() {
        let mut playlist = MusicPlaylist::ordered(Vec::new());
        playlist.advance();
        assert!(playlist.is_empty());
        assert_eq!(playlist.current(), None);
    }

    #[test]
    fn test_finished_tracks_advance_and_wrap() {
        let mixer = Arc::new(ScriptedMixer::default());
        let (mut music, _time) = music_loop(mixer.clone(), 2);

        for _ in 0..3 {
            assert_eq!(music.play_current(), MusicStep::Finished);
        }

        assert_eq!(
            *mixer.played.lock().unwrap(),
            [
                PathBuf::from("track1.mp3"),
                PathBuf::from("track2.mp3"),
                PathBuf::from("track1.mp3")
            ]
        );
        assert_eq!(music.playlist().index(), 1);
    }

    #[test]
    fn test_track_is_polled_until_finished() {
        let mixer = Arc::new(ScriptedMixer::default());
        mixer
            .states
            .lock()
            .unwrap()
            .extend([TrackState::Playing, TrackState::Playing, TrackState::Finished]);
        let (mut music, time) = music_loop(mixer, 2);

        assert_eq!(music.play_current(), MusicStep::Finished);
        assert_eq!(time.total_slept(), Duration::from_millis(200));
    }

    #[test]
    fn test_playback_error_retries_same_track() {
        let mixer = Arc::new(ScriptedMixer::default());
        *mixer.start_failures.lock().unwrap() = 1;
        mixer
            .states
            .lock()
            .unwrap()
            .push_back(TrackState::Failed("decoder error".into()));
        let (mut music, time) = music_loop(mixer.clone(), 3);

        assert_eq!(music.play_current(), MusicStep::Retry);
        assert_eq!(music.play_current(), MusicStep::Retry);
        assert_eq!(music.playlist().index(), 0);
        assert_eq!(time.total_slept(), Duration::from_secs(2));

        assert_eq!(music.play_current(), MusicStep::Finished);
        assert_eq!(music.playlist().index(), 1);
        assert!(mixer
            .played
            .lock()
            .unwrap()
            .iter()
            .all(|p| p == Path::new("track1.mp3")));
    }

    #[test]
    fn test_stop_ends_playback() {
        let mixer = Arc::new(ScriptedMixer::default());
        mixer.states.lock().unwrap().push_back(TrackState::Playing);
        let (mut music, _time) = music_loop(mixer, 2);
        music.stop.stop();

        assert_eq!(music.play_current(), MusicStep::Stopped);
        assert_eq!(music.playlist().index(), 0);
    }

    #[test]
    fn test_discover_tracks_in_numeric_order() {
        let dir = tempdir().unwrap();
        for name in ["track3.mp3", "track1.mp3", "track9.mp3", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = discover_tracks(dir.path());
        assert_eq!(
            found,
            [dir.path().join("track1.mp3"), dir.path().join("track3.mp3")]
        );
    }
}
