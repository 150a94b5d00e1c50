//! Audio through headless player processes.
//!
//! Every sound is its own `--no-video` player process: one per ambient loop,
//! one for the current music track, and one for the rain loop. The rain
//! process listens on an IPC socket so its volume can be changed mid-fade.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{Mixer, TrackState};
use crate::io::mpv_ipc::PlayerIpc;
use crate::io::process::{CommandOutcome, ManagedProcess, run_with_timeout};

struct RainChannel {
    process: ManagedProcess,
    ipc: PlayerIpc,
}

#[derive(Default)]
struct Channels {
    ambient: Vec<ManagedProcess>,
    track: Option<ManagedProcess>,
    rain: Option<RainChannel>,
}

pub struct MpvMixer {
    program: String,
    rain_socket: PathBuf,
    channels: Mutex<Channels>,
}

impl MpvMixer {
    /// Check that `program` runs, and build a mixer around it.
    pub fn probe(program: &str) -> Result<Self> {
        match run_with_timeout(program, &["--version"], Duration::from_secs(5)) {
            CommandOutcome::Success => Ok(Self::new(program)),
            outcome => anyhow::bail!("{program} --version {outcome}"),
        }
    }

    pub fn new(program: &str) -> Self {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
        Self {
            program: program.to_string(),
            rain_socket: PathBuf::from(runtime_dir)
                .join(format!("rainpaper-rain-{}.sock", std::process::id())),
            channels: Mutex::new(Channels::default()),
        }
    }

    fn channels(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn audio_command(&self, path: &Path, volume: f64, looped: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--no-video")
            .arg("--no-terminal")
            .arg(format!("--volume={}", volume_percent(volume)));
        if looped {
            cmd.arg("--loop-file=inf");
        }
        cmd.arg(path);
        cmd
    }
}

/// Player volume scale is 0-100.
fn volume_percent(volume: f64) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

impl Mixer for MpvMixer {
    fn start_ambient(&self, path: &Path, volume: f64) -> Result<()> {
        let process = ManagedProcess::spawn(&self.program, self.audio_command(path, volume, true))?;
        self.channels().ambient.push(process);
        Ok(())
    }

    fn play_track(&self, path: &Path, volume: f64) -> Result<()> {
        let process = ManagedProcess::spawn(&self.program, self.audio_command(path, volume, false))?;
        // Dropping the previous track's process stops it
        self.channels().track = Some(process);
        Ok(())
    }

    fn track_state(&self) -> TrackState {
        let mut channels = self.channels();
        let Some(track) = channels.track.as_mut() else {
            return TrackState::Finished;
        };
        match track.exit_status() {
            None => TrackState::Playing,
            Some(Ok(0)) => TrackState::Finished,
            Some(Ok(code)) => TrackState::Failed(format!("player exited with status {code}")),
            Some(Err(())) => TrackState::Failed("player was terminated".to_string()),
        }
    }

    fn stop_track(&self) {
        if let Some(mut track) = self.channels().track.take() {
            track.stop();
        }
    }

    fn rain_start(&self, path: &Path) -> Result<()> {
        let _ = std::fs::remove_file(&self.rain_socket);

        let mut cmd = self.audio_command(path, 0.0, true);
        cmd.arg(format!("--input-ipc-server={}", self.rain_socket.display()));
        let process = ManagedProcess::spawn(&self.program, cmd)?;

        let ipc = PlayerIpc::new(&self.rain_socket);
        if !ipc.wait_until_ready() {
            anyhow::bail!("rain player did not open its IPC socket");
        }
        self.channels().rain = Some(RainChannel { process, ipc });
        Ok(())
    }

    fn rain_set_volume(&self, volume: f64) -> Result<()> {
        // Released before the round trip so track polling is never held up
        let ipc = self
            .channels()
            .rain
            .as_ref()
            .map(|rain| rain.ipc.clone())
            .context("rain loop is not playing")?;
        ipc.set_volume(volume)
    }

    fn rain_stop(&self) -> Result<()> {
        if let Some(mut rain) = self.channels().rain.take() {
            rain.process.stop();
        }
        let _ = std::fs::remove_file(&self.rain_socket);
        Ok(())
    }

    fn stop_all(&self) {
        let mut channels = self.channels();
        for mut process in channels.ambient.drain(..) {
            process.stop();
        }
        if let Some(mut track) = channels.track.take() {
            track.stop();
        }
        if let Some(mut rain) = channels.rain.take() {
            rain.process.stop();
        }
        drop(channels);
        let _ = std::fs::remove_file(&self.rain_socket);
    }
}
