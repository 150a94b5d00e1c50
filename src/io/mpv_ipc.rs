//! JSON IPC client for the player's control socket.
//!
//! The player is started with `--input-ipc-server=<socket>`; each request is a
//! single JSON line `{"command": [...]}` and each reply a JSON line carrying an
//! `error` field that reads `"success"` when the command was accepted.
//! Asynchronous event lines may be interleaved and are skipped.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::*;

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    event: Option<String>,
}

/// Client for one player instance.
#[derive(Debug, Clone)]
pub struct PlayerIpc {
    socket_path: PathBuf,
}

impl PlayerIpc {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Wait for the player to create its socket.
    ///
    /// The player needs a moment after spawning before it accepts connections.
    pub fn wait_until_ready(&self) -> bool {
        for _ in 0..SOCKET_CONNECT_RETRIES {
            if UnixStream::connect(&self.socket_path).is_ok() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(SOCKET_CONNECT_RETRY_MS));
        }
        false
    }

    /// Send a command and return its `data` field.
    pub fn command(&self, args: &[Value]) -> Result<Option<Value>> {
        let stream = UnixStream::connect(&self.socket_path).with_context(|| {
            format!("Failed to connect to player socket at {:?}", self.socket_path)
        })?;
        let timeout = Some(Duration::from_millis(SOCKET_TIMEOUT_MS));
        stream.set_read_timeout(timeout).ok();
        stream.set_write_timeout(timeout).ok();

        let request = json!({ "command": args });
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        (&stream)
            .write_all(line.as_bytes())
            .context("Failed to write command to player socket")?;

        let mut reader = BufReader::new(&stream);
        loop {
            let mut response = String::new();
            let read = reader
                .read_line(&mut response)
                .context("Failed to read player reply")?;
            if read == 0 {
                anyhow::bail!("Player closed the connection without replying");
            }

            let reply: Reply = serde_json::from_str(response.trim())
                .with_context(|| format!("Malformed player reply: {}", response.trim()))?;
            if reply.event.is_some() {
                continue;
            }

            return match reply.error.as_deref() {
                Some("success") => Ok(reply.data),
                Some(err) => anyhow::bail!("Player rejected command: {err}"),
                None => anyhow::bail!("Player reply had no status"),
            };
        }
    }

    /// Replace the current file with `path` (the player loops it).
    pub fn load_file(&self, path: &Path) -> Result<()> {
        self.command(&[json!("loadfile"), json!(path.to_string_lossy()), json!("replace")])
            .map(|_| ())
    }

    /// Set playback volume, `volume` in 0.0-1.0.
    pub fn set_volume(&self, volume: f64) -> Result<()> {
        let percent = (volume.clamp(0.0, 1.0) * 100.0).round();
        self.command(&[json!("set_property"), json!("volume"), json!(percent)])
            .map(|_| ())
    }

    /// Show text on the player's on-screen display for `duration_ms`.
    pub fn show_text(&self, text: &str, duration_ms: u64) -> Result<()> {
        self.command(&[json!("show-text"), json!(text), json!(duration_ms)])
            .map(|_| ())
    }

    pub fn quit(&self) -> Result<()> {
        self.command(&[json!("quit")]).map(|_| ())
    }
}
