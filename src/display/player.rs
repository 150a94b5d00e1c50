//! Player window presenter.
//!
//! The daemon owns a borderless fullscreen player window. Decoding and drawing
//! stay inside the player; we switch files and draw the clock overlay over its
//! JSON IPC socket. The window is spawned on first use and respawned if it
//! has exited.

use std::path::PathBuf;
use std::process::Command;

use super::{AssetResolver, PresentError, WallpaperPresenter};
use crate::io::mpv_ipc::PlayerIpc;
use crate::io::process::ManagedProcess;

/// How long overlay text stays up; refreshed every second by the ticker.
const OVERLAY_DURATION_MS: u64 = 1500;

pub struct PlayerPresenter {
    program: String,
    assets: AssetResolver,
    ipc: PlayerIpc,
    process: Option<ManagedProcess>,
}

impl PlayerPresenter {
    pub fn new(program: &str, assets: AssetResolver) -> Self {
        Self {
            program: program.to_string(),
            assets,
            ipc: PlayerIpc::new(window_socket_path()),
            process: None,
        }
    }

    fn window_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--no-terminal")
            .arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--fullscreen")
            .arg("--no-border")
            .arg("--no-audio")
            .arg("--loop-file=inf")
            .arg("--osd-align-x=center")
            .arg("--osd-align-y=center")
            .arg("--title=rainpaper")
            .arg(format!("--input-ipc-server={}", self.ipc.socket_path().display()));
        cmd
    }

    /// Make sure a live player window is listening on the socket.
    fn ensure_window(&mut self) -> Result<(), PresentError> {
        if let Some(process) = self.process.as_mut()
            && process.is_running()
        {
            return Ok(());
        }

        if self.process.take().is_some() {
            log_warning!("Player window exited, restarting it");
        }
        let _ = std::fs::remove_file(self.ipc.socket_path());

        let process = ManagedProcess::spawn(&self.program, self.window_command())
            .map_err(|e| PresentError::Player(format!("{e:#}")))?;
        self.process = Some(process);

        if !self.ipc.wait_until_ready() {
            return Err(PresentError::Player(
                "player window did not open its IPC socket".to_string(),
            ));
        }
        Ok(())
    }
}

impl WallpaperPresenter for PlayerPresenter {
    fn present(&mut self, name: &str) -> Result<(), PresentError> {
        let path = self.assets.locate(name)?;
        self.ensure_window()?;
        self.ipc
            .load_file(&path)
            .map_err(|e| PresentError::Player(format!("{e:#}")))
    }

    fn show_overlay(&mut self, text: &str) {
        if self.process.is_none() {
            return;
        }
        if let Err(e) = self.ipc.show_text(text, OVERLAY_DURATION_MS) {
            log_debug!("Overlay update failed: {e}");
        }
    }

    fn teardown(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = self.ipc.quit();
            process.stop();
            log_decorated!("Player window closed");
        }
        let _ = std::fs::remove_file(self.ipc.socket_path());
    }

    fn kind(&self) -> &'static str {
        "window"
    }
}

fn window_socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(format!("rainpaper-window-{}.sock", std::process::id()))
}
