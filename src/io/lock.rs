//! Lock file management for single-instance enforcement.
//!
//! Only one daemon may drive the wallpaper and audio at a time. The lock lives
//! in the runtime directory and holds the owner's PID so a stale lock left by a
//! crashed instance can be detected and reclaimed.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::utils;

/// Held lock; releases and removes the file on drop.
pub struct InstanceLock {
    file: Option<File>,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock and remove the lock file.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
            match std::fs::remove_file(&self.path) {
                Ok(()) => log_debug!("Lock file removed"),
                Err(e) => log_warning!("Failed to remove lock file: {e}"),
            }
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Outcome of trying to become the running instance.
pub enum LockStatus {
    Acquired(InstanceLock),
    /// Another live instance holds the lock
    HeldBy(u32),
}

/// Default lock path: `$XDG_RUNTIME_DIR/rainpaper.lock`, falling back to `/tmp`.
pub fn default_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("rainpaper.lock")
}

/// Acquire an exclusive lock at `lock_path`.
///
/// The file lock decides ownership. A held lock is only treated as stale when
/// it records a PID that is no longer running: the file is then removed and
/// the acquisition retried once. A held lock without a readable PID belongs to
/// an owner that has not written it yet and is reported as `HeldBy(0)`.
pub fn acquire_lock(lock_path: &Path) -> Result<LockStatus> {
    if let Some(lock) = try_lock(lock_path)? {
        return Ok(LockStatus::Acquired(lock));
    }

    let Some(pid) = read_lock_pid(lock_path) else {
        return Ok(LockStatus::HeldBy(0));
    };
    if utils::is_process_running(pid) {
        return Ok(LockStatus::HeldBy(pid));
    }

    log_warning!("Removing stale lock file left by PID {pid}");
    let _ = std::fs::remove_file(lock_path);
    match try_lock(lock_path)? {
        Some(lock) => Ok(LockStatus::Acquired(lock)),
        None => Ok(LockStatus::HeldBy(read_lock_pid(lock_path).unwrap_or(0))),
    }
}

fn try_lock(lock_path: &Path) -> Result<Option<InstanceLock>> {
    // Don't truncate before we own the lock
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

    if lock_file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    lock_file.set_len(0)?;
    lock_file.seek(SeekFrom::Start(0))?;
    writeln!(&lock_file, "{}", std::process::id())?;
    lock_file.flush()?;

    Ok(Some(InstanceLock {
        file: Some(lock_file),
        path: lock_path.to_path_buf(),
    }))
}

/// PID recorded in a lock file, if readable.
pub fn read_lock_pid(lock_path: &Path) -> Option<u32> {
    std::fs::read_to_string(lock_path)
        .ok()?
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}
