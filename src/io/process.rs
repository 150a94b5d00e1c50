//! Subprocess management.
//!
//! Two kinds of child processes exist: short-lived commands with a bounded
//! runtime (host tool calls) and long-lived players that live as long as the
//! daemon. The former are polled until they exit or their timeout expires; the
//! latter get `PR_SET_PDEATHSIG` so they die with us even on SIGKILL.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fmt;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::common::constants::PROCESS_POLL_INTERVAL_MS;

/// Result of running an external command with a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Timeout,
    /// Non-zero exit, or -1 when terminated by a signal
    ProcessError(i32),
    SpawnFailed,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Success => write!(f, "success"),
            CommandOutcome::Timeout => write!(f, "timed out"),
            CommandOutcome::ProcessError(code) => write!(f, "exited with status {code}"),
            CommandOutcome::SpawnFailed => write!(f, "could not be started"),
        }
    }
}

/// Run `program args...` to completion, killing it if it outlives `timeout`.
///
/// Output is discarded; only the exit status matters.
pub fn run_with_timeout<S: AsRef<OsStr>>(program: &str, args: &[S], timeout: Duration) -> CommandOutcome {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            log_debug!("Failed to start {program}: {e}");
            return CommandOutcome::SpawnFailed;
        }
    };

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return CommandOutcome::Success,
            Ok(Some(status)) => return CommandOutcome::ProcessError(status.code().unwrap_or(-1)),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait(); // Reap to avoid a zombie
                return CommandOutcome::Timeout;
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(PROCESS_POLL_INTERVAL_MS)),
            Err(e) => {
                log_debug!("Error waiting on {program}: {e}");
                let _ = child.kill();
                let _ = child.wait();
                return CommandOutcome::ProcessError(-1);
            }
        }
    }
}

/// A long-running child process that is terminated when dropped.
pub struct ManagedProcess {
    name: String,
    child: Child,
}

impl ManagedProcess {
    /// Spawn `cmd` with stdio silenced and the parent-death signal armed.
    pub fn spawn(name: &str, mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        {
            use std::os::unix::process::CommandExt;

            // SAFETY: the closure only calls prctl, which is async-signal-safe
            unsafe {
                cmd.pre_exec(|| {
                    use nix::sys::prctl;
                    use nix::sys::signal::Signal;

                    prctl::set_pdeathsig(Signal::SIGTERM)?;
                    Ok(())
                });
            }
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {name}"))?;
        log_debug!("{name} started with PID: {}", child.id());

        Ok(Self {
            name: name.to_string(),
            child,
        })
    }

    /// True until the process has exited.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Exit code once finished: `Some(Ok(code))`, `Some(Err(()))` for a signal death.
    pub fn exit_status(&mut self) -> Option<std::result::Result<i32, ()>> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.code().ok_or(())),
            Ok(None) => None,
            Err(_) => Some(Err(())),
        }
    }

    /// Terminate the process and reap it.
    pub fn stop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                log_debug!("{} already exited with {status}", self.name);
            }
            Ok(None) => match self.child.kill() {
                Ok(()) => {
                    let _ = self.child.wait();
                    log_debug!("{} (PID: {}) terminated", self.name, self.child.id());
                }
                Err(e) => {
                    log_error!("Failed to terminate {}: {e}", self.name);
                }
            },
            Err(e) => {
                log_error!("Error checking {} status: {e}", self.name);
            }
        }
    }
}

impl Drop for ManagedProcess {
    fn drop(&mut self) {
        self.stop();
    }
}
