//! Utility functions shared across the codebase.
//!
//! Terminal state management, path display helpers and process checks.

use std::fs::File;
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use termios::os::linux::{ECHOCTL, tcflag_t};
use termios::{TCSANOW, Termios, tcsetattr};

/// Manages terminal state to hide cursor and suppress control character echoing.
///
/// This struct automatically restores the original terminal state when dropped,
/// ensuring clean cleanup even if the program exits unexpectedly. It is only
/// installed while the in-place status line is active.
pub struct TerminalGuard {
    original_termios: Termios,
}

impl TerminalGuard {
    /// Create a new terminal guard and modify terminal settings.
    ///
    /// # Returns
    /// - `Ok(Some(guard))` if terminal is available and settings were applied
    /// - `Ok(None)` if no terminal is available (e.g., running as a service)
    /// - `Err` only for unexpected errors
    pub fn new() -> io::Result<Option<Self>> {
        let tty = match File::open("/dev/tty") {
            Ok(tty) => tty,
            Err(e) if e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(6) => {
                // No controlling terminal (systemd service, autostart entry)
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let fd = tty.as_raw_fd();

        let mut term = Termios::from_fd(fd)?;
        let original = term;

        // Disable the "^C" echo so it doesn't break the status line on shutdown
        term.c_lflag = without_control_echo(term.c_lflag);
        tcsetattr(fd, TCSANOW, &term)?;

        print!("\x1b[?25l");
        io::stdout().flush()?;

        Ok(Some(Self {
            original_termios: original,
        }))
    }
}

/// Local-mode flags with the `^C` style control-character echo turned off.
fn without_control_echo(lflag: tcflag_t) -> tcflag_t {
    lflag & !ECHOCTL
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Ok(tty) = File::open("/dev/tty") {
            let _ = tcsetattr(tty.as_raw_fd(), TCSANOW, &self.original_termios);
        }
        let _ = write!(io::stdout(), "\x1b[?25h");
        let _ = io::stdout().flush();
    }
}

/// Render a path for log output with the home directory collapsed to `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Check if a process with the given PID is currently running.
pub fn is_process_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Format a number of seconds as a short human-readable duration ("4m 05s").
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(245), "4m 05s");
        assert_eq!(format_duration(3725), "1h 02m 05s");
    }

    #[test]
    fn test_control_echo_is_cleared_other_flags_kept() {
        use termios::os::linux::{ECHO, ICANON};
        let flags = ECHO | ICANON | ECHOCTL;
        assert_eq!(without_control_echo(flags), ECHO | ICANON);
        assert_eq!(without_control_echo(ECHO), ECHO);
    }

    #[test]
    fn test_private_path_outside_home_is_unchanged() {
        let path = PathBuf::from("/usr/share/rainpaper/day.mov");
        assert_eq!(private_path(&path), "/usr/share/rainpaper/day.mov");
    }

    #[test]
    fn test_current_process_is_running() {
        assert!(is_process_running(std::process::id()));
    }
}
