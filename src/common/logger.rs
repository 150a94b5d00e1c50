//! Structured logging system with visual formatting.
//!
//! This module provides the box-drawing log output used throughout rainpaper.
//! It includes different log levels and special formatting functions for creating
//! structured output, plus optional routing of all output into a log file.
//!
//! The logger supports runtime enable/disable functionality for quiet operation
//! during tests, and a verbose switch that gates `log_debug!` output
//! (`[DEBUG] verbose_logging` in the configuration).

use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

// Use an AtomicBool instead of thread_local for thread safety
static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Gates log_debug! output
static VERBOSE_ENABLED: AtomicBool = AtomicBool::new(false);

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: starts a new conceptual block (phase changes, startup steps).
///   Prints an empty pipe `┃` for spacing, then `┣ message`.
/// - **`log_decorated!`**: a line inside the current block, `┣ message`.
/// - **`log_indented!`**: nested details under a block, `┃   message`.
/// - **`log_pipe!`**: a single empty `┃` line, used before a semantic level message.
/// - **`log_version!`** / **`log_end!`**: header and termination marker.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**: semantic messages
///   with a colored `[LEVEL]` tag. `log_debug!` only prints when verbose logging is on.
/// - **`log_error_exit!`**: closes the block with `┗` and a red `[ERROR]`.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    ///
    /// This is useful for quiet operation during automated processes
    /// or testing where log output would interfere with results.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_verbose(verbose: bool) {
        VERBOSE_ENABLED.store(verbose, Ordering::SeqCst);
    }

    pub fn is_verbose() -> bool {
        VERBOSE_ENABLED.load(Ordering::SeqCst)
    }

    /// Start file logging to the specified path.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Get timestamp prefix for simulation mode.
    ///
    /// Shows `[HH:MM:SS]` of the simulated clock so the accelerated log reads like a
    /// real day. Returns an empty string when running on the real clock.
    pub fn get_timestamp_prefix() -> String {
        // Check this without initializing the time source
        if crate::time::source::is_initialized() && crate::time::source::is_simulated() {
            format!("[{}] ", crate::time::source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// Strips ESC [ ... m sequences
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for ch in chars.by_ref() {
                    if ch == 'm' {
                        break;
                    }
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Send formatted text to the log file if one is active, otherwise stdout.
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let clean_text = strip_ansi_codes(text);
        let _ = tx.send(LogMessage::Formatted(clean_text));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Line shapes used by the macros.
#[doc(hidden)]
#[derive(Clone, Copy)]
pub enum Shape {
    /// `┣ message`
    Line,
    /// `┃` spacer, then `┣ message`
    Block,
    /// `┃   message`
    Nested,
    /// `┣[TAG] message`
    Tagged(&'static str),
    /// `┃` spacer, then `┗[TAG] message`
    Closing(&'static str),
}

/// Format one entry with the timestamp prefix on every physical line.
#[doc(hidden)]
pub fn emit(shape: Shape, message: fmt::Arguments<'_>) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::get_timestamp_prefix();
    let mut out = String::new();
    let _ = match shape {
        Shape::Line => write!(out, "{prefix}┣ {message}"),
        Shape::Block => write!(out, "{prefix}┃\n{prefix}┣ {message}"),
        Shape::Nested => write!(out, "{prefix}┃   {message}"),
        Shape::Tagged(tag) => write!(out, "{prefix}┣[{tag}] {message}"),
        Shape::Closing(tag) => write!(out, "{prefix}┃\n{prefix}┗[{tag}] {message}"),
    };
    out.push('\n');
    write_output(&out);
}

/// Emit a bare marker line such as `┃` or `╹`.
#[doc(hidden)]
pub fn emit_marker(marker: &str) {
    if Log::is_enabled() {
        let prefix = Log::get_timestamp_prefix();
        write_output(&format!("{prefix}{marker}\n"));
    }
}

#[doc(hidden)]
pub const WARNING_TAG: &str = "\x1b[33mWARNING\x1b[0m";
#[doc(hidden)]
pub const ERROR_TAG: &str = "\x1b[31mERROR\x1b[0m";
#[doc(hidden)]
pub const INFO_TAG: &str = "\x1b[32mINFO\x1b[0m";
#[doc(hidden)]
pub const DEBUG_TAG: &str = "\x1b[36mDEBUG\x1b[0m";

// # Logging Macros
//
// Each accepts either a format string with arguments or a single displayable
// expression, and expands to a block so it can stand in a match arm.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_shape {
    ($shape:expr, $fmt:literal $($arg:tt)*) => {
        $crate::common::logger::emit($shape, format_args!($fmt $($arg)*))
    };
    ($shape:expr, $expr:expr) => {
        $crate::common::logger::emit($shape, format_args!("{}", $expr))
    };
}

/// A line inside the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)+) => {{
        $crate::__log_shape!($crate::common::logger::Shape::Line, $($t)+)
    }};
}

/// A nested detail under the current block.
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)+) => {{
        $crate::__log_shape!($crate::common::logger::Shape::Nested, $($t)+)
    }};
}

/// An empty `┃` spacer.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        $crate::common::logger::emit_marker("┃")
    }};
}

/// Start a new block: spacer, then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)+) => {{
        $crate::__log_shape!($crate::common::logger::Shape::Block, $($t)+)
    }};
}

/// The `┏ rainpaper vX.Y.Z` header.
#[macro_export]
macro_rules! log_version {
    () => {{
        $crate::common::logger::emit_marker(concat!(
            "┏ rainpaper v",
            env!("CARGO_PKG_VERSION"),
            " ━━╸"
        ))
    }};
}

/// The `╹` end marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        $crate::common::logger::emit_marker("╹")
    }};
}

#[macro_export]
macro_rules! log_warning {
    ($($t:tt)+) => {{
        $crate::__log_shape!(
            $crate::common::logger::Shape::Tagged($crate::common::logger::WARNING_TAG),
            $($t)+
        )
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)+) => {{
        $crate::__log_shape!(
            $crate::common::logger::Shape::Tagged($crate::common::logger::ERROR_TAG),
            $($t)+
        )
    }};
}

/// An error that ends the current flow, closing the block with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)+) => {{
        $crate::__log_shape!(
            $crate::common::logger::Shape::Closing($crate::common::logger::ERROR_TAG),
            $($t)+
        )
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($t:tt)+) => {{
        $crate::__log_shape!(
            $crate::common::logger::Shape::Tagged($crate::common::logger::INFO_TAG),
            $($t)+
        )
    }};
}

/// Only printed when verbose logging is on.
#[macro_export]
macro_rules! log_debug {
    ($($t:tt)+) => {{
        if $crate::common::logger::Log::is_verbose() {
            $crate::__log_shape!(
                $crate::common::logger::Shape::Tagged($crate::common::logger::DEBUG_TAG),
                $($t)+
            )
        }
    }};
}
