//! Unix signal handling.
//!
//! SIGINT, SIGTERM and SIGHUP all request a graceful shutdown: the shared stop
//! signal is lowered and a message is sent so the main thread can wake up and
//! run its cleanup sequence.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};
use std::sync::mpsc::{Receiver, channel};
use std::thread;

use crate::core::stop::StopSignal;

/// Messages delivered to the main thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    /// Shutdown requested by the given signal number
    Shutdown { signal: i32 },
}

/// Signal handling state shared between threads.
pub struct SignalState {
    pub signal_receiver: Receiver<SignalMessage>,
    handle: Handle,
}

impl SignalState {
    /// Unregister the handlers and end the listener thread.
    pub fn close(&self) {
        self.handle.close();
    }
}

/// Set up signal handling for the application.
///
/// Spawns a background thread that converts termination signals into a stop
/// request plus a [`SignalMessage::Shutdown`] on the channel.
pub fn setup_signal_handler(stop: StopSignal) -> Result<SignalState> {
    let (signal_sender, signal_receiver) = channel::<SignalMessage>();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;
    let handle = signals.handle();

    thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for sig in signals.forever() {
                let name = match sig {
                    SIGINT => "SIGINT",
                    SIGTERM => "SIGTERM",
                    SIGHUP => "SIGHUP",
                    _ => "signal",
                };

                // Leave the in-place status line before printing
                println!();
                log_pipe!();
                log_info!("Received {name}, shutting down...");

                stop.stop();
                if signal_sender
                    .send(SignalMessage::Shutdown { signal: sig })
                    .is_err()
                {
                    break;
                }
            }
        })
        .context("failed to spawn signal listener thread")?;

    Ok(SignalState {
        signal_receiver,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::{Signal, raise};
    use serial_test::serial;
    use std::time::Duration;

    #[test]
    #[serial]
    fn test_hangup_lowers_stop_and_notifies() {
        let stop = StopSignal::new();
        let state = setup_signal_handler(stop.clone()).unwrap();

        raise(Signal::SIGHUP).unwrap();
        let message = state
            .signal_receiver
            .recv_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(message, SignalMessage::Shutdown { signal: SIGHUP });
        assert!(!stop.is_running());
        state.close();
    }
}
