//! # Rainpaper Library
//!
//! Internal library for the rainpaper binary: a live-wallpaper daemon that
//! picks looping videos by time of day and a randomized rain/clear weather
//! cycle, with ambient audio and rain fades.
//!
//! The library exists so the engine can be tested without a desktop. Layers:
//!
//! - **Entry point**: [`Rainpaper`] acquires resources and runs the engine
//! - **Engine**: `core` wires the weather cycle, status loop, music loop and
//!   display actor together around one stop signal
//! - **Domain**: `time` (clocks and time windows), `weather` (phases and the
//!   cycle), `display` (presenters), `audio` (mixer, fades, playlist)
//! - **Configuration**: `config` for TOML settings with defaults and validation
//! - **Commands**: `commands` for `simulate`, `assets` and `init`
//! - **Infrastructure**: `io` for subprocesses, player IPC, signals and the
//!   instance lock; `common` for logging and utilities

// Logger macros must be declared before the modules that use them
#[macro_use]
pub mod common;

pub mod args;
pub mod audio;
pub mod commands;
pub mod config;
pub mod core;
pub mod display;
pub mod io;
pub mod rainpaper;
pub mod time;
pub mod weather;

pub use rainpaper::Rainpaper;
