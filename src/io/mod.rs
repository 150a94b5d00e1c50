// External I/O: signals, lock file, subprocesses and player IPC
pub mod lock; // Single-instance lock file
pub mod mpv_ipc; // JSON IPC over the player's Unix socket
pub mod process; // Timed commands and managed child processes
pub mod signals; // Unix signal handling
