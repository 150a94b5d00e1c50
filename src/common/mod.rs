// Shared building blocks: logging macros, defaults, terminal and path helpers.
// The logger is declared first so its macros are visible to the siblings.
#[macro_use]
pub mod logger;

pub mod constants;
pub mod utils;
