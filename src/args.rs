//! Command-line argument parsing.
//!
//! ```text
//! rainpaper [--debug] [--config <file>]
//! rainpaper simulate <start> <end> [multiplier] [--log] [--seed <n>]
//! rainpaper assets
//! rainpaper init
//! ```
//!
//! Unknown options or malformed subcommand arguments print the help text and
//! exit with an error.

use std::path::PathBuf;

/// What the user asked for.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon
    Run {
        debug_enabled: bool,
        config_path: Option<PathBuf>,
    },
    /// Run the engine against a simulated clock
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        /// 0 selects the default multiplier
        multiplier: f64,
        log_to_file: bool,
        /// Fixed seed for reproducible weather
        seed: Option<u64>,
        config_path: Option<PathBuf>,
    },
    /// List expected wallpaper and sound files
    Assets { config_path: Option<PathBuf> },
    /// Write a default configuration file
    Init { config_path: Option<PathBuf> },
    ShowHelp,
    ShowVersion,
    ShowHelpDueToError,
}

pub struct ParsedArgs {
    pub action: CliAction,
}

/// `YYYY-MM-DD HH:MM:SS`, checked by shape only.
fn looks_like_datetime(s: &str) -> bool {
    let bytes = s.as_bytes();
    s.len() == 19
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b' '
        && bytes[13] == b':'
        && bytes[16] == b':'
}

impl ParsedArgs {
    /// Parse arguments, including the program name in position 0.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut config_path: Option<PathBuf> = None;
        let mut log_to_file = false;
        let mut seed: Option<u64> = None;
        let mut command: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();
        let mut error = false;

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "--help" | "-h" => return ParsedArgs::with(CliAction::ShowHelp),
                "--version" | "-V" | "-v" => return ParsedArgs::with(CliAction::ShowVersion),
                "--debug" | "-d" => debug_enabled = true,
                "--log" => log_to_file = true,
                "--config" | "-c" => match args.get(i + 1) {
                    Some(path) => {
                        config_path = Some(PathBuf::from(path));
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing path for {arg}");
                        error = true;
                    }
                },
                "--seed" => match args.get(i + 1).map(|s| s.parse::<u64>()) {
                    Some(Ok(value)) => {
                        seed = Some(value);
                        i += 1;
                    }
                    _ => {
                        log_warning!("--seed needs a non-negative integer");
                        error = true;
                    }
                },
                "--simulate" | "-S" if command.is_none() => command = Some("simulate".into()),
                _ if arg.starts_with('-') && arg.parse::<f64>().is_err() => {
                    log_warning!("Unknown option: {arg}");
                    error = true;
                }
                _ if command.is_none() => command = Some(arg.to_string()),
                _ => positionals.push(arg.to_string()),
            }
            i += 1;
        }

        if error {
            return ParsedArgs::with(CliAction::ShowHelpDueToError);
        }

        let action = match command.as_deref() {
            None if positionals.is_empty() => CliAction::Run {
                debug_enabled,
                config_path,
            },
            Some("simulate" | "S") => Self::parse_simulate(
                &positionals,
                debug_enabled,
                log_to_file,
                seed,
                config_path,
            ),
            Some("assets" | "a") if positionals.is_empty() => CliAction::Assets { config_path },
            Some("init" | "i") if positionals.is_empty() => CliAction::Init { config_path },
            Some("help") => CliAction::ShowHelp,
            Some(other) => {
                log_warning!("Unknown command or extra arguments: {other}");
                CliAction::ShowHelpDueToError
            }
            None => CliAction::ShowHelpDueToError,
        };

        ParsedArgs { action }
    }

    fn parse_simulate(
        positionals: &[String],
        debug_enabled: bool,
        log_to_file: bool,
        seed: Option<u64>,
        config_path: Option<PathBuf>,
    ) -> CliAction {
        let (start, end, multiplier) = match positionals {
            [start, end] => (start, end, None),
            [start, end, multiplier] => (start, end, Some(multiplier)),
            _ => {
                log_warning!(
                    "Usage: simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier] [--log]"
                );
                return CliAction::ShowHelpDueToError;
            }
        };

        for (label, value) in [("start", start), ("end", end)] {
            if !looks_like_datetime(value) {
                log_error!("Invalid {label} time format: '{value}'. Use YYYY-MM-DD HH:MM:SS");
                return CliAction::ShowHelpDueToError;
            }
        }

        let multiplier = match multiplier.map(|m| m.parse::<f64>()) {
            None => 0.0,
            Some(Ok(m)) if (0.1..=3600.0).contains(&m) => m,
            Some(_) => {
                log_error!("Invalid multiplier. Must be a number between 0.1 and 3600.");
                return CliAction::ShowHelpDueToError;
            }
        };

        CliAction::Simulate {
            debug_enabled,
            start_time: start.clone(),
            end_time: end.clone(),
            multiplier,
            log_to_file,
            seed,
            config_path,
        }
    }

    fn with(action: CliAction) -> ParsedArgs {
        ParsedArgs { action }
    }

    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("rainpaper [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <file>    Use a specific configuration file");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("simulate, S <start> <end> [multiplier] [--log] [--seed <n>]");
    log_indented!("                       Run against a simulated clock, without video or audio");
    log_indented!("assets, a              List the wallpaper and sound files rainpaper looks for");
    log_indented!("init, i                Write a default configuration file");
    log_end!();
}
