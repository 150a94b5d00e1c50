//! Binary entry point: parse arguments and dispatch.

use anyhow::Result;

use rainpaper::args::{self, CliAction, ParsedArgs};
use rainpaper::commands::{self, simulate::SimulateOptions};
use rainpaper::common::constants::EXIT_FAILURE;
use rainpaper::{Rainpaper, log_end, log_error_exit, log_indented};

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_path,
        } => Rainpaper::new(debug_enabled)
            .with_config_path(config_path)
            .run(),
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            multiplier,
            log_to_file,
            seed,
            config_path,
        } => commands::simulate::handle_simulate_command(SimulateOptions {
            start_time,
            end_time,
            multiplier,
            log_to_file,
            debug_enabled,
            seed,
            config_path,
        }),
        CliAction::Assets { config_path } => {
            commands::assets::handle_assets_command(config_path.as_deref())
        }
        CliAction::Init { config_path } => commands::init::handle_init_command(config_path.as_deref()),
    };

    if let Err(e) = result {
        log_error_exit!("{e}");
        for cause in e.chain().skip(1) {
            log_indented!("{cause}");
        }
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}
