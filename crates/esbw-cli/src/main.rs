//! esbw - entry point.
//!
//! Parses arguments, sets up logging and dispatches to the selected mode.
//! A missing or unrecognised command prints usage and exits successfully.

use esbw_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Some(args) = cli::parse_or_usage() else {
        return Ok(());
    };

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init(args.no_color, args.quiet);

    let Some(command) = args.command.clone() else {
        print!("{}", cli::usage());
        return Ok(());
    };

    commands::execute(&args.global(), command)
        .await
        .map_err(error::cli_error_to_miette)
}
