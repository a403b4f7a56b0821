//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`health`]. Each handler lives in its
//! own submodule.

pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::ForwarderError;

pub async fn dispatch(cli: Cli) -> Result<(), ForwarderError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  tailspin-forwarder v{version} \u{2014} API request forwarder\n\n  \
         No command provided. To get started:\n\n    \
         tailspin-forwarder run                 Forward /api/* to http://localhost:5100\n    \
         tailspin-forwarder health              Check a running instance\n    \
         tailspin-forwarder --help              See all commands and options\n"
    );
}
