//! Configuration inspection commands

pub mod handler;

use clap::Subcommand;

pub use handler::handle_config_command;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings with secrets masked
    Show,

    /// Print the config file location
    Path,

    /// Check that every required setting is present
    Validate,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
