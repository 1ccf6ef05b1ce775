//! Identity provider session commands

pub mod handler;

use clap::Subcommand;

pub use handler::handle_auth_command;

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a session token after verifying it with the identity provider
    Login {
        /// Session token; prompted for when omitted
        #[arg(long)]
        token: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in and whether the session is still valid
    Status,
}
