//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::auth::AuthCommands;
use commands::config::ConfigCommands;
use commands::image::ImageCommands;
use commands::inventory::{ListArgs, ShowArgs};

#[derive(Parser)]
#[command(name = "inventory-cli")]
#[command(about = "Manage product images for a spreadsheet-backed inventory")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List inventory items
    List(ListArgs),

    /// Show one item by position
    Show(ShowArgs),

    /// Upload, replace or delete an item's image
    #[command(subcommand)]
    Image(ImageCommands),

    /// Manage the identity provider session
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Open the interactive images manager
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_flags() {
        let cli = Cli::try_parse_from([
            "inventory-cli",
            "list",
            "--missing",
            "--search",
            "wid",
            "--format",
            "json",
        ])
        .unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert!(args.missing);
        assert_eq!(args.search.as_deref(), Some("wid"));
        assert_eq!(args.format, output::OutputFormat::Json);
    }

    #[test]
    fn test_parse_image_delete() {
        let cli = Cli::try_parse_from(["inventory-cli", "image", "delete", "3", "--yes"]).unwrap();
        match cli.command {
            Commands::Image(ImageCommands::Delete { position, yes }) => {
                assert_eq!(position, 3);
                assert!(yes);
            }
            _ => panic!("expected image delete"),
        }
    }

    #[test]
    fn test_position_zero_is_rejected() {
        assert!(Cli::try_parse_from(["inventory-cli", "show", "0"]).is_err());
    }
}
