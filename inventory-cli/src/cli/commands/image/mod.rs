//! Image mutation commands

pub mod handler;

use clap::Subcommand;
use std::path::PathBuf;

pub use handler::handle_image_command;

#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    /// Upload the first image for an item
    Upload {
        /// Item position (1 = first row below the header)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
        /// Image file (jpeg, png or webp)
        file: PathBuf,
    },

    /// Replace an item's image, deleting the old asset
    Replace {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
        file: PathBuf,
    },

    /// Delete an item's image and clear its cell
    Delete {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
