//! Read-only inventory commands

pub mod handler;

use clap::Args;

use crate::cli::output::OutputFormat;

pub use handler::{handle_list_command, handle_show_command};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only items with an image, as a public visitor sees them
    #[arg(long)]
    pub public: bool,

    /// Only items without an image
    #[arg(long, conflicts_with = "public")]
    pub missing: bool,

    /// Case-insensitive name filter (at least 2 characters)
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Item position (1 = first row below the header)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub position: u32,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
