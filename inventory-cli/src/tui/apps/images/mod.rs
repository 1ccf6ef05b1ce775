//! Images manager: browse the inventory and upload, replace or delete item images

pub mod app;
pub mod state;
pub mod view;

pub use app::{Context, run};
pub use state::State;
