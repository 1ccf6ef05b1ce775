// Business logic services layer
//
// Inventory reads and image mutations, shared by the CLI commands and the
// TUI.

pub mod images;
pub mod inventory;
