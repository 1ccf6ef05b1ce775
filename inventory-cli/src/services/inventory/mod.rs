// Inventory service: spreadsheet rows as typed records
//
// Mapping, reads and the filtered view, shared by the CLI and the TUI.

pub mod addressing;
pub mod mapper;
pub mod models;
pub mod query;
pub mod view;

pub use addressing::{RowIndex, SheetRow};
pub use models::{InventoryRecord, InventorySummary};
pub use query::{Audience, InventoryQueryService};
pub use view::{ActiveFilter, InventoryView};
