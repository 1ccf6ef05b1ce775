//! External services
//!
//! The spreadsheet holding the inventory, the upload service storing images and
//! the identity provider vouching for the operator. Each sits behind a trait
//! with a reqwest-backed client and an in-memory stand-in for tests.

pub mod auth;
pub mod identity;
pub mod manager;
pub mod sheets;
pub mod upload;

pub use auth::{AuthManager, CredentialSet, TokenInfo};
pub use manager::ClientManager;
pub use identity::{IdentityClient, IdentityProvider, SessionToken, UserId};
pub use sheets::{A1Range, SheetStore, SheetsClient};
pub use upload::{AssetStore, UploadClient, UploadFile, UploadedFile};
