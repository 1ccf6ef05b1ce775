pub mod auth;
pub mod config;
pub mod image;
pub mod inventory;
