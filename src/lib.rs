//! Inventory and sales store for a blocks and cement retailer.
//!
//! Views call into [`Store`] through the per-area service functions and
//! subscribe to [`StoreEvent`]s to refresh after mutations.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod forms;
pub mod products;
pub mod reports;
pub mod stock;

pub use config::{AppConfig, LowStockConfig};
pub use db::Store;
pub use error::{Result, StoreError};
pub use events::StoreEvent;
