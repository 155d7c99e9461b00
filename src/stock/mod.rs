mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{AdjustmentReceipt, InventoryLog, Sale, SaleReceipt};
pub use services::{adjust_stock, record_sale, sell};
