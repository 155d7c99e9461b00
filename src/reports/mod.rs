pub mod dto;
mod repo;
pub mod repo_types;
pub mod services;

pub use dto::{
    to_table, AdjustmentStats, DashboardSummary, LogFilter, LogPeriod, StockStatus,
    StockStatusFilter, StockStatusRow, Tabular, YearMonth, STOCK_STATUS_LOW_BELOW,
};
pub use repo_types::{
    AdjustedProduct, CategorySales, CategoryStock, CurrentStock, ExportSale, HistoryEntry,
    MovementKind, ProductSales, RecentInventoryLog, RecentSale, StockReportRow,
};
pub use services::*;
