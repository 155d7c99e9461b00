use std::fmt;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, PrimitiveDateTime};

use super::repo_types::{
    AdjustedProduct, CategorySales, CategoryStock, CurrentStock, ExportSale, HistoryEntry, MovementKind,
    ProductSales, RecentInventoryLog, RecentSale, StockReportRow,
};

/// Calendar month used by the monthly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<time::Date> for YearMonth {
    fn from(d: time::Date) -> Self {
        Self {
            year: d.year(),
            month: d.month() as u8,
        }
    }
}

/// Stock at or above this level is `Normal` on the inventory screen, whatever the category.
pub const STOCK_STATUS_LOW_BELOW: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    Normal,
}

impl StockStatus {
    pub fn classify(stock: i64) -> Self {
        if stock <= 0 {
            StockStatus::OutOfStock
        } else if stock < STOCK_STATUS_LOW_BELOW {
            StockStatus::LowStock
        } else {
            StockStatus::Normal
        }
    }

    /// Filter semantics: `LowStock` also matches out-of-stock products.
    pub fn matches(self, stock: i64) -> bool {
        match self {
            StockStatus::OutOfStock => stock <= 0,
            StockStatus::LowStock => stock < STOCK_STATUS_LOW_BELOW,
            StockStatus::Normal => stock >= STOCK_STATUS_LOW_BELOW,
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::Normal => "Normal",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockStatusRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub status: StockStatus,
}

impl From<CurrentStock> for StockStatusRow {
    fn from(row: CurrentStock) -> Self {
        Self {
            status: StockStatus::classify(row.stock),
            id: row.id,
            name: row.name,
            category: row.category,
            stock: row.stock,
        }
    }
}

/// Inventory screen filter. Blank or `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StockStatusFilter {
    pub search: Option<String>,
    pub status: Option<StockStatus>,
}

/// Time window of the adjustment history view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPeriod {
    #[default]
    AllTime,
    Today,
    /// Since Monday 00:00.
    ThisWeek,
    /// Since the first of the month, 00:00.
    ThisMonth,
}

impl LogPeriod {
    pub fn start(self, now: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
        let today = now.date();
        let day = match self {
            LogPeriod::AllTime => return None,
            LogPeriod::Today => today,
            LogPeriod::ThisWeek => {
                today - Duration::days(i64::from(today.weekday().number_days_from_monday()))
            }
            LogPeriod::ThisMonth => today - Duration::days(i64::from(today.day()) - 1),
        };
        Some(day.midnight())
    }
}

/// Adjustment history filter; `search` matches product name or note.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogFilter {
    pub period: LogPeriod,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub today_revenue: f64,
    pub today_quantity: i64,
    pub month_revenue: f64,
    pub year_revenue: f64,
    pub product_count: usize,
    pub total_stock_value: f64,
    pub low_stock_count: usize,
    pub stock_by_category: Vec<CategoryStock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentStats {
    pub total: i64,
    /// Logged less than 8 days ago, i.e. at most 7 whole days old.
    pub last_7_days: i64,
    pub today: i64,
    pub most_adjusted: Option<AdjustedProduct>,
}

/// Header row plus string cells, the shape export collaborators (CSV, spreadsheet) consume.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

pub fn to_table<T: Tabular>(rows: &[T]) -> (&'static [&'static str], Vec<Vec<String>>) {
    (T::headers(), rows.iter().map(T::cells).collect())
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

fn timestamp(ts: &PrimitiveDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_else(|_| ts.to_string())
}

fn or_deleted(name: &Option<String>) -> String {
    name.clone().unwrap_or_else(|| "(deleted product)".into())
}

impl Tabular for ProductSales {
    fn headers() -> &'static [&'static str] {
        &["Product", "Quantity", "Revenue"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.total_qty.to_string(),
            money(self.total_amount),
        ]
    }
}

impl Tabular for CategorySales {
    fn headers() -> &'static [&'static str] {
        &["Product", "Category", "Quantity", "Revenue"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.category.clone(),
            self.total_qty.to_string(),
            money(self.total_amount),
        ]
    }
}

impl Tabular for StockReportRow {
    fn headers() -> &'static [&'static str] {
        &["Product", "Category", "Type", "Unit Price", "Stock", "Stock Value"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.category.clone(),
            self.kind.clone(),
            money(self.unit_price),
            self.stock.to_string(),
            money(self.stock_value),
        ]
    }
}

impl Tabular for CurrentStock {
    fn headers() -> &'static [&'static str] {
        &["ID", "Product", "Category", "Stock"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.stock.to_string(),
        ]
    }
}

impl Tabular for StockStatusRow {
    fn headers() -> &'static [&'static str] {
        &["ID", "Product", "Category", "Stock", "Status"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.stock.to_string(),
            self.status.to_string(),
        ]
    }
}

impl Tabular for CategoryStock {
    fn headers() -> &'static [&'static str] {
        &["Category", "Total Stock", "Products"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.total_stock.to_string(),
            self.product_count.to_string(),
        ]
    }
}

impl Tabular for RecentSale {
    fn headers() -> &'static [&'static str] {
        &["ID", "Product", "Quantity", "Total", "Date"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_deleted(&self.product_name),
            self.quantity.to_string(),
            money(self.total_price),
            timestamp(&self.sale_date),
        ]
    }
}

impl Tabular for RecentInventoryLog {
    fn headers() -> &'static [&'static str] {
        &["ID", "Product", "Quantity Change", "Note", "Date"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_deleted(&self.product_name),
            self.change_qty.to_string(),
            self.note.clone().unwrap_or_default(),
            timestamp(&self.log_date),
        ]
    }
}

impl Tabular for HistoryEntry {
    fn headers() -> &'static [&'static str] {
        &["Type", "Change", "Note", "Date"]
    }
    fn cells(&self) -> Vec<String> {
        let kind = match self.kind {
            MovementKind::Sale => "Sale",
            MovementKind::Adjustment => "Adjustment",
        };
        vec![
            kind.to_string(),
            format!("{:+}", self.change_qty),
            self.note.clone().unwrap_or_default(),
            timestamp(&self.date),
        ]
    }
}

impl Tabular for ExportSale {
    fn headers() -> &'static [&'static str] {
        &["Sale ID", "Product", "Category", "Quantity", "Unit Price", "Total", "Date"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_deleted(&self.product_name),
            self.category.clone().unwrap_or_default(),
            self.quantity.to_string(),
            self.unit_price.map(money).unwrap_or_default(),
            money(self.total_price),
            timestamp(&self.sale_date),
        ]
    }
}
