use serde::Serialize;
use sqlx::FromRow;
use time::PrimitiveDateTime;

/// Per-product sales totals (daily and yearly-by-product reports).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ProductSales {
    pub product_name: String,
    pub total_qty: i64,
    pub total_amount: f64,
}

/// Per-product sales totals with category (monthly and yearly reports).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CategorySales {
    pub product_name: String,
    pub category: String,
    pub total_qty: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StockReportRow {
    pub name: String,
    pub category: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub unit_price: f64,
    pub stock: i64,
    pub stock_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CurrentStock {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub stock: i64,
}

/// Sale joined to its product; `product_name` is `None` once the product is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RecentSale {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub total_price: f64,
    pub sale_date: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RecentInventoryLog {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub change_qty: i64,
    pub note: Option<String>,
    pub log_date: PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
pub enum MovementKind {
    Sale,
    Adjustment,
}

/// One stock movement of a product; sales carry a negative `change_qty`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct HistoryEntry {
    pub kind: MovementKind,
    pub change_qty: i64,
    pub note: Option<String>,
    pub date: PrimitiveDateTime,
}

/// Full sale record for bulk extraction.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ExportSale {
    pub id: i64,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub quantity: i64,
    pub unit_price: Option<f64>,
    pub total_price: f64,
    pub sale_date: PrimitiveDateTime,
}

/// Most frequently adjusted product.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AdjustedProduct {
    pub product_name: String,
    pub adjustments: i64,
}

/// Total stock per category, for the dashboard stock overview.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CategoryStock {
    pub category: String,
    pub total_stock: i64,
    pub product_count: i64,
}
