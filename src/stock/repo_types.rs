use serde::Serialize;
use sqlx::FromRow;
use time::PrimitiveDateTime;

/// Completed sale. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_price: f64,
    pub sale_date: PrimitiveDateTime, // UTC, set by the database
}

/// Manual stock adjustment. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct InventoryLog {
    pub id: i64,
    pub product_id: i64,
    pub change_qty: i64,
    pub note: Option<String>,
    pub log_date: PrimitiveDateTime, // UTC, set by the database
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub stock_after: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentReceipt {
    pub log: InventoryLog,
    pub stock_after: i64,
}
