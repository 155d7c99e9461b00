use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::reports::Tabular;

/// Sellable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String, // "Block" | "Cement" by convention
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String, // free-text subtype, e.g. "6 inch Solid"
    pub unit_price: f64,
    pub stock: i64,
}

/// Editable product fields; stock is only changed by sales and adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub unit_price: f64,
}

impl ProductInput {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        kind: impl Into<String>,
        unit_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            kind: kind.into(),
            unit_price,
        }
    }
}

/// Catalog filter. Blank or `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl Tabular for Product {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Category", "Type", "Unit Price", "Stock"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.kind.clone(),
            format!("{:.2}", self.unit_price),
            self.stock.to_string(),
        ]
    }
}
