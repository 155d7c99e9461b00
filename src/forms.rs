//! Client-side input checks for the presentation layer.
//!
//! Unfilled widgets are `None` (or blank), never a placeholder string. Everything
//! here is pure: the store re-checks the stock invariants on its own.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::macros::format_description;
use time::Date;

use crate::products::{Product, ProductInput};
use crate::reports::YearMonth;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
    #[error("insufficient stock, available: {available}")]
    InsufficientStock { available: i64 },
}

fn filled<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, FormError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(FormError::Missing(field))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub unit_price: Option<String>,
}

impl ProductForm {
    pub fn validate(&self) -> Result<ProductInput, FormError> {
        let name = filled(&self.name, "name")?;
        let category = filled(&self.category, "category")?;
        let kind = filled(&self.kind, "type")?;
        let price: f64 = filled(&self.unit_price, "unit price")?
            .parse()
            .map_err(|_| FormError::Invalid {
                field: "unit price",
                expected: "a number",
            })?;
        if !price.is_finite() || price <= 0.0 {
            return Err(FormError::Invalid {
                field: "unit price",
                expected: "positive",
            });
        }
        Ok(ProductInput::new(name, category, kind, price))
    }
}

/// A sale validated against the product's stock at the time of entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub total_price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SaleForm {
    pub product_id: Option<i64>,
    pub quantity: Option<String>,
}

impl SaleForm {
    pub fn validate(&self, product: &Product) -> Result<SaleRequest, FormError> {
        let product_id = self.product_id.ok_or(FormError::Missing("product"))?;
        let quantity = parse_quantity(&self.quantity)?;
        if quantity <= 0 {
            return Err(FormError::Invalid {
                field: "quantity",
                expected: "positive",
            });
        }
        if quantity > product.stock {
            return Err(FormError::InsufficientStock {
                available: product.stock,
            });
        }
        Ok(SaleRequest {
            product_id,
            quantity,
            total_price: quantity as f64 * product.unit_price,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentRequest {
    pub product_id: i64,
    pub delta: i64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdjustmentForm {
    pub product_id: Option<i64>,
    pub quantity: Option<String>,
    pub note: Option<String>,
}

impl AdjustmentForm {
    pub fn validate(&self, product: &Product) -> Result<AdjustmentRequest, FormError> {
        let product_id = self.product_id.ok_or(FormError::Missing("product"))?;
        let delta = parse_quantity(&self.quantity)?;
        if delta == 0 {
            return Err(FormError::Invalid {
                field: "quantity change",
                expected: "non-zero",
            });
        }
        match product.stock.checked_add(delta) {
            None => {
                return Err(FormError::Invalid {
                    field: "quantity change",
                    expected: "within the stock range",
                })
            }
            Some(after) if after < 0 => {
                return Err(FormError::InsufficientStock {
                    available: product.stock,
                })
            }
            Some(_) => {}
        }
        Ok(AdjustmentRequest {
            product_id,
            delta,
            note: optional(&self.note),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    /// (username, password); the password is not trimmed.
    pub fn validate(&self) -> Result<(String, String), FormError> {
        let username = filled(&self.username, "username")?;
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(FormError::Missing("password"))?;
        Ok((username.to_owned(), password.to_owned()))
    }
}

fn parse_quantity(value: &Option<String>) -> Result<i64, FormError> {
    filled(value, "quantity")?
        .parse()
        .map_err(|_| FormError::Invalid {
            field: "quantity",
            expected: "a whole number",
        })
}

/// `YYYY-MM-DD`
pub fn parse_date(input: &str) -> Result<Date, FormError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        FormError::Invalid {
            field: "date",
            expected: "YYYY-MM-DD",
        }
    })
}

/// `YYYY-MM`
pub fn parse_month(input: &str) -> Result<YearMonth, FormError> {
    lazy_static! {
        static ref MONTH_RE: Regex = Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])$").unwrap();
    }
    let invalid = FormError::Invalid {
        field: "month",
        expected: "YYYY-MM",
    };
    let caps = MONTH_RE.captures(input.trim()).ok_or(invalid.clone())?;
    let year = caps[1].parse().map_err(|_| invalid.clone())?;
    let month = caps[2].parse().map_err(|_| invalid)?;
    Ok(YearMonth { year, month })
}

/// `YYYY`
pub fn parse_year(input: &str) -> Result<i32, FormError> {
    lazy_static! {
        static ref YEAR_RE: Regex = Regex::new(r"^\d{4}$").unwrap();
    }
    let input = input.trim();
    let invalid = FormError::Invalid {
        field: "year",
        expected: "YYYY",
    };
    if !YEAR_RE.is_match(input) {
        return Err(invalid);
    }
    input.parse().map_err(|_| invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn cement(stock: i64) -> Product {
        Product {
            id: 4,
            name: "Dangote Cement".into(),
            category: "Cement".into(),
            kind: "Dangote Cement".into(),
            unit_price: 90.0,
            stock,
        }
    }

    #[test]
    fn product_form_requires_every_field() {
        let form = ProductForm {
            name: s("Hollow Block"),
            category: s("Block"),
            kind: s("  "),
            unit_price: s("5"),
        };
        assert_eq!(form.validate().unwrap_err(), FormError::Missing("type"));
        assert_eq!(ProductForm::default().validate().unwrap_err(), FormError::Missing("name"));
    }

    #[test]
    fn product_form_rejects_non_positive_price() {
        let mut form = ProductForm {
            name: s("Hollow Block"),
            category: s("Block"),
            kind: s("6 inch Hollow"),
            unit_price: s("0"),
        };
        assert!(matches!(form.validate(), Err(FormError::Invalid { field: "unit price", .. })));
        form.unit_price = s("abc");
        assert!(form.validate().is_err());
        form.unit_price = s(" 5.50 ");
        let input = form.validate().unwrap();
        assert_eq!(input.unit_price, 5.5);
        assert_eq!(input.kind, "6 inch Hollow");
    }

    #[test]
    fn sale_form_checks_stock_and_prices_sale() {
        let form = SaleForm { product_id: Some(4), quantity: s("5") };
        let req = form.validate(&cement(45)).unwrap();
        assert_eq!(req, SaleRequest { product_id: 4, quantity: 5, total_price: 450.0 });

        assert_eq!(
            form.validate(&cement(4)).unwrap_err(),
            FormError::InsufficientStock { available: 4 }
        );
        let zero = SaleForm { product_id: Some(4), quantity: s("0") };
        assert!(zero.validate(&cement(10)).is_err());
        let missing = SaleForm { product_id: None, quantity: s("1") };
        assert_eq!(missing.validate(&cement(10)).unwrap_err(), FormError::Missing("product"));
    }

    #[test]
    fn adjustment_form_allows_signed_changes() {
        let form = AdjustmentForm {
            product_id: Some(4),
            quantity: s("-3"),
            note: s(""),
        };
        let req = form.validate(&cement(3)).unwrap();
        assert_eq!(req.delta, -3);
        assert_eq!(req.note, None);

        assert!(form.validate(&cement(2)).is_err());
        let zero = AdjustmentForm { quantity: s("0"), ..form };
        assert!(zero.validate(&cement(2)).is_err());
    }

    #[test]
    fn adjustment_form_rejects_out_of_range_changes() {
        let huge = AdjustmentForm {
            product_id: Some(4),
            quantity: s(&i64::MAX.to_string()),
            note: None,
        };
        assert!(matches!(
            huge.validate(&cement(1)),
            Err(FormError::Invalid { field: "quantity change", .. })
        ));

        let most_negative = AdjustmentForm {
            quantity: s(&i64::MIN.to_string()),
            ..huge
        };
        assert_eq!(
            most_negative.validate(&cement(1)).unwrap_err(),
            FormError::InsufficientStock { available: 1 }
        );
    }

    #[test]
    fn login_form_requires_both_fields() {
        let form = LoginForm { username: s("admin"), password: None };
        assert_eq!(form.validate().unwrap_err(), FormError::Missing("password"));
        let form = LoginForm { username: s(" admin "), password: s("admin123") };
        assert_eq!(form.validate().unwrap(), ("admin".to_string(), "admin123".to_string()));
    }

    #[test]
    fn periods_parse_strictly() {
        assert_eq!(parse_date("2025-03-14").unwrap(), date!(2025 - 03 - 14));
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("14/03/2025").is_err());

        assert_eq!(parse_month("2025-03").unwrap(), YearMonth { year: 2025, month: 3 });
        assert!(parse_month("2025-3").is_err());
        assert!(parse_month("2025-00").is_err());

        assert_eq!(parse_year("2024").unwrap(), 2024);
        assert!(parse_year("24").is_err());
        assert!(parse_year("Enter year").is_err());
    }
}
