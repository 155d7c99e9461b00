use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Unknown users and unknown products on update/delete are not errors; those
/// operations return `None` or affect zero rows.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage engine failure (I/O, constraint, malformed SQL).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed while opening the store.
    #[error("schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Password could not be hashed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// The product referenced by a sale or adjustment does not exist.
    #[error("product {0} not found")]
    ProductNotFound(i64),

    /// A sale or adjustment would drive stock below zero.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Sale quantity must be positive.
    #[error("invalid sale quantity {0}: must be greater than zero")]
    InvalidQuantity(i64),

    /// Adjustment delta must be non-zero.
    #[error("invalid stock adjustment: change must be non-zero")]
    InvalidAdjustment,

    /// Applying the adjustment would take stock past the integer range.
    #[error("stock adjustment of {delta} overflows stock for product {product_id}")]
    StockOverflow { product_id: i64, delta: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// True for the invariant-guard variants, which leave the store untouched
    /// and can be retried with corrected input.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            StoreError::ProductNotFound(_)
                | StoreError::InsufficientStock { .. }
                | StoreError::InvalidQuantity(_)
                | StoreError::InvalidAdjustment
                | StoreError::StockOverflow { .. }
        )
    }
}
