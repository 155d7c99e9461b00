use sqlx::{Sqlite, Transaction};

use crate::error::Result;
use crate::stock::repo_types::{InventoryLog, Sale};

/// Next value of the sequence shared by sales and inventory logs. Only valid inside
/// the write transaction that inserts the row.
const NEXT_MOVEMENT_SEQ: &str = r#"
    (SELECT COALESCE(MAX(seq), 0) + 1 FROM (
        SELECT MAX(movement_seq) AS seq FROM sales
        UNION ALL
        SELECT MAX(movement_seq) AS seq FROM inventory_logs
    ))
"#;

/// (stock, unit_price) of a product, read inside the caller's transaction.
pub(super) async fn stock_and_price_tx(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
) -> Result<Option<(i64, f64)>> {
    let row = sqlx::query_as::<_, (i64, f64)>("SELECT stock, unit_price FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Adds `delta` to stock unless the result would be negative. Returns rows affected.
pub(super) async fn apply_stock_delta_tx(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    delta: i64,
) -> Result<u64> {
    let affected = sqlx::query(
        r#"
        UPDATE products
           SET stock = stock + ?
         WHERE id = ? AND stock + ? >= 0
        "#,
    )
    .bind(delta)
    .bind(product_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(affected)
}

pub(super) async fn insert_sale_tx(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    quantity: i64,
    total_price: f64,
) -> Result<Sale> {
    let sql = format!(
        r#"
        INSERT INTO sales (product_id, quantity, total_price, movement_seq)
        VALUES (?, ?, ?, {NEXT_MOVEMENT_SEQ})
        RETURNING id, product_id, quantity, total_price, sale_date
        "#
    );
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(product_id)
        .bind(quantity)
        .bind(total_price)
        .fetch_one(&mut **tx)
        .await?;
    Ok(sale)
}

pub(super) async fn insert_inventory_log_tx(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    change_qty: i64,
    note: Option<&str>,
) -> Result<InventoryLog> {
    let sql = format!(
        r#"
        INSERT INTO inventory_logs (product_id, change_qty, note, movement_seq)
        VALUES (?, ?, ?, {NEXT_MOVEMENT_SEQ})
        RETURNING id, product_id, change_qty, note, log_date
        "#
    );
    let log = sqlx::query_as::<_, InventoryLog>(&sql)
        .bind(product_id)
        .bind(change_qty)
        .bind(note)
        .fetch_one(&mut **tx)
        .await?;
    Ok(log)
}
