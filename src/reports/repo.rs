use sqlx::SqlitePool;

use crate::error::Result;
use crate::reports::repo_types::{
    AdjustedProduct, CategorySales, CategoryStock, CurrentStock, ExportSale, HistoryEntry, ProductSales,
    RecentInventoryLog, RecentSale, StockReportRow,
};

// Period filters compare the UTC timestamp text against `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.

pub async fn sales_by_product_on(db: &SqlitePool, day: &str) -> Result<Vec<ProductSales>> {
    let rows = sqlx::query_as::<_, ProductSales>(
        r#"
        SELECT p.name AS product_name,
               SUM(s.quantity) AS total_qty,
               CAST(SUM(s.total_price) AS REAL) AS total_amount
          FROM sales s
          JOIN products p ON s.product_id = p.id
         WHERE date(s.sale_date) = ?
         GROUP BY p.id, p.name
         ORDER BY total_amount DESC, p.name
        "#,
    )
    .bind(day)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn sales_by_category_in_month(db: &SqlitePool, month: &str) -> Result<Vec<CategorySales>> {
    let rows = sqlx::query_as::<_, CategorySales>(
        r#"
        SELECT p.name AS product_name,
               COALESCE(p.category, '') AS category,
               SUM(s.quantity) AS total_qty,
               CAST(SUM(s.total_price) AS REAL) AS total_amount
          FROM sales s
          JOIN products p ON s.product_id = p.id
         WHERE strftime('%Y-%m', s.sale_date) = ?
         GROUP BY p.id, p.name, p.category
         ORDER BY category, total_amount DESC, p.name
        "#,
    )
    .bind(month)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn sales_by_category_in_year(db: &SqlitePool, year: &str) -> Result<Vec<CategorySales>> {
    let rows = sqlx::query_as::<_, CategorySales>(
        r#"
        SELECT p.name AS product_name,
               COALESCE(p.category, '') AS category,
               SUM(s.quantity) AS total_qty,
               CAST(SUM(s.total_price) AS REAL) AS total_amount
          FROM sales s
          JOIN products p ON s.product_id = p.id
         WHERE strftime('%Y', s.sale_date) = ?
         GROUP BY p.id, p.name, p.category
         ORDER BY category, total_amount DESC, p.name
        "#,
    )
    .bind(year)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn sales_by_product_in_year(db: &SqlitePool, year: &str) -> Result<Vec<ProductSales>> {
    let rows = sqlx::query_as::<_, ProductSales>(
        r#"
        SELECT p.name AS product_name,
               SUM(s.quantity) AS total_qty,
               CAST(SUM(s.total_price) AS REAL) AS total_amount
          FROM sales s
          JOIN products p ON s.product_id = p.id
         WHERE strftime('%Y', s.sale_date) = ?
         GROUP BY p.id, p.name
         ORDER BY total_amount DESC, p.name
        "#,
    )
    .bind(year)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn stock_report(db: &SqlitePool) -> Result<Vec<StockReportRow>> {
    let rows = sqlx::query_as::<_, StockReportRow>(
        r#"
        SELECT name,
               COALESCE(category, '') AS category,
               COALESCE(type, '') AS type,
               unit_price,
               stock,
               CAST(unit_price * stock AS REAL) AS stock_value
          FROM products
         ORDER BY category, name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn current_stocks(db: &SqlitePool) -> Result<Vec<CurrentStock>> {
    let rows = sqlx::query_as::<_, CurrentStock>(
        r#"
        SELECT id, name, COALESCE(category, '') AS category, stock
          FROM products
         ORDER BY name, id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn stock_by_category(db: &SqlitePool) -> Result<Vec<CategoryStock>> {
    let rows = sqlx::query_as::<_, CategoryStock>(
        r#"
        SELECT COALESCE(category, '') AS category,
               CAST(SUM(stock) AS INTEGER) AS total_stock,
               COUNT(*) AS product_count
          FROM products
         GROUP BY COALESCE(category, '')
         ORDER BY category
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn recent_sales(db: &SqlitePool, limit: i64) -> Result<Vec<RecentSale>> {
    let rows = sqlx::query_as::<_, RecentSale>(
        r#"
        SELECT s.id, s.product_id, p.name AS product_name, s.quantity, s.total_price, s.sale_date
          FROM sales s
          LEFT JOIN products p ON s.product_id = p.id
         ORDER BY s.sale_date DESC, s.id DESC
         LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn recent_inventory_logs(db: &SqlitePool, limit: i64) -> Result<Vec<RecentInventoryLog>> {
    let rows = sqlx::query_as::<_, RecentInventoryLog>(
        r#"
        SELECT l.id, l.product_id, p.name AS product_name, l.change_qty, l.note, l.log_date
          FROM inventory_logs l
          LEFT JOIN products p ON l.product_id = p.id
         ORDER BY l.log_date DESC, l.id DESC
         LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Logs at or after `since` whose product name or note contains `search` (case-insensitive).
pub async fn inventory_logs_filtered(
    db: &SqlitePool,
    since: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<RecentInventoryLog>> {
    let rows = sqlx::query_as::<_, RecentInventoryLog>(
        r#"
        SELECT l.id, l.product_id, p.name AS product_name, l.change_qty, l.note, l.log_date
          FROM inventory_logs l
          LEFT JOIN products p ON l.product_id = p.id
         WHERE (? IS NULL OR l.log_date >= ?)
           AND (? IS NULL
                OR instr(lower(COALESCE(p.name, '')), lower(?)) > 0
                OR instr(lower(COALESCE(l.note, '')), lower(?)) > 0)
         ORDER BY l.log_date DESC, l.id DESC
        "#,
    )
    .bind(since)
    .bind(since)
    .bind(search)
    .bind(search)
    .bind(search)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn product_history(db: &SqlitePool, product_id: i64) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query_as::<_, HistoryEntry>(
        r#"
        SELECT kind, change_qty, note, date
          FROM (
                SELECT 'Sale' AS kind,
                       -s.quantity AS change_qty,
                       'Sale ID: ' || s.id || ', Total: ' || printf('%.2f', s.total_price) AS note,
                       s.sale_date AS date,
                       COALESCE(s.movement_seq, 0) AS seq,
                       s.id AS row_id
                  FROM sales s
                 WHERE s.product_id = ?
                UNION ALL
                SELECT 'Adjustment' AS kind,
                       l.change_qty AS change_qty,
                       l.note AS note,
                       l.log_date AS date,
                       COALESCE(l.movement_seq, 0) AS seq,
                       l.id AS row_id
                  FROM inventory_logs l
                 WHERE l.product_id = ?
               )
         ORDER BY date DESC, seq DESC, row_id DESC
        "#,
    )
    .bind(product_id)
    .bind(product_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn sales_for_export(db: &SqlitePool) -> Result<Vec<ExportSale>> {
    let rows = sqlx::query_as::<_, ExportSale>(
        r#"
        SELECT s.id,
               p.name AS product_name,
               p.category AS category,
               s.quantity,
               p.unit_price AS unit_price,
               s.total_price,
               s.sale_date
          FROM sales s
          LEFT JOIN products p ON s.product_id = p.id
         ORDER BY s.sale_date DESC, s.id DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Number of adjustments logged strictly after `after` (same text format as `log_date`).
pub async fn adjustments_after(db: &SqlitePool, after: &str) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inventory_logs WHERE log_date > ?")
        .bind(after)
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn adjustments_on(db: &SqlitePool, day: &str) -> Result<i64> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM inventory_logs WHERE date(log_date) = ?")
            .bind(day)
            .fetch_one(db)
            .await?;
    Ok(n)
}

pub async fn adjustment_count(db: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inventory_logs")
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn most_adjusted_product(db: &SqlitePool) -> Result<Option<AdjustedProduct>> {
    let row = sqlx::query_as::<_, AdjustedProduct>(
        r#"
        SELECT p.name AS product_name, COUNT(*) AS adjustments
          FROM inventory_logs l
          JOIN products p ON l.product_id = p.id
         GROUP BY l.product_id, p.name
         ORDER BY adjustments DESC, p.name
         LIMIT 1
        "#,
    )
    .fetch_optional(db)
    .await?;
    Ok(row)
}
