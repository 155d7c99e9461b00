use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::Result;
use crate::products::repo_types::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = r#"
    id, name, COALESCE(category, '') AS category, COALESCE(type, '') AS type, unit_price, stock
"#;

impl Product {
    /// All products ordered by name.
    pub async fn list(db: &SqlitePool) -> Result<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id");
        let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(db).await?;
        Ok(rows)
    }

    /// Products whose name contains `search` (case-insensitive) and whose category equals
    /// `category`; `None` skips that filter. Ordered by name.
    pub async fn search(
        db: &SqlitePool,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
              FROM products
             WHERE (? IS NULL OR instr(lower(name), lower(?)) > 0)
               AND (? IS NULL OR category = ?)
             ORDER BY name, id
            "#
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(search)
            .bind(search)
            .bind(category)
            .bind(category)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(db: E, id: i64) -> Result<Option<Product>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    /// First product (lowest id) with exactly this name.
    pub async fn find_by_name(db: &SqlitePool, name: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ? ORDER BY id LIMIT 1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    /// Insert with zero stock; returns the new id.
    pub async fn insert<'e, E>(db: E, input: &ProductInput) -> Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = sqlx::query(
            r#"
            INSERT INTO products (name, category, type, unit_price, stock)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.kind)
        .bind(input.unit_price)
        .execute(db)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Rows affected; zero when the id is unknown.
    pub async fn update(db: &SqlitePool, id: i64, input: &ProductInput) -> Result<u64> {
        let affected = sqlx::query(
            r#"
            UPDATE products
               SET name = ?, category = ?, type = ?, unit_price = ?
             WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.kind)
        .bind(input.unit_price)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
        Ok(affected)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> Result<u64> {
        let affected = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?
            .rows_affected();
        Ok(affected)
    }

    pub async fn count<'e, E>(db: E) -> Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(db)
            .await?;
        Ok(n)
    }
}
