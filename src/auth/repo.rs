use crate::auth::repo_types::User;
use crate::error::Result;
use sqlx::{Executor, Sqlite, SqlitePool};

impl User {
    /// Find a user by username. Hashes stored as BLOB by older databases are read as text.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, CAST(password_hash AS TEXT) AS password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a user from an already hashed password.
    pub async fn create<'e, E>(db: E, username: &str, password_hash: &str) -> Result<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn count<'e, E>(db: E) -> Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(n)
    }
}
