use serde::Serialize;
use sqlx::FromRow;

/// Stored login credential.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never serialized
}
