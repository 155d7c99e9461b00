use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::auth::password::hash_password;
use crate::auth::User;
use crate::config::AppConfig;
use crate::error::Result;
use crate::events::{EventBus, StoreEvent};
use crate::products::{Product, ProductInput};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// (name, category, type, unit_price)
const SAMPLE_PRODUCTS: [(&str, &str, &str, f64); 5] = [
    ("5 inch Solid Block", "Block", "5 inch Solid", 5.0),
    ("6 inch Solid Block", "Block", "6 inch Solid", 6.0),
    ("9 inch Solid Block", "Block", "9 inch Solid", 9.0),
    ("Dangote Cement", "Cement", "Dangote Cement", 90.0),
    ("Ghacem Cement", "Cement", "Ghacem Cement", 85.0),
];

/// Open handle on the inventory and sales database.
#[derive(Clone)]
pub struct Store {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    events: EventBus,
}

impl Store {
    /// Connects, applies the schema and seeds sample data. Failures here are fatal at startup.
    pub async fn open(config: AppConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            // History rows must survive product deletion.
            .foreign_keys(false);

        let db = SqlitePoolOptions::new()
            .max_connections(config.pool_size())
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self {
            db,
            events: EventBus::new(config.event_capacity),
            config: Arc::new(config),
        };
        store.initialize().await?;
        info!(url = %store.config.database_url, "store opened");
        Ok(store)
    }

    /// Creates missing tables and seeds sample products and the admin account. Idempotent.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;

        let mut tx = self.db.begin().await?;

        if Product::count(&mut *tx).await? == 0 {
            for (name, category, kind, unit_price) in SAMPLE_PRODUCTS {
                let input = ProductInput::new(name, category, kind, unit_price);
                Product::insert(&mut *tx, &input).await?;
            }
            info!(count = SAMPLE_PRODUCTS.len(), "sample products seeded");
        }

        if User::count(&mut *tx).await? == 0 {
            let hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
            User::create(&mut *tx, DEFAULT_ADMIN_USERNAME, &hash).await?;
            info!(username = DEFAULT_ADMIN_USERNAME, "default admin user created");
        }

        tx.commit().await?;
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: StoreEvent) {
        self.events.publish(event);
    }

    pub async fn close(&self) {
        self.db.close().await;
        info!("store closed");
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    Store::open(AppConfig::in_memory())
        .await
        .expect("in-memory store opens")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_seeds_products_and_admin() {
        let store = test_store().await;

        let rows: Vec<(String, f64, i64)> =
            sqlx::query_as("SELECT name, unit_price, stock FROM products ORDER BY id")
                .fetch_all(&store.db)
                .await
                .unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[3], ("Dangote Cement".to_string(), 90.0, 0));
        assert!(rows.iter().all(|(_, _, stock)| *stock == 0));

        let (hash,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = 'admin'")
                .fetch_one(&store.db)
                .await
                .unwrap();
        assert_ne!(hash, DEFAULT_ADMIN_PASSWORD);
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let store = test_store().await;
        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&store.db)
            .await
            .unwrap();
        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&store.db)
            .await
            .unwrap();
        assert_eq!(products, 5);
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn in_memory_store_ignores_larger_pool_setting() {
        let store = Store::open(AppConfig {
            max_connections: 4,
            ..AppConfig::in_memory()
        })
        .await
        .unwrap();

        for _ in 0..3 {
            let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
                .fetch_one(&store.db)
                .await
                .unwrap();
            assert_eq!(n, 5);
        }
    }

    #[tokio::test]
    async fn open_fails_for_unreachable_path() {
        let cfg = AppConfig {
            database_url: "sqlite:///nonexistent-dir/for/sure/pos.db".into(),
            ..AppConfig::default()
        };
        assert!(Store::open(cfg).await.is_err());
    }
}
