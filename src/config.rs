use serde::Deserialize;
use tracing::warn;

/// Per-category thresholds below which a product counts as low on stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LowStockConfig {
    pub block: i64,
    pub cement: i64,
}

impl Default for LowStockConfig {
    fn default() -> Self {
        Self {
            block: 10,
            cement: 5,
        }
    }
}

impl LowStockConfig {
    /// Categories other than Block and Cement are never flagged.
    pub fn is_low(&self, category: &str, stock: i64) -> bool {
        match category {
            "Block" => stock < self.block,
            "Cement" => stock < self.cement,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub event_capacity: usize,
    pub low_stock: LowStockConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://pos.db".into(),
            max_connections: 1,
            event_capacity: 64,
            low_stock: LowStockConfig::default(),
        }
    }
}

impl AppConfig {
    /// Unset variables take the default; set but unparseable ones are logged and ignored.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let low_stock = LowStockConfig {
            block: env_setting("LOW_STOCK_BLOCK", defaults.low_stock.block),
            cement: env_setting("LOW_STOCK_CEMENT", defaults.low_stock.cement),
        };
        let config = Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: env_setting("DB_MAX_CONNECTIONS", defaults.max_connections),
            event_capacity: env_setting("EVENT_CAPACITY", defaults.event_capacity),
            low_stock,
        };
        if config.is_in_memory() && config.max_connections > 1 {
            warn!(
                max_connections = config.max_connections,
                "in-memory database is per connection; using a single connection"
            );
        }
        Ok(config)
    }

    /// In-memory database for tests; a single connection keeps every query on the same database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Connections the pool may open. Always 1 for in-memory databases, which each
    /// connection would otherwise see as a separate empty database.
    pub fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

fn env_setting<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_setting(key, std::env::var(key).ok(), default)
}

fn parse_setting<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "invalid setting, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shop_thresholds() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.max_connections, 1);
        assert_eq!(cfg.low_stock, LowStockConfig { block: 10, cement: 5 });
    }

    #[test]
    fn low_stock_thresholds_are_per_category() {
        let policy = LowStockConfig::default();
        assert!(policy.is_low("Block", 9));
        assert!(!policy.is_low("Block", 10));
        assert!(policy.is_low("Cement", 4));
        assert!(!policy.is_low("Cement", 5));
        assert!(!policy.is_low("Sand", 0));
    }

    #[test]
    fn in_memory_keeps_other_defaults() {
        let cfg = AppConfig::in_memory();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.event_capacity, 64);
    }

    #[test]
    fn settings_fall_back_on_bad_values() {
        assert_eq!(parse_setting("DB_MAX_CONNECTIONS", None, 1u32), 1);
        assert_eq!(parse_setting("DB_MAX_CONNECTIONS", Some(" 4 ".into()), 1u32), 4);
        assert_eq!(parse_setting("DB_MAX_CONNECTIONS", Some("four".into()), 1u32), 1);
        assert_eq!(parse_setting("LOW_STOCK_BLOCK", Some("-".into()), 10i64), 10);
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let mut cfg = AppConfig {
            max_connections: 8,
            ..AppConfig::in_memory()
        };
        assert!(cfg.is_in_memory());
        assert_eq!(cfg.pool_size(), 1);

        cfg.database_url = "sqlite://pos.db".into();
        assert!(!cfg.is_in_memory());
        assert_eq!(cfg.pool_size(), 8);

        cfg.max_connections = 0;
        assert_eq!(cfg.pool_size(), 1);
    }
}
