//! # Pool Configuration
//!
//! Per-pool tuning loaded once at startup from TOML:
//!
//! ```toml
//! [pools.BulletPool]
//! default_capacity = 512
//! stock = true
//!
//! [pools.DebrisPool]
//! default_capacity = 64
//! stock = false
//! enabled = false
//! ```
//!
//! Pools without an entry get [`PoolConfig::default`].

use crate::error::{PoolError, PoolResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default number of active slots reserved per pool.
pub const DEFAULT_CAPACITY: usize = 128;

/// Largest initial capacity a pool may request.
///
/// The active set still grows past it at runtime.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Configuration for a single pool.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Initial active-set capacity. Doubles on overflow.
    pub default_capacity: usize,
    /// Recycle retired entities instead of destroying them.
    pub stock: bool,
    /// Whether update phases run for this pool.
    pub enabled: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            stock: true,
            enabled: true,
        }
    }
}

impl PoolConfig {
    /// Config for pools whose entities are always destroyed on retirement.
    #[must_use]
    pub fn without_stock() -> Self {
        Self {
            stock: false,
            ..Self::default()
        }
    }

    /// Returns a copy with a different initial capacity.
    #[must_use]
    pub fn with_capacity(self, default_capacity: usize) -> Self {
        Self {
            default_capacity,
            ..self
        }
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `default_capacity` is zero or
    /// above [`MAX_CAPACITY`].
    pub fn validate(&self) -> PoolResult<()> {
        if self.default_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "default_capacity must be greater than zero".to_string(),
            ));
        }
        if self.default_capacity > MAX_CAPACITY {
            return Err(PoolError::InvalidConfig(format!(
                "default_capacity {} exceeds the maximum of {MAX_CAPACITY}",
                self.default_capacity
            )));
        }
        Ok(())
    }
}

/// Configuration for every pool in an application, keyed by pool name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StockpileConfig {
    /// Named pool configurations.
    pub pools: BTreeMap<String, PoolConfig>,
}

impl StockpileConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        for (name, pool) in &config.pools {
            pool.validate().map_err(|e| match e {
                PoolError::InvalidConfig(reason) => {
                    PoolError::InvalidConfig(format!("pool '{name}': {reason}"))
                }
                other => other,
            })?;
        }
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ConfigIo`] if the file cannot be read, otherwise
    /// the errors of [`StockpileConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> PoolResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| PoolError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Returns the config for `name`, or the default if none was given.
    #[must_use]
    pub fn pool(&self, name: &str) -> PoolConfig {
        self.pools.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.default_capacity, DEFAULT_CAPACITY);
        assert!(config.stock);
        assert!(config.enabled);
        assert!(config.validate().is_ok());
        assert!(!PoolConfig::without_stock().stock);
    }

    #[test]
    fn test_parse_pools() {
        let config = StockpileConfig::from_toml_str(
            r#"
            [pools.BulletPool]
            default_capacity = 512

            [pools.DebrisPool]
            stock = false
            enabled = false
            "#,
        )
        .unwrap();

        let bullets = config.pool("BulletPool");
        assert_eq!(bullets.default_capacity, 512);
        assert!(bullets.stock);

        let debris = config.pool("DebrisPool");
        assert_eq!(debris.default_capacity, DEFAULT_CAPACITY);
        assert!(!debris.stock);
        assert!(!debris.enabled);

        assert_eq!(config.pool("Missing"), PoolConfig::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = StockpileConfig::from_toml_str("[pools.Bad]\ndefault_capacity = 0\n").unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(ref msg) if msg.contains("Bad")));
        assert_eq!(
            err.to_string(),
            "invalid configuration: pool 'Bad': default_capacity must be greater than zero"
        );
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        let err = StockpileConfig::from_toml_str(
            "[pools.Huge]\ndefault_capacity = 4611686018427387903\n",
        )
        .unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(ref msg) if msg.contains("Huge")));

        let at_limit = PoolConfig::default().with_capacity(MAX_CAPACITY);
        assert!(at_limit.validate().is_ok());
        assert!(at_limit.with_capacity(MAX_CAPACITY + 1).validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = StockpileConfig::from_toml_str("[pools.Bad]\ncapacity = 3\n").unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("test_stockpile_{id}.toml"));
        std::fs::write(&path, "[pools.BulletPool]\ndefault_capacity = 32\nstock = false\n").unwrap();

        let config = StockpileConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let bullets = config.pool("BulletPool");
        assert_eq!(bullets.default_capacity, 32);
        assert!(!bullets.stock);
        assert!(bullets.enabled);
    }

    #[test]
    fn test_missing_file() {
        let err = StockpileConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, PoolError::ConfigIo { .. }));
    }
}
