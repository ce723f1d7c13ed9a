//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default, so a missing file still
//! produces a usable configuration.

pub mod cache;
pub mod database;
pub mod logging;
pub mod tree;

use serde::{Deserialize, Serialize};

use self::cache::CacheConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::tree::TreeConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tree store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Tree rendering settings.
    #[serde(default)]
    pub tree: TreeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay
    /// `config/{env}` and environment variables prefixed with `FOLDVIEW__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration using an explicit base file path (without extension).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLDVIEW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.cache.provider, "memory");
        assert_eq!(config.tree.max_depth, 64);
        assert!(!config.tree.show_only_accessible_folders);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_toml_str(
            r#"
            [cache]
            provider = "redis"

            [tree]
            max_nodes = 500
            show_only_accessible_folders = true
            tree_counters = true
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.provider, "redis");
        assert_eq!(config.tree.max_nodes, 500);
        assert!(config.tree.show_only_accessible_folders);
        assert!(config.tree.tree_counters);
        assert_eq!(config.cache.redis.url, "redis://localhost:6379");
    }

    #[test]
    fn test_invalid_type_is_configuration_error() {
        let err = AppConfig::from_toml_str("[tree]\nmax_nodes = \"many\"").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
