//! CLI configuration.

use anyhow::{Context, Result};
use cart_engine::CartConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine settings.
    #[serde(default)]
    pub cart: CartConfig,

    /// Directory holding the cart store, relative to the working directory.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_storage_dir() -> String {
    ".cart".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cart: CartConfig::default(),
            storage_dir: default_storage_dir(),
            log_filter: default_log_filter(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_engine::Currency;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage_dir, ".cart");
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.cart, CartConfig::default());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(
            &path,
            r#"
storage_dir = "/var/lib/cart"
log_filter = "cart_engine=debug"

[cart]
namespace = "kiosk"
currency = "GBP"
"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage_dir, "/var/lib/cart");
        assert_eq!(config.cart.namespace, "kiosk");
        assert_eq!(config.cart.currency, Currency::GBP);
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"cart": {"coalesce_writes": false}}"#).unwrap();

        let config = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert!(!config.cart.coalesce_writes);
        assert_eq!(config.storage_dir, ".cart");
    }
}
