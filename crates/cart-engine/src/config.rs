//! Cart engine configuration.

use std::path::Path;

use cart_kv::cache_key;
use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::money::Currency;

/// Settings for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Prefix of the storage key. One cart record per installation.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Currency every line must be priced in.
    #[serde(default)]
    pub currency: Currency,

    /// Collapse snapshots queued behind one another into a single write.
    #[serde(default = "default_true")]
    pub coalesce_writes: bool,
}

fn default_namespace() -> String {
    "storefront".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            currency: Currency::default(),
            coalesce_writes: true,
        }
    }
}

impl CartConfig {
    /// Key the cart snapshot is stored under.
    pub fn storage_key(&self) -> String {
        cache_key!(self.namespace.as_str(), "cart")
    }

    /// Parse from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, CartError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CartError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CartError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.storage_key(), "storefront:cart");
        assert_eq!(config.currency, Currency::USD);
        assert!(config.coalesce_writes);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(CartConfig::from_toml_str("").unwrap(), CartConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = CartConfig::from_toml_str(
            r#"
namespace = "patient-app"
currency = "EUR"
coalesce_writes = false
"#,
        )
        .unwrap();
        assert_eq!(config.storage_key(), "patient-app:cart");
        assert_eq!(config.currency, Currency::EUR);
        assert!(!config.coalesce_writes);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert!(matches!(
            CartConfig::from_toml_str("currency = 12"),
            Err(CartError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = CartConfig::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(CartError::Config(_))));
    }
}
