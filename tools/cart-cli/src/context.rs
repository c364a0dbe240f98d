//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use cart_engine::{CartStatus, CartStore};
use cart_kv::FileStore;

use crate::config::CliConfig;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            find_config(&cwd).unwrap_or_default()
        };

        Ok(Self { config, output, cwd })
    }

    /// Directory the cart store lives in.
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage_dir)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Open the cart and wait for the stored snapshot to be restored.
    pub async fn open_cart(&self) -> Result<CartStore> {
        let dir = self.storage_dir();
        self.output
            .debug(&format!("Opening cart store at {}", dir.display()));

        let store = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open cart store at {}", dir.display()))?;
        let cart = CartStore::open(Arc::new(store), self.config.cart.clone());

        let status = cart.ready().await;
        if status != CartStatus::Ready {
            anyhow::bail!("Cart store is {}", status.as_str());
        }
        Ok(cart)
    }
}

/// Find a config file in `start` or any of its parents.
fn find_config(start: &Path) -> Option<CliConfig> {
    let config_names = ["cart.toml", ".cart.toml", "cart.json"];

    let mut current = start.to_path_buf();
    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                    return Some(config);
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cart.toml"), "storage_dir = \"state\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = find_config(&nested).unwrap();
        assert_eq!(config.storage_dir, "state");
    }

    #[test]
    fn test_storage_dir_is_relative_to_cwd() {
        let ctx = Context {
            config: CliConfig::default(),
            output: Output::new(false, true),
            cwd: PathBuf::from("/srv/shop"),
        };
        assert_eq!(ctx.storage_dir(), PathBuf::from("/srv/shop/.cart"));
        assert_eq!(ctx.resolve_path("/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
