//! Directory-backed durable store.
//!
//! Each key is one file. Writes go to a temporary sibling first and are then
//! renamed over the target, so a reader never observes a half-written value.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use crate::{KeyValueStore, StoreError};

const VALUE_EXTENSION: &str = "kv";

/// Durable store that keeps one file per key under a directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Open (and create if missing) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::Open(format!("{}: {}", root.display(), e)))?;
        Ok(Self {
            root,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Directory holding the values.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", encode_key(key), VALUE_EXTENSION))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let target = self.path_for(key);
        let seq = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = target.with_extension(format!("{}.tmp{}", VALUE_EXTENSION, seq));

        fs::write(&tmp, value).await?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match decode_key(stem) {
                Some(key) => keys.push(key),
                None => tracing::debug!(file = %path.display(), "skipping undecodable key file"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Encode a key into a filesystem-safe file stem.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("storefront:cart"), "storefront%3Acart");
        assert_eq!(decode_key("storefront%3Acart").as_deref(), Some("storefront:cart"));
        assert_eq!(decode_key("bad%Z"), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();

        let store = FileStore::open(dir.path()).await.unwrap();
        store.set("storefront:cart", b"{}").await.unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("storefront:cart").await.unwrap(),
            Some(b"{}".to_vec())
        );
        assert_eq!(reopened.keys().await.unwrap(), vec!["storefront:cart"]);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get("absent").await.unwrap(), None);
        store.delete("absent").await.unwrap();
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileStore::open(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn test_no_tmp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.set("k", b"1").await.unwrap();
        store.set("k", b"2").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k.kv".to_string()]);
    }
}
