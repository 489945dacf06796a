//! Object storage boundary.
//!
//! The pipeline reads and writes opaque blobs by key. `FsStorage` keeps
//! blobs under a root directory; the trait is the seam for other
//! backends.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use redraft_core::{Error, Result};

/// Key-to-blob storage as the pipeline sees it.
pub trait Storage: Send + Sync {
    /// Fetch a blob. `Error::NotFound` when the key does not exist.
    fn get(&self, key: &str) -> Result<Vec<u8>>;
    /// Store a blob, replacing any existing value for the key.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
    /// Keys under a prefix (one directory level), sorted.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Filesystem-backed storage: one file per key under a root directory.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve a key to a path under the root. Keys are relative slash
    /// paths; anything that would escape the root is rejected.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(Error::Storage(format!("invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

impl Storage for FsStorage {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(key.to_string()))
            }
            Err(e) => Err(Error::Storage(format!("read {key}: {e}"))),
        }
    }

    fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Storage(format!("mkdir {key}: {e}")))?;
        }
        fs::write(&path, bytes).map_err(|e| Error::Storage(format!("write {key}: {e}")))?;
        debug!("Stored {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_matches('/');
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.path_for(prefix)?
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Storage(format!("list {prefix}: {e}"))),
        };

        let mut keys = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                let name = entry.file_name().to_string_lossy().to_string();
                if prefix.is_empty() {
                    keys.push(name);
                } else {
                    keys.push(format!("{prefix}/{name}"));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, FsStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let (_dir, storage) = storage();
        storage.put("jobs/a.json", b"{}", "application/json").unwrap();
        assert_eq!(storage.get("jobs/a.json").unwrap(), b"{}");
    }

    #[test]
    fn test_get_missing_key_is_not_found() {
        let (_dir, storage) = storage();
        match storage.get("jobs/missing.json") {
            Err(Error::NotFound(key)) => assert_eq!(key, "jobs/missing.json"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_traversal_keys_rejected() {
        let (_dir, storage) = storage();
        assert!(storage.get("../outside").is_err());
        assert!(storage.put("/absolute", b"x", "text/plain").is_err());
        assert!(storage.put("", b"x", "text/plain").is_err());
    }

    #[test]
    fn test_list_returns_sorted_keys_under_prefix() {
        let (_dir, storage) = storage();
        storage.put("jobs/b.json", b"{}", "application/json").unwrap();
        storage.put("jobs/a.json", b"{}", "application/json").unwrap();
        storage.put("results/r.txt", b"t", "text/plain").unwrap();

        let keys = storage.list("jobs/").unwrap();
        assert_eq!(keys, vec!["jobs/a.json", "jobs/b.json"]);
        assert_eq!(storage.list("nothing/").unwrap(), Vec::<String>::new());
    }
}
