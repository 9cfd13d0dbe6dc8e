//! Durable key-value store for session credentials.
//!
//! The session contract uses exactly two keys: [`TOKEN_KEY`] holds the raw
//! bearer credential and [`PROFILE_KEY`] holds the JSON-serialized profile
//! snapshot. The store is synchronous so that session initialization never
//! suspends, and single-writer-assumed: concurrent processes race on the
//! backing files and the last write wins.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use thiserror::Error;

/// Durable key holding the raw bearer credential string.
pub const TOKEN_KEY: &str = "auth_token";
/// Durable key holding the JSON-serialized profile snapshot.
pub const PROFILE_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid vault key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A durable string-keyed store. Reads of missing keys return `None`;
/// removing a missing key is a no-op.
pub trait Vault: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Returns `~/.config/servicehub` on all platforms.
pub fn servicehub_config_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".config").join("servicehub")
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ── File-backed implementation ───────────────────────────────────────────────

/// Stores each key as a file under a directory, so a session survives
/// process restarts.
pub struct FileVault {
    dir: PathBuf,
}

impl FileVault {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Vault rooted at the default ServiceHub config directory.
    pub fn default_location() -> Self {
        Self::new(servicehub_config_dir())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if !valid_key(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl Vault for FileVault {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        fs::read_to_string(path).ok()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── In-memory implementation ─────────────────────────────────────────────────

/// Ephemeral vault for tests and one-shot use.
#[derive(Default)]
pub struct MemoryVault {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Vault for MemoryVault {
    // A poisoned lock means some thread panicked mid-access; the map
    // itself is still coherent, so recover the guard rather than
    // misreporting keys as absent.

    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        if !valid_key(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_vault_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path().join("servicehub"));

        assert!(vault.get(TOKEN_KEY).is_none());
        vault.put(TOKEN_KEY, "abc.def.ghi").unwrap();
        assert_eq!(vault.get(TOKEN_KEY).as_deref(), Some("abc.def.ghi"));

        vault.put(TOKEN_KEY, "replaced").unwrap();
        assert_eq!(vault.get(TOKEN_KEY).as_deref(), Some("replaced"));

        vault.remove(TOKEN_KEY).unwrap();
        assert!(vault.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path().to_path_buf());
        vault.remove(PROFILE_KEY).unwrap();
        vault.remove(PROFILE_KEY).unwrap();
    }

    #[test]
    fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path().to_path_buf());
        assert!(matches!(
            vault.put("../escape", "x"),
            Err(Error::InvalidKey(_))
        ));
        assert!(vault.get("a/b").is_none());
    }

    #[test]
    fn memory_vault_survives_poisoned_lock() {
        use std::sync::Arc;

        let vault = Arc::new(MemoryVault::new());
        vault.put(TOKEN_KEY, "tok").unwrap();

        // Poison the lock: panic while holding the write guard.
        let poisoner = Arc::clone(&vault);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the vault lock");
        })
        .join();

        assert_eq!(vault.get(TOKEN_KEY).as_deref(), Some("tok"));
        vault.put(PROFILE_KEY, "{}").unwrap();
        assert_eq!(vault.get(PROFILE_KEY).as_deref(), Some("{}"));
        vault.remove(TOKEN_KEY).unwrap();
        assert!(vault.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn memory_vault_round_trip() {
        let vault = MemoryVault::new();
        vault.put(PROFILE_KEY, "{\"id\":\"u1\"}").unwrap();
        assert_eq!(vault.get(PROFILE_KEY).as_deref(), Some("{\"id\":\"u1\"}"));
        vault.remove(PROFILE_KEY).unwrap();
        assert!(vault.get(PROFILE_KEY).is_none());
    }
}
