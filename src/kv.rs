// Key/value persistence port

use eyre::{Result, eyre};
use std::collections::HashMap;

/// Durable string storage addressed by key
///
/// The task store depends only on this trait, so the backing medium
/// (SQLite, plain files, memory) is chosen by the caller.
pub trait KvStore {
    /// Read the value under `key`. `Ok(None)` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value under `key` in full.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<K: KvStore + ?Sized> KvStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory backend for tests and ephemeral sessions
#[derive(Debug, Default, Clone)]
pub struct MemKv {
    entries: HashMap<String, String>,
    fail_writes: bool,
    writes: usize,
}

impl MemKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent `set` fail, as a full disk would
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful `set` calls
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KvStore for MemKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(eyre!("Simulated write failure for key: {}", key));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Validate a storage key
///
/// Keys become file names and table keys, so they are kept to a safe alphabet.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_get_missing() {
        let kv = MemKv::new();
        assert_eq!(kv.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_mem_set_overwrites() {
        let mut kv = MemKv::new();
        kv.set("tasks", "[1]").unwrap();
        kv.set("tasks", "[2]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[2]"));
        assert_eq!(kv.writes(), 2);
    }

    #[test]
    fn test_mem_with_entry_is_not_a_write() {
        let kv = MemKv::new().with_entry("tasks", "[]");
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.writes(), 0);
    }

    #[test]
    fn test_mem_simulated_failure() {
        let mut kv = MemKv::new().with_entry("tasks", "old");
        kv.set_fail_writes(true);
        assert!(kv.set("tasks", "new").is_err());
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("old"));

        kv.set_fail_writes(false);
        kv.set("tasks", "new").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_boxed_backend() {
        let mut kv: Box<dyn KvStore> = Box::new(MemKv::new());
        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("tasks").is_ok());
        assert!(validate_key("my_tasks-2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }
}
