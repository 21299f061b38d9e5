//! Saved connection profiles.
//!
//! Profiles live in one JSON file holding an ordered list of
//! `{ id, config }` records. Every change rewrites the whole file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{Result, ThunderError};
use crate::models::{ConnectionConfig, SavedConnection};

const PROFILES_FILE: &str = "connections.json";

/// Application data directory: `<config dir>/thunder`.
///
/// Debug builds keep it in the working directory.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./thunder_data")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("thunder")
    }
}

/// Default profile file inside [`default_data_dir`].
pub fn default_profiles_path() -> PathBuf {
    default_data_dir().join(PROFILES_FILE)
}

/// File-backed store of saved connection profiles.
pub struct ProfileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(default_profiles_path())
    }
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles in saved order. A missing file is an empty list.
    pub fn list(&self) -> Result<Vec<SavedConnection>> {
        let _guard = self.lock.lock();
        self.load()
    }

    /// Save a new profile under a fresh identity.
    pub fn save(&self, config: ConnectionConfig) -> Result<SavedConnection> {
        let _guard = self.lock.lock();
        let mut profiles = self.load()?;
        let saved = SavedConnection { id: Uuid::new_v4().to_string(), config };
        profiles.push(saved.clone());
        self.store(&profiles)?;

        tracing::debug!(profile_id = %saved.id, name = %saved.config.name, "Saved connection profile");
        Ok(saved)
    }

    /// Replace the configuration of an existing profile.
    pub fn update(&self, id: &str, config: ConnectionConfig) -> Result<SavedConnection> {
        let _guard = self.lock.lock();
        let mut profiles = self.load()?;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ThunderError::not_found(format!("saved connection {id}")))?;
        profile.config = config;
        let updated = profile.clone();
        self.store(&profiles)?;

        tracing::debug!(profile_id = %id, "Updated connection profile");
        Ok(updated)
    }

    /// Remove a profile.
    pub fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut profiles = self.load()?;
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        if profiles.len() == before {
            return Err(ThunderError::not_found(format!("saved connection {id}")));
        }
        self.store(&profiles)?;

        tracing::debug!(profile_id = %id, "Deleted connection profile");
        Ok(())
    }

    fn load(&self) -> Result<Vec<SavedConnection>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a sibling temp file so a crash never leaves half a file.
    fn store(&self, profiles: &[SavedConnection]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ThunderError::storage(
                    format!("Failed to create {}: {e}", parent.display()),
                    Some("Check file permissions"),
                )
            })?;
        }

        let json = serde_json::to_string_pretty(profiles)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("nested").join(PROFILES_FILE));
        (dir, store)
    }

    fn config(name: &str) -> ConnectionConfig {
        ConnectionConfig::new(name, "localhost", "app", "postgres").with_password("pw")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_preserves_order() {
        let (_dir, store) = store();
        let first = store.save(config("first")).unwrap();
        let second = store.save(config("second")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![first, second]);
        assert_ne!(listed[0].id, listed[1].id);
    }

    #[test]
    fn test_update_replaces_config() {
        let (_dir, store) = store();
        let saved = store.save(config("old")).unwrap();

        let updated = store.update(&saved.id, config("new")).unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(store.list().unwrap()[0].config.name, "new");
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let (_dir, store) = store();
        store.save(config("a")).unwrap();

        assert!(store.update("nope", config("b")).unwrap_err().is_not_found());
        assert!(store.delete("nope").unwrap_err().is_not_found());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_rewrites_file() {
        let (_dir, store) = store();
        let a = store.save(config("a")).unwrap();
        let b = store.save(config("b")).unwrap();

        store.delete(&a.id).unwrap();
        let reopened = ProfileStore::new(store.path().to_path_buf());
        assert_eq!(reopened.list().unwrap(), vec![b]);
    }

    #[test]
    fn test_file_format() {
        let (_dir, store) = store();
        store.save(config("a")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw[0]["id"].is_string());
        assert_eq!(raw[0]["config"]["db"], "app");
        assert_eq!(raw[0]["config"]["sslMode"], "disable");
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.list().unwrap_err().category(), "Storage");
    }
}
