//! Key/value backends. Values are RON strings keyed by `PersistKey::as_str`.

use {
    crate::PersistenceError,
    bevy::{platform::collections::HashMap, prelude::*},
    std::{
        fs,
        io::{ErrorKind, Write},
        path::PathBuf,
    },
};

pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// The store the quest state is written to.
#[derive(Resource)]
pub struct SaveStore(pub Box<dyn KeyValueStore>);

impl SaveStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self(Box::new(store))
    }
}

/// One `<key>.ron` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct RonFileStore {
    dir: PathBuf,
}

impl RonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.ron"))
    }
}

impl KeyValueStore for RonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Writes next to the target first and renames over it, so a crash mid-write
    /// leaves the previous value in place.
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let io_err = |source: std::io::Error| PersistenceError::Write {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("ron.tmp");

        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;

        trace!(%key, path = %path.display(), "key written");
        Ok(())
    }
}

/// Keeps everything in memory. Used by tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("save_load_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = scratch_dir("round_trip");
        let mut store = RonFileStore::new(&dir);

        assert!(store.read("walletBalance").unwrap().is_none());

        store.write("walletBalance", "(resources: {})").unwrap();
        store.write("walletBalance", "(resources: {\"coin\": 5})").unwrap();

        assert_eq!(
            store.read("walletBalance").unwrap().as_deref(),
            Some("(resources: {\"coin\": 5})")
        );
        assert!(!dir.join("walletBalance.ron.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
