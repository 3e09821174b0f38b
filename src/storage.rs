use std::{
    collections::HashMap,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;

const APP_DIR_NAME: &str = "Unscramble";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Named blob storage backing the preference store.
pub trait FileStorage: Send + Sync {
    /// Returns `Ok(None)` when nothing has been saved under `name` yet.
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Stores files under a base directory, replacing them atomically.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Per-OS application data directory.
    pub fn default_base_dir() -> PathBuf {
        base_dir_from_env(|key| std::env::var_os(key))
    }

    pub fn default_dir() -> Self {
        Self::new(Self::default_base_dir())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }
}

impl FileStorage for LocalFileStorage {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Resolves the application data directory from the variables `var` returns.
fn base_dir_from_env<F>(var: F) -> PathBuf
where
    F: Fn(&str) -> Option<OsString>,
{
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        if let Some(xdg) = var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Some(home) = var("HOME") {
            return PathBuf::from(home).join(".local/share").join(APP_DIR_NAME);
        }
    }
    #[cfg(target_os = "windows")]
    {
        if let Some(local) = var("LOCALAPPDATA") {
            return PathBuf::from(local).join(APP_DIR_NAME);
        }
        if let Some(roam) = var("APPDATA") {
            return PathBuf::from(roam).join(APP_DIR_NAME);
        }
    }
    #[cfg(not(any(
        target_os = "macos",
        target_os = "linux",
        target_os = "android",
        target_os = "windows"
    )))]
    let _ = &var;
    PathBuf::from(".").join(APP_DIR_NAME)
}

/// Keeps blobs in memory. Used on wasm and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileStorage for MemoryStorage {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let files = self.files.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(files.get(name).cloned())
    }

    fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut files = self.files.lock().map_err(|_| StorageError::Poisoned)?;
        files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
