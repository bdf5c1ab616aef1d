use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use parking_lot::RwLock;

use crate::error::TrackerError;

pub const SESSION_FOLDER_ENV_VAR: &str = "TRANSIT_SESSION_FOLDER";

/// Local key-value scope holding form submissions between screens.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError>;
    fn remove(&self, key: &str) -> Result<(), TrackerError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        self.values.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Keeps each key in its own `{key}.json` file inside a folder.
pub struct FileSessionStore {
    folder: PathBuf,
}

impl FileSessionStore {
    pub fn new(folder: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let folder = folder.as_ref();

        if !folder.is_dir() {
            return Err(TrackerError::SessionStorage(format!(
                "Path {} is not a directory",
                folder.display()
            )));
        }

        Ok(FileSessionStore {
            folder: folder.to_path_buf(),
        })
    }

    pub fn from_env() -> Result<Self, TrackerError> {
        let folder = std::env::var(SESSION_FOLDER_ENV_VAR).map_err(|_| {
            TrackerError::SessionStorage(format!("{SESSION_FOLDER_ENV_VAR} is not set"))
        })?;
        Self::new(folder)
    }

    fn path(&self, key: &str) -> Result<PathBuf, TrackerError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(TrackerError::SessionStorage(format!(
                "invalid session key '{key}'"
            )));
        }

        Ok(self.folder.join(format!("{key}.json")))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        let path = self.path(key)?;

        if !path.is_file() {
            return Ok(None);
        }

        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        std::fs::write(self.path(key)?, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
