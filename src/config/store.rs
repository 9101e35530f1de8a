use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KulturarvError, Result};

use super::preferences::StoredPreferences;

/// Storage abstraction for persisted preferences.
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredPreferences>>;
    fn save(&self, prefs: &StoredPreferences) -> Result<()>;
}

/// TOML file store, `~/.kulturarv/preferences.toml` by default.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn new_default() -> Self {
        Self::new(default_dir().join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Option<StoredPreferences>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let file: PreferenceFile = toml::from_str(&raw)?;
        Ok(Some(file.preferences))
    }

    fn save(&self, prefs: &StoredPreferences) -> Result<()> {
        Self::ensure_parent(&self.path)?;
        let file = PreferenceFile {
            version: 1,
            saved_at: Utc::now(),
            preferences: prefs.clone(),
        };
        fs::write(&self.path, toml::to_string(&file)?)?;
        // The file holds the access token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

/// In-process store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<StoredPreferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Option<StoredPreferences>>> {
        self.inner
            .lock()
            .map_err(|_| KulturarvError::Io(io::Error::other("preference store lock poisoned")))
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<StoredPreferences>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, prefs: &StoredPreferences) -> Result<()> {
        *self.lock()? = Some(prefs.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreferenceFile {
    version: u32,
    saved_at: DateTime<Utc>,
    preferences: StoredPreferences,
}

fn default_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".kulturarv"))
        .unwrap_or_else(|| PathBuf::from(".kulturarv"))
}
