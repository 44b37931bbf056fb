// Configuration store
// Loads and saves the single configuration document. Each `update` is one load-mutate-save
// cycle held under the store's write lock, so handlers writing different groups never drop
// each other's changes. Two writers to the same group still race (last save wins).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
#[cfg(test)]
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::BotError;
use crate::models::config_document::ConfigDocument;

/// Raw document storage
pub trait DocumentBackend: Send + Sync {
    /// Stored text, or `None` when nothing has been saved yet
    fn read(&self) -> Result<Option<String>, BotError>;
    fn write(&self, contents: &str) -> Result<(), BotError>;
}

/// Pretty-printed JSON file on disk
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<String>, BotError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), BotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash mid-write never leaves half a document.
        // Every write gets its own temp file.
        static WRITES: AtomicU64 = AtomicU64::new(0);
        let n = WRITES.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("json.{}.{}.tmp", std::process::id(), n));
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process backend, used by tests
#[cfg(test)]
#[derive(Default, Clone)]
pub struct MemoryBackend {
    contents: Arc<Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryBackend {
    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.to_string()))),
        }
    }
}

#[cfg(test)]
impl DocumentBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, BotError> {
        Ok(self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn write(&self, contents: &str) -> Result<(), BotError> {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}

pub struct ConfigStore {
    backend: Box<dyn DocumentBackend>,
    // Held across a whole load-mutate-save cycle and around plain saves
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(backend: impl DocumentBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let backend = JsonFileBackend::new(path);
        info!("Using configuration document at {}", backend.path().display());
        Self::new(backend)
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// Strict read: a malformed document is reported as `CorruptConfig`
    pub fn try_load(&self) -> Result<ConfigDocument, BotError> {
        match self.backend.read()? {
            None => Ok(ConfigDocument::default()),
            Some(content) if content.trim().is_empty() => Ok(ConfigDocument::default()),
            Some(content) => serde_json::from_str(&content).map_err(BotError::CorruptConfig),
        }
    }

    /// Never fails: an absent, unreadable or corrupt document loads as empty
    pub fn load(&self) -> ConfigDocument {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Falling back to an empty configuration: {}", e);
                ConfigDocument::default()
            }
        }
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_document(&self, doc: &ConfigDocument) -> Result<(), BotError> {
        let json = serde_json::to_string_pretty(doc)?;
        self.backend.write(&json)?;
        debug!("Saved configuration document");
        Ok(())
    }

    /// Overwrite the whole document
    pub fn save(&self, doc: &ConfigDocument) -> Result<(), BotError> {
        let _write = self.lock_writes();
        self.write_document(doc)
    }

    /// One atomic load-mutate-save cycle; returns the document as saved
    pub fn update<F>(&self, mutate: F) -> Result<ConfigDocument, BotError>
    where
        F: FnOnce(&mut ConfigDocument),
    {
        let _write = self.lock_writes();
        let mut doc = self.load();
        mutate(&mut doc);
        self.write_document(&doc)?;
        Ok(doc)
    }
}
