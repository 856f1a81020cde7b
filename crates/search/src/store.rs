//! History persistence
//!
//! A `HistoryStore` saves and loads `HistorySnapshot`s by namespace. The
//! engine treats persistence as best effort: failures are logged and the
//! in-memory history keeps working.

use parking_lot::Mutex;
use sift_core::{Error, HistorySnapshot, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Storage surface for query history
pub trait HistoryStore: Send + Sync {
    /// Load the snapshot saved under `namespace`, if any
    fn load(&self, namespace: &str) -> Result<Option<HistorySnapshot>>;

    /// Save a snapshot under `namespace`, replacing any previous one
    fn save(&self, namespace: &str, snapshot: &HistorySnapshot) -> Result<()>;
}

// ============================================================================
// MemoryHistoryStore
// ============================================================================

/// In-process store holding serialized snapshots
///
/// Snapshots are stored as JSON so a round trip exercises the same encoding
/// as the file store.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryHistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON saved under `namespace`
    pub fn raw(&self, namespace: &str) -> Option<String> {
        self.data.lock().get(namespace).cloned()
    }

    /// Overwrite the raw JSON under `namespace`
    pub fn set_raw(&self, namespace: &str, json: impl Into<String>) {
        self.data.lock().insert(namespace.to_string(), json.into());
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self, namespace: &str) -> Result<Option<HistorySnapshot>> {
        match self.data.lock().get(namespace) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: &str, snapshot: &HistorySnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.data.lock().insert(namespace.to_string(), json);
        Ok(())
    }
}

// ============================================================================
// FileHistoryStore
// ============================================================================

/// One `<namespace>.json` file per namespace inside a directory
///
/// Writes go to a temp file which is synced and then renamed over the
/// target, so a crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(FileHistoryStore { dir })
    }

    /// Directory holding the snapshot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `namespace`
    pub fn path_for(&self, namespace: &str) -> Result<PathBuf> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Persistence(format!(
                "invalid history namespace {:?}",
                namespace
            )));
        }
        Ok(self.dir.join(format!("{}.json", namespace)))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self, namespace: &str) -> Result<Option<HistorySnapshot>> {
        let path = self.path_for(namespace)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, namespace: &str, snapshot: &HistorySnapshot) -> Result<()> {
        let path = self.path_for(namespace)?;
        let payload = serde_json::to_vec(snapshot)?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
