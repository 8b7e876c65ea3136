//! Key-value persistence boundary and its adapters.
//!
//! The core stores opaque JSON blobs under fixed keys. Adapters return
//! `anyhow::Error`; the core logs store failures and carries on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::{mpsc, oneshot};

use crate::utilities::file_handler::FileHandler;

/// Blob store consumed by the core.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Load the blob stored under `key`, or `None` if there is none.
    fn load(&self, key: &str) -> Result<Option<String>, anyhow::Error>;

    /// Store `blob` under `key`, replacing any previous value.
    fn save(&self, key: &str, blob: &str) -> Result<(), anyhow::Error>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local store. Clones share the same map, so a test can hand one
/// handle to a core and inspect or reuse it through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, blob: impl Into<String>) {
        self.entries.lock().insert(key.into(), blob.into());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), anyhow::Error> {
        self.insert(key, blob);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    handler: FileHandler,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            handler: FileHandler::new(directory),
        }
    }

    fn filename(key: &str) -> String {
        format!("{}.json", key)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        Ok(self.handler.load_text(&Self::filename(key))?)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), anyhow::Error> {
        let path = self.handler.save_text(&Self::filename(key), blob)?;
        log::debug!("FileStore::save: key={}, path={}", key, path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// Single-table SQLite store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file, `:memory:` for an in-memory database.
    pub db_path: String,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open SQLite database at '{}': {}", path.display(), e))?;
        Self::with_connection(path.display().to_string(), conn)
    }

    pub fn in_memory() -> Result<Self, anyhow::Error> {
        Self::with_connection(":memory:".to_string(), Connection::open_in_memory()?)
    }

    fn with_connection(db_path: String, conn: Connection) -> Result<Self, anyhow::Error> {
        let store = Self {
            db_path,
            conn: Mutex::new(conn),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<(), anyhow::Error> {
        let conn = self.conn.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let conn = self.conn.lock();
        let value: Option<String> = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), anyhow::Error> {
        let conn = self.conn.lock();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, blob, now],
        )?;
        log::debug!("SqliteStore::save: key={}", key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Write-behind
// ---------------------------------------------------------------------------

enum WriteOp {
    Save { key: String, blob: String },
    Sync(oneshot::Sender<()>),
}

/// Moves writes off the caller's path onto a background tokio task.
///
/// Unflushed writes are kept in an overlay so `load` always sees the latest
/// value saved through this handle.
#[derive(Debug, Clone)]
pub struct WriteBehindStore {
    inner: Arc<dyn KeyValueStore>,
    overlay: Arc<Mutex<HashMap<String, String>>>,
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl std::fmt::Debug for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOp::Save { key, .. } => write!(f, "Save({})", key),
            WriteOp::Sync(_) => f.write_str("Sync"),
        }
    }
}

impl WriteBehindStore {
    /// Wrap `inner` and start the writer task. Must be called inside a tokio
    /// runtime.
    pub fn spawn(inner: Arc<dyn KeyValueStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteOp>();
        let overlay: Arc<Mutex<HashMap<String, String>>> = Arc::default();

        let writer = inner.clone();
        let pending = overlay.clone();
        tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                match op {
                    WriteOp::Save { key, blob } => {
                        let store = writer.clone();
                        let (k, b) = (key.clone(), blob.clone());
                        match tokio::task::spawn_blocking(move || store.save(&k, &b)).await {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => log::warn!("Write-behind save failed for '{}': {}", key, e),
                            Err(e) => log::warn!("Write-behind task for '{}' panicked: {}", key, e),
                        }
                        let mut overlay = pending.lock();
                        if overlay.get(&key) == Some(&blob) {
                            overlay.remove(&key);
                        }
                    }
                    WriteOp::Sync(done) => {
                        let _ = done.send(());
                    }
                }
            }
            log::debug!("Write-behind writer stopped");
        });

        Self { inner, overlay, tx }
    }

    /// Wait until every write queued before this call reached the inner store.
    pub async fn sync(&self) -> Result<(), anyhow::Error> {
        let (done, wait) = oneshot::channel();
        self.tx
            .send(WriteOp::Sync(done))
            .map_err(|_| anyhow::anyhow!("write-behind writer has stopped"))?;
        wait.await
            .map_err(|_| anyhow::anyhow!("write-behind writer dropped the sync request"))
    }

    /// Writes accepted but not yet flushed.
    pub fn pending_writes(&self) -> usize {
        self.overlay.lock().len()
    }
}

impl KeyValueStore for WriteBehindStore {
    fn load(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        if let Some(blob) = self.overlay.lock().get(key) {
            return Ok(Some(blob.clone()));
        }
        self.inner.load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), anyhow::Error> {
        self.overlay.lock().insert(key.to_string(), blob.to_string());
        self.tx
            .send(WriteOp::Save {
                key: key.to_string(),
                blob: blob.to_string(),
            })
            .map_err(|_| anyhow::anyhow!("write-behind writer has stopped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.load("agent_core.mode").unwrap(), None);
        store.save("agent_core.mode", "\"captain\"").unwrap();
        store.save("agent_core.mode", "\"phantom\"").unwrap();
        assert_eq!(store.load("agent_core.mode").unwrap().as_deref(), Some("\"phantom\""));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        exercise(&store);
        let shared = store.clone();
        assert_eq!(shared.keys(), vec!["agent_core.mode".to_string()]);
    }

    #[test]
    fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        exercise(&store);
        assert!(dir.path().join("agent_core.mode.json").exists());
    }

    #[test]
    fn test_sqlite_store_persists_across_connections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("agent.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            exercise(&store);
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.load("agent_core.mode").unwrap().as_deref(), Some("\"phantom\""));
    }

    #[test]
    fn test_sqlite_in_memory() {
        let store = SqliteStore::in_memory().unwrap();
        exercise(&store);
    }

    #[tokio::test]
    async fn test_write_behind_reaches_inner_store() {
        let inner = MemoryStore::new();
        let store = WriteBehindStore::spawn(Arc::new(inner.clone()));

        store.save("agent_core.theme", "{\"darkMode\":true}").unwrap();
        assert_eq!(store.load("agent_core.theme").unwrap().as_deref(), Some("{\"darkMode\":true}"));

        store.sync().await.unwrap();
        assert_eq!(inner.get("agent_core.theme").as_deref(), Some("{\"darkMode\":true}"));
        assert_eq!(store.pending_writes(), 0);
    }
}
