//! # Collaborator interfaces
//!
//! The core reaches the outside world through two traits only:
//!
//! ```text
//! AgentCore
//!   ├── KeyValueStore (load / save opaque blobs)
//!   │     ├── MemoryStore
//!   │     ├── FileStore         (one JSON file per key)
//!   │     ├── SqliteStore       (kv_store table)
//!   │     └── WriteBehindStore  (tokio writer in front of any store)
//!   └── Notifier (notify kind, message, title)
//!         ├── LogNotifier
//!         └── RecordingNotifier
//! ```

pub mod notifier;
pub mod store;

use std::sync::Arc;

pub use notifier::{LogNotifier, Notification, NotificationKind, Notifier, RecordingNotifier};
pub use store::{FileStore, KeyValueStore, MemoryStore, SqliteStore, WriteBehindStore};

use crate::utilities::config::{StorageBackend, StorageConfig};

/// Build the store selected by `config`.
///
/// For SQLite, a directory path gets `agent-core.db` appended.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, anyhow::Error> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::new(&config.path)),
        StorageBackend::Sqlite => {
            let path = if config.path.extension().is_some() {
                config.path.clone()
            } else {
                config.path.join("agent-core.db")
            };
            Arc::new(SqliteStore::open(path)?)
        }
    };
    log::info!("Opened {:?} store at {}", config.backend, config.path.display());
    Ok(store)
}
