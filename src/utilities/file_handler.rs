//! File handler for reading and writing data files in a directory.
//!
//! Backs the JSON file store and log export.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Reads and writes files inside one directory.
#[derive(Debug, Clone)]
pub struct FileHandler {
    /// Directory for file storage.
    pub directory: PathBuf,
}

impl FileHandler {
    /// Create a new `FileHandler` for the given directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Full path for a file in the handler's directory.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }

    /// Read a file as text. Returns `Ok(None)` if it does not exist.
    pub fn load_text(&self, filename: &str) -> io::Result<Option<String>> {
        let path = self.path_for(filename);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(path).map(Some)
    }

    /// Write text to a file, creating the directory when missing.
    pub fn save_text(&self, filename: &str, content: &str) -> io::Result<PathBuf> {
        ensure_dir(&self.directory)?;
        let path = self.path_for(filename);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Serialize `data` as pretty JSON into a file.
    pub fn save_json<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> io::Result<PathBuf> {
        let content = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
        self.save_text(filename, &content)
    }

    /// Check if a file exists in the handler's directory.
    pub fn exists(&self, filename: &str) -> bool {
        self.path_for(filename).exists()
    }
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new(".")
    }
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
