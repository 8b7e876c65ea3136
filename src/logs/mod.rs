//! Append-only log ledger.
//!
//! Every state change in the core is echoed here. Entries are immutable once
//! appended and keep insertion order; the only removals are [`LogLedger::clear`]
//! and [`LogLedger::archive`], which act on the whole ledger.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utilities::file_handler::FileHandler;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    Info,
    Success,
    Warning,
    Error,
}

/// Which part of the session produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    /// Text typed by the human.
    User,
    /// The agent speaking in conversation.
    Agent,
    System,
    ModeSwitcher,
    Skills,
    Journey,
    Health,
    Actions,
}

impl LogSource {
    /// Conversational sources feed the "activity" view; everything else is "system".
    pub fn is_conversational(&self) -> bool {
        matches!(self, LogSource::User | LogSource::Agent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::User => "user",
            LogSource::Agent => "agent",
            LogSource::System => "system",
            LogSource::ModeSwitcher => "mode_switcher",
            LogSource::Skills => "skills",
            LogSource::Journey => "journey",
            LogSource::Health => "health",
            LogSource::Actions => "actions",
        }
    }
}

/// One journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: LogSource,
    pub message: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
}

impl LogEntry {
    fn new(message: impl Into<String>, log_type: LogType, source: LogSource) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            source,
            message: message.into(),
            log_type,
        }
    }
}

/// The session's event journal plus its archive.
#[derive(Debug, Clone, Default)]
pub struct LogLedger {
    entries: Vec<LogEntry>,
    archive: Vec<LogEntry>,
}

impl LogLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return it.
    pub fn add(&mut self, message: impl Into<String>, log_type: LogType, source: LogSource) -> &LogEntry {
        let entry = LogEntry::new(message, log_type, source);
        log::debug!("[{}] {:?}: {}", source.as_str(), log_type, entry.message);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// All current entries in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries moved out by [`archive`](Self::archive), oldest first.
    pub fn archived(&self) -> &[LogEntry] {
        &self.archive
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Activity view: entries from conversational sources.
    pub fn conversational(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.source.is_conversational())
    }

    /// System view: everything that is not conversational.
    pub fn system(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| !e.source.is_conversational())
    }

    /// Error view.
    pub fn errors(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.log_type == LogType::Error)
    }

    /// Drop every current entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Move every current entry to the archive. Returns how many moved.
    pub fn archive(&mut self) -> usize {
        let moved = self.entries.len();
        self.archive.append(&mut self.entries);
        moved
    }

    /// The current ledger as a JSON array of entries.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Write the current ledger to `agent-logs-<timestamp>.json` inside `dir`.
    pub fn export(&self, dir: &Path) -> io::Result<PathBuf> {
        let filename = format!("agent-logs-{}.json", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
        FileHandler::new(dir).save_json(&filename, &self.entries)
    }
}
