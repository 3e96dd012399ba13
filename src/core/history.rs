use std::fs;
use std::path::{Path, PathBuf};

use chrono::{serde::ts_seconds, DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub line: String,
}

/// Bounded, append-only record of entered lines. Entries are never edited;
/// the oldest are dropped once `max_entries` is exceeded.
pub struct History {
    file_path: Option<PathBuf>,
    max_entries: usize,
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new(file_path: Option<PathBuf>, max_entries: usize) -> Self {
        Self {
            file_path,
            max_entries,
            entries: Vec::new(),
        }
    }

    /// History that is never written to disk.
    pub fn in_memory(max_entries: usize) -> Self {
        Self::new(None, max_entries)
    }

    pub fn record(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.entries.push(HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            line: line.to_string(),
        });
        self.trim();
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    /// A missing file is an empty history, not an error. An unreadable
    /// file is never overwritten: a corrupt one is moved aside first, and
    /// one that cannot be read at all detaches the history from disk.
    pub fn load(&mut self) -> Result<(), String> {
        let Some(path) = self.file_path.clone().filter(|p| p.exists()) else {
            return Ok(());
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                self.file_path = None;
                return Err(format!(
                    "Failed to read history file: {}; history will not be saved",
                    e
                ));
            }
        };

        self.entries = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                let backup = backup_path(&path);
                if let Err(move_err) = fs::rename(&path, &backup) {
                    self.file_path = None;
                    return Err(format!(
                        "Invalid history format: {}; could not move it aside ({}), history will not be saved",
                        e, move_err
                    ));
                }
                return Err(format!(
                    "Invalid history format: {}; old file kept as {}",
                    e,
                    backup.display()
                ));
            }
        };
        self.trim();

        debug!("loaded {} history entries from {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn save(&self) -> Result<(), String> {
        let path = match &self.file_path {
            Some(path) => path,
            None => return Ok(()),
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create history directory: {}", e))?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize history: {}", e))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .map_err(|e| format!("Failed to write history: {}", e))?;

        fs::rename(&temp_path, path)
            .map_err(|e| format!("Failed to finalize history save: {}", e))?;

        debug!("saved {} history entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.line.as_str())
    }

    pub fn get_last_n(&self, n: usize) -> &[HistoryEntry] {
        let n = n.min(self.entries.len());
        &self.entries[self.entries.len() - n..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}
