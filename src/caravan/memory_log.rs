//! Persistent, hash-chained user memory.
//!
//! [`MemoryLog`] is an append-only log of things an agent should remember
//! about a user across sessions: stated facts, preferences, and free-form
//! notes. Each [`MemoryEntry`] is SHA-256 hash-chained to the previous entry
//! so post-hoc tampering with earlier lines is detectable.
//!
//! Entries are persisted as newline-delimited JSON (`.jsonl`) — one entry per
//! line, append-only, one file per user id. Reopening the log loads every
//! previously persisted entry, which is what gives agents long-term memory:
//! [`MemoryLog::recall_prompt`] renders the stored entries into a bootstrap
//! system message and [`Agent::resume_from_memory`](crate::Agent::resume_from_memory)
//! starts an agent with that context already in place.
//!
//! # Disk Format
//!
//! ```text
//! {"index":0,"timestamp":"2026-03-01T12:00:00Z","user_id":"demo_user","kind":"Preference","content":"Prefers beach destinations","prev_hash":"","hash":"abc1..."}
//! {"index":1,"timestamp":"2026-03-01T12:01:00Z","user_id":"demo_user","kind":"Fact","content":"Travels from London","prev_hash":"abc1...","hash":"def2..."}
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::memory_log::{MemoryKind, MemoryLog};
//! use std::path::Path;
//!
//! # fn main() -> std::io::Result<()> {
//! let mut log = MemoryLog::open(Path::new("memory"), "demo_user")?;
//! log.append(MemoryKind::Preference, "Prefers beach destinations")?;
//! log.append(MemoryKind::Fact, "Budget is usually around £2000")?;
//!
//! assert!(log.verify_integrity());
//! println!("{}", log.recall_prompt());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Classification of a memory entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemoryKind {
    /// Something factual about the user (home city, travel dates).
    Fact,
    /// A stated preference (beach over desert, budget airlines are fine).
    Preference,
    /// Free-form note worth carrying forward.
    Note,
    /// A condensed summary of a past session.
    SessionSummary,
}

/// A single entry in a [`MemoryLog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Zero-based position in the log.
    pub index: u64,
    /// When this entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Which user this memory belongs to.
    pub user_id: String,
    /// Classification of the entry.
    pub kind: MemoryKind,
    /// Free-form content of the memory.
    pub content: String,
    /// SHA-256 hex digest of the previous entry (empty string for the first).
    pub prev_hash: String,
    /// SHA-256 hex digest of this entry's canonical representation.
    pub hash: String,
}

/// Append-only, SHA-256 hash-chained, disk-persisted log of user memories.
///
/// A `MemoryLog` owns an in-memory `Vec<MemoryEntry>` mirrored to a `.jsonl`
/// file on disk. New entries are appended one JSON line at a time, and the
/// hash chain makes any modification of earlier entries detectable via
/// [`MemoryLog::verify_integrity`].
pub struct MemoryLog {
    entries: Vec<MemoryEntry>,
    user_id: String,
    file_path: PathBuf,
}

impl MemoryLog {
    /// Open an existing log for `user_id` or create a new one.
    ///
    /// The file lives at `<memory_dir>/<user_id>.jsonl`. If it already
    /// exists, all previously persisted entries are loaded back into memory
    /// and the hash chain is ready for further appending.
    pub fn open(memory_dir: &Path, user_id: &str) -> io::Result<Self> {
        fs::create_dir_all(memory_dir)?;

        let file_path = memory_dir.join(format!("{}.jsonl", user_id));

        let entries = if file_path.exists() {
            let file = fs::File::open(&file_path)?;
            let reader = BufReader::new(file);
            let mut entries = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let entry: MemoryEntry = serde_json::from_str(&line).map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Failed to parse memory entry: {}", e),
                    )
                })?;
                entries.push(entry);
            }
            entries
        } else {
            Vec::new()
        };

        Ok(Self {
            entries,
            user_id: user_id.to_string(),
            file_path,
        })
    }

    /// Append a new memory and persist it.
    pub fn append(&mut self, kind: MemoryKind, content: &str) -> io::Result<()> {
        let index = self.entries.len() as u64;
        let prev_hash = self
            .entries
            .last()
            .map(|e| e.hash.clone())
            .unwrap_or_default();

        let mut entry = MemoryEntry {
            index,
            timestamp: Utc::now(),
            user_id: self.user_id.clone(),
            kind,
            content: content.to_string(),
            prev_hash,
            hash: String::new(),
        };
        entry.hash = entry_hash(&entry);

        let mut line = serde_json::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        self.entries.push(entry);
        Ok(())
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// The user this log belongs to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Where this log is persisted.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Walk the hash chain and verify every link.
    ///
    /// Returns `false` if any entry's hash does not match its recomputed
    /// canonical hash or does not chain to its predecessor.
    pub fn verify_integrity(&self) -> bool {
        let mut expected_prev = String::new();
        for entry in &self.entries {
            if entry.prev_hash != expected_prev {
                return false;
            }
            if entry_hash(entry) != entry.hash {
                return false;
            }
            expected_prev = entry.hash.clone();
        }
        true
    }

    /// Render the stored memories into a bootstrap system message.
    ///
    /// Returns an empty string when the log has no entries.
    pub fn recall_prompt(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut prompt = format!(
            "Known information about user '{}' from previous sessions:\n",
            self.user_id
        );
        for entry in &self.entries {
            let kind = match entry.kind {
                MemoryKind::Fact => "fact",
                MemoryKind::Preference => "preference",
                MemoryKind::Note => "note",
                MemoryKind::SessionSummary => "session summary",
            };
            prompt.push_str(&format!("- ({}) {}\n", kind, entry.content));
        }
        prompt.push_str("Use this context when it is relevant; do not recite it unprompted.");
        prompt
    }
}

/// Compute the canonical SHA-256 hex digest of an entry.
///
/// The hash covers everything except the `hash` field itself.
fn entry_hash(entry: &MemoryEntry) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry.index.to_le_bytes());
    hasher.update(entry.timestamp.to_rfc3339().as_bytes());
    hasher.update(entry.user_id.as_bytes());
    hasher.update(format!("{:?}", entry.kind).as_bytes());
    hasher.update(entry.content.as_bytes());
    hasher.update(entry.prev_hash.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_changes_with_content() {
        let base = MemoryEntry {
            index: 0,
            timestamp: Utc::now(),
            user_id: "u".to_string(),
            kind: MemoryKind::Fact,
            content: "a".to_string(),
            prev_hash: String::new(),
            hash: String::new(),
        };
        let mut changed = base.clone();
        changed.content = "b".to_string();

        assert_ne!(entry_hash(&base), entry_hash(&changed));
    }
}
