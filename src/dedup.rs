//! Sent-headline bookkeeping: the persisted dedup store plus the per-cycle
//! evaluated set. Keys are normalized once by the caller via `dedup_key`.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

/// Canonical dedup identity of a headline: whitespace-trimmed, lowercased.
pub fn dedup_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Membership + append over the set of already-dispatched headline keys.
/// `contains` must reflect every prior `add` from any process sharing the
/// backing storage. Append-only: no removal, no expiry.
pub trait DedupStore: Send {
    fn contains(&self, key: &str) -> bool;
    fn add(&mut self, key: &str) -> Result<()>;
}

/// Append-only file store, one normalized headline per line.
/// Single-writer assumed; unbounded growth is an accepted limitation.
pub struct FileDedupStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl FileDedupStore {
    /// Read all previously stored keys. A missing file is an empty store; an
    /// unreadable file degrades to an empty store for this process instead of
    /// aborting.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut seen = HashSet::new();

        match File::open(&path) {
            Ok(f) => {
                for line in BufReader::new(f).lines() {
                    match line {
                        Ok(l) => {
                            let key = dedup_key(&l);
                            if !key.is_empty() {
                                seen.insert(key);
                            }
                        }
                        Err(e) => {
                            warn!(
                                error = %e,
                                path = %path.display(),
                                "sent-store read interrupted; continuing with partial set"
                            );
                            break;
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    error = %e,
                    path = %path.display(),
                    "sent-store unreadable; starting with empty set"
                );
            }
        }

        Self { path, seen }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl DedupStore for FileDedupStore {
    fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Appends one line per new key. The in-memory set is updated even when
    /// the append fails, so the current process still deduplicates; a later
    /// process may then re-send.
    fn add(&mut self, key: &str) -> Result<()> {
        if !self.seen.insert(key.to_string()) {
            return Ok(());
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening sent-store {}", self.path.display()))?;
        writeln!(f, "{key}")
            .with_context(|| format!("appending to sent-store {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs. Same contract, no file.
#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    seen: HashSet<String>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl DedupStore for MemoryDedupStore {
    fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    fn add(&mut self, key: &str) -> Result<()> {
        self.seen.insert(key.to_string());
        Ok(())
    }
}

/// Keys already looked at in the current polling cycle.
/// Created at cycle start, dropped at cycle end.
#[derive(Debug, Default)]
pub struct EvaluatedSet {
    seen: HashSet<String>,
}

impl EvaluatedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Returns `true` if the key was not yet present.
    pub fn insert(&mut self, key: &str) -> bool {
        self.seen.insert(key.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
