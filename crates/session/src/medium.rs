//! Persistent key-value medium behind the credential store.
//!
//! The original product persisted credentials in browser local storage; here
//! the medium is a trait so the store works the same over an application
//! data directory, an in-memory map (tests), or nothing at all (contexts
//! with no persistent storage, where every operation must be a silent
//! no-op rather than an error).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A flat string-to-string medium. Implementations must never panic on I/O
/// trouble: reads degrade to `None`, writes and removals are best-effort.
pub trait StorageMedium: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory medium. Used by tests and by embeddings that want a session for
/// the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: HashMap<String, String>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// File-backed medium: one file per key under a directory.
///
/// Survives process restarts, which is what lets a session outlive an
/// application reload. All failures are logged and swallowed; a session
/// that fails to persist behaves like an absent session on the next read.
#[derive(Debug)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Medium under `{os data dir}/petget`. `None` when the platform has no
    /// resolvable data directory; callers fall back to [`DetachedMedium`].
    pub fn default_location() -> Option<Self> {
        let mut dir = dirs::data_dir().or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })?;
        dir.push("petget");
        Some(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl StorageMedium for FileMedium {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.entry_path(key)).ok()
    }

    fn put(&mut self, key: &str, value: &str) {
        if let Err(err) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!("failed to create credential directory {:?}: {err}", self.dir);
            return;
        }
        if let Err(err) = std::fs::write(self.entry_path(key), value) {
            tracing::warn!("failed to persist credential entry {key}: {err}");
        }
    }

    fn remove(&mut self, key: &str) {
        let path = self.entry_path(key);
        if let Err(err) = std::fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove credential entry {key}: {err}");
            }
        }
    }
}

/// No-op medium for execution contexts without persistent storage (the
/// server-side-rendering analog). Reads are always absent, writes vanish,
/// and nothing ever fails.
#[derive(Debug, Default)]
pub struct DetachedMedium;

impl StorageMedium for DetachedMedium {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn put(&mut self, _key: &str, _value: &str) {}

    fn remove(&mut self, _key: &str) {}
}
