//! Studied-item tracking and its on-disk store.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::ItemId;
use crate::error::PersistenceError;

/// `round(part / whole * 100)`, or 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudiedSet(BTreeSet<ItemId>);

impl StudiedSet {
    pub fn contains(&self, id: &ItemId) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: ItemId) -> bool {
        self.0.insert(id)
    }

    /// Flips membership and returns whether `id` is now studied.
    pub fn toggle(&mut self, id: &ItemId) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.0.iter()
    }
}

impl FromIterator<ItemId> for StudiedSet {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total: usize,
    pub studied: usize,
    pub percent: u32,
}

impl ProgressSummary {
    pub fn new(total: usize, studied: usize) -> Self {
        Self {
            total,
            studied,
            percent: percent(studied, total),
        }
    }
}

/// Durable home of the studied set.
///
/// Loading never fails: a missing or unreadable store yields an empty set.
/// Saving may fail; callers keep their in-memory set either way.
pub trait ProgressStore {
    fn load_studied(&self) -> StudiedSet;
    fn save_studied(&mut self, studied: &StudiedSet) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ProgressFile {
    #[serde(default)]
    studied: Vec<ItemId>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<ProgressFile, PersistenceError> {
        let s = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&s)?)
    }
}

impl ProgressStore for JsonProgressStore {
    fn load_studied(&self) -> StudiedSet {
        if !self.path.exists() {
            debug!("no progress file at {}, starting fresh", self.path.display());
            return StudiedSet::default();
        }
        match self.read() {
            Ok(file) => file.studied.into_iter().collect(),
            Err(e) => {
                warn!(
                    "ignoring unreadable progress file {}: {}",
                    self.path.display(),
                    e
                );
                StudiedSet::default()
            }
        }
    }

    fn save_studied(&mut self, studied: &StudiedSet) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = ProgressFile {
            studied: studied.iter().cloned().collect(),
            updated_at: Some(Utc::now().to_rfc3339()),
        };
        let s = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, s)?;
        Ok(())
    }
}

/// In-memory store. Counts saves and can be told to fail them.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    saved: StudiedSet,
    saves: usize,
    fail_saves: bool,
}

impl MemoryProgressStore {
    pub fn new(initial: StudiedSet) -> Self {
        Self {
            saved: initial,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> &StudiedSet {
        &self.saved
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load_studied(&self) -> StudiedSet {
        self.saved.clone()
    }

    fn save_studied(&mut self, studied: &StudiedSet) -> Result<(), PersistenceError> {
        self.saves += 1;
        if self.fail_saves {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        self.saved = studied.clone();
        Ok(())
    }
}
