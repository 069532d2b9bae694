//! Favorites Persistence
//!
//! The store holds a flat list of asset ids. It is read once at startup and
//! written after every add or remove; there is no schema or versioning.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

/// Key-value persistence for favorite asset ids
pub trait FavoritesStore: Send + Sync {
    /// Read the stored list (empty when nothing was saved yet)
    fn load(&self) -> Result<Vec<String>>;

    /// Replace the stored list
    fn save(&self, ids: &[String]) -> Result<()>;
}

/// JSON array of ids in a file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `FAVORITES_PATH`, defaulting to `favorites.json`
    pub fn from_env() -> Self {
        Self::new(std::env::var("FAVORITES_PATH").unwrap_or_else(|_| "favorites.json".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStore for JsonFileStore {
    fn load(&self) -> Result<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, ids: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(ids)?;

        // Write beside the target, then rename over it.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), count = ids.len(), "Saved favorites");
        Ok(())
    }
}

/// In-memory store (for development and tests)
#[derive(Default)]
pub struct MemoryStore {
    ids: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: Vec<String>) -> Self {
        Self { ids: RwLock::new(ids) }
    }
}

impl FavoritesStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>> {
        let ids = self.ids.read().map_err(|_| MarketError::Store("lock poisoned".into()))?;
        Ok(ids.clone())
    }

    fn save(&self, ids: &[String]) -> Result<()> {
        let mut stored = self.ids.write().map_err(|_| MarketError::Store("lock poisoned".into()))?;
        *stored = ids.to_vec();
        Ok(())
    }
}

/// Ordered, duplicate-free set of favorite ids
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<String>);

impl Favorites {
    pub fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        let mut favorites = Self::default();
        for id in ids {
            favorites.add(id);
        }
        favorites
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|f| f == id)
    }

    /// Returns `false` if the id was already present
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() || self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Returns `false` if the id was not present
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|f| f != id);
        self.0.len() != before
    }

    /// Add when absent, remove when present; returns whether it is now a favorite
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.add(id)
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
