//! Mapping types and providers.
//!
//! A [`MappingSnapshot`] holds one [`MappingSpec`] per source and is never
//! mutated after it is built. Providers hand out `Arc` snapshots; a caller
//! takes one per batch and keeps it for the whole batch, so a reload that
//! lands mid-request cannot mix two mapping versions in one result.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;

use crate::descriptor::FieldDescriptor;
use crate::error::MappingError;

const DEFAULT_MAPPINGS: &str = include_str!("defaults/mappings.json");

// ---------------------------------------------------------------------------
// MappingSpec
// ---------------------------------------------------------------------------

/// What to do with an item whose memory field does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPolicy {
    /// Reject the item with "Missing memory_gb field".
    #[default]
    Required,
    /// Accept the item with `memory_gb: null`.
    Optional,
}

/// One source's mapping from canonical fields to descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingSpec {
    #[serde(default)]
    pub os: FieldDescriptor,
    #[serde(default)]
    pub cpu: FieldDescriptor,
    #[serde(default)]
    pub memory_gb: FieldDescriptor,
    #[serde(default)]
    pub memory_policy: MemoryPolicy,
}

impl MappingSpec {
    pub fn new(os: FieldDescriptor, cpu: FieldDescriptor, memory_gb: FieldDescriptor) -> Self {
        Self {
            os,
            cpu,
            memory_gb,
            memory_policy: MemoryPolicy::default(),
        }
    }

    pub fn with_memory_policy(mut self, policy: MemoryPolicy) -> Self {
        self.memory_policy = policy;
        self
    }
}

// ---------------------------------------------------------------------------
// MappingSnapshot
// ---------------------------------------------------------------------------

/// Immutable source-id → [`MappingSpec`] table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct MappingSnapshot {
    sources: BTreeMap<String, MappingSpec>,
}

impl MappingSnapshot {
    /// Parse a mapping file's contents. Every descriptor is validated here.
    pub fn from_json_str(src: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, MappingError> {
        let src = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&src)
    }

    /// The built-in mapping for `team_a`, `team_b` and `team_c`.
    pub fn defaults() -> Self {
        Self::from_json_str(DEFAULT_MAPPINGS).expect("built-in default mappings must be valid")
    }

    pub fn get(&self, source: &str) -> Option<&MappingSpec> {
        self.sources.get(source)
    }

    /// Configured source ids, sorted.
    pub fn sources(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, MappingSpec)> for MappingSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, MappingSpec)>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Source of the current mapping snapshot.
pub trait MappingProvider: Send + Sync {
    /// The latest snapshot. Callers keep the returned `Arc` for the duration
    /// of one batch.
    fn snapshot(&self) -> Arc<MappingSnapshot>;
}

/// A provider that always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticMappings {
    snapshot: Arc<MappingSnapshot>,
}

impl StaticMappings {
    pub fn new(snapshot: MappingSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl MappingProvider for StaticMappings {
    fn snapshot(&self) -> Arc<MappingSnapshot> {
        Arc::clone(&self.snapshot)
    }
}

/// A provider backed by a JSON file, reloaded when the file changes on disk.
///
/// A `notify` watcher on the file's directory re-parses the file on every
/// create or modify event and swaps the shared snapshot. [`snapshot`] never
/// touches the filesystem. A reload that fails to parse is logged and
/// skipped, and so is a removed file; the previous snapshot keeps serving.
///
/// [`snapshot`]: MappingProvider::snapshot
pub struct FileMappings {
    path: PathBuf,
    current: Arc<RwLock<Arc<MappingSnapshot>>>,
    _watcher: Mutex<RecommendedWatcher>,
}

impl FileMappings {
    /// Load `path` now and start watching it. Fails if the file is missing or
    /// invalid, or if the watcher cannot be started.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MappingError> {
        let path = path.into();
        let snapshot = MappingSnapshot::from_path(&path)?;
        tracing::info!(path = %path.display(), sources = snapshot.len(), "loaded mappings");
        let current = Arc::new(RwLock::new(Arc::new(snapshot)));

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();

        let handler = {
            let path = path.clone();
            let current = Arc::clone(&current);
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &file_name) => reload(&path, &current),
                Ok(_) => {}
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "mapping watcher error"),
            }
        };
        let mut watcher = notify::recommended_watcher(handler)?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path,
            current,
            _watcher: Mutex::new(watcher),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingProvider for FileMappings {
    fn snapshot(&self) -> Arc<MappingSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl std::fmt::Debug for FileMappings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileMappings")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Whether `event` creates or modifies the watched file.
fn touches(event: &Event, file_name: &OsStr) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}

/// Re-parse `path` outside the lock, then swap it in.
fn reload(path: &Path, current: &RwLock<Arc<MappingSnapshot>>) {
    match MappingSnapshot::from_path(path) {
        Ok(snapshot) => {
            tracing::info!(path = %path.display(), sources = snapshot.len(), "reloaded mappings");
            *current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "mapping reload failed; keeping previous mappings"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
