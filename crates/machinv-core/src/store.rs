//! Store — persistence seam for accepted [`CanonicalRecord`]s.
//!
//! The HTTP shell only talks to [`RecordStore`]: insert one record at a time,
//! query by exact field match, count, aggregate. [`InMemoryStore`] is the
//! bundled implementation; it keeps records in insertion order behind a
//! single lock, which also makes every insert atomic.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::types::CanonicalRecord;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// A persisted record plus ingestion metadata. Only `record` is exposed by
/// `GET /machines`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: u64,
    pub source: String,
    pub ingested_at: DateTime<Utc>,
    pub record: CanonicalRecord,
}

/// Exact-match filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub os: Option<String>,
    pub cpu: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        self.os.as_deref().map_or(true, |os| record.os == os)
            && self.cpu.as_deref().map_or(true, |cpu| record.cpu == cpu)
    }
}

/// Offset/limit window over the filtered records, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate view served by `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_records: usize,
    pub os_distribution: BTreeMap<String, usize>,
    pub cpu_distribution: BTreeMap<String, usize>,
    pub memory_stats: MemoryStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MemoryStats {
    Summary {
        average_gb: f64,
        minimum_gb: f64,
        maximum_gb: f64,
        count: usize,
    },
    Unavailable {
        message: String,
        count: usize,
    },
}

impl MemoryStats {
    fn unavailable() -> Self {
        MemoryStats::Unavailable {
            message: "No valid memory data available".to_string(),
            count: 0,
        }
    }
}

impl Stats {
    /// Compute stats over any sequence of records.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CanonicalRecord>,
    {
        let mut total_records = 0;
        let mut os_distribution = BTreeMap::new();
        let mut cpu_distribution = BTreeMap::new();
        let mut memory: Vec<f64> = Vec::new();

        for record in records {
            total_records += 1;
            if !record.os.is_empty() {
                *os_distribution.entry(record.os.clone()).or_insert(0) += 1;
            }
            if !record.cpu.is_empty() {
                *cpu_distribution.entry(record.cpu.clone()).or_insert(0) += 1;
            }
            if let Some(gb) = record.memory_gb.filter(|gb| gb.is_finite()) {
                memory.push(gb);
            }
        }

        let memory_stats = if memory.is_empty() {
            MemoryStats::unavailable()
        } else {
            let sum: f64 = memory.iter().sum();
            let average = sum / memory.len() as f64;
            MemoryStats::Summary {
                average_gb: (average * 100.0).round() / 100.0,
                minimum_gb: memory.iter().copied().fold(f64::INFINITY, f64::min),
                maximum_gb: memory.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                count: memory.len(),
            }
        };

        Self {
            total_records,
            os_distribution,
            cpu_distribution,
            memory_stats,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Key-value record store with query-by-field and aggregate capability.
pub trait RecordStore: Send + Sync {
    /// Persist one record; returns its id.
    fn insert(&self, source: &str, record: CanonicalRecord) -> Result<u64, StoreError>;

    fn find(&self, filter: &RecordFilter, page: Page) -> Result<Vec<CanonicalRecord>, StoreError>;

    fn stats(&self) -> Result<Stats, StoreError>;

    /// Distinct sources that have stored at least one record, sorted.
    fn sources(&self) -> Result<Vec<String>, StoreError>;
}

/// In-process [`RecordStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    records: Vec<StoredRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored record with metadata, in insertion order.
    pub fn all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryStore {
    fn insert(&self, source: &str, record: CanonicalRecord) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.push(StoredRecord {
            id,
            source: source.to_string(),
            ingested_at: Utc::now(),
            record,
        });
        Ok(id)
    }

    fn find(&self, filter: &RecordFilter, page: Page) -> Result<Vec<CanonicalRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner
            .records
            .iter()
            .map(|stored| &stored.record)
            .filter(|record| filter.matches(record))
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<Stats, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Stats::from_records(inner.records.iter().map(|s| &s.record)))
    }

    fn sources(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut sources: Vec<String> = inner.records.iter().map(|s| s.source.clone()).collect();
        sources.sort();
        sources.dedup();
        Ok(sources)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
