//! Core types for machinv-core.
//!
//! This module defines the data shapes shared across the engine and the
//! HTTP shell: the free-form [`RawItem`] submitted by a source, and the
//! [`CanonicalRecord`] every source converges to.

use serde::{Deserialize, Serialize};

/// One raw inventory item as submitted by an upstream team.
///
/// Keys are whatever the source chose to send. Insertion order is preserved
/// (`serde_json` is built with `preserve_order`) because case-insensitive
/// lookup returns the first matching key in that order.
pub type RawItem = serde_json::Map<String, serde_json::Value>;

/// A machine record in the canonical schema.
///
/// `os` and `cpu` are never empty once a record has been accepted by the
/// normalizer. `memory_gb` may be `None`, but when present it is finite and
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub os: String,
    pub cpu: String,
    pub memory_gb: Option<f64>,
}

impl CanonicalRecord {
    pub fn new(os: impl Into<String>, cpu: impl Into<String>, memory_gb: Option<f64>) -> Self {
        Self {
            os: os.into(),
            cpu: cpu.into(),
            memory_gb,
        }
    }
}

/// The three canonical field names, in the order the normalizer resolves
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Cpu,
    MemoryGb,
    Os,
}

impl CanonicalField {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Cpu => "cpu",
            CanonicalField::MemoryGb => "memory_gb",
            CanonicalField::Os => "os",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
