//! Test builders — ergonomic constructors for mappings, items, and records.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use machinv_core::{CanonicalRecord, FieldDescriptor, MappingSnapshot, MappingSpec, MemoryPolicy};

// ---------------------------------------------------------------------------
// MappingBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`MappingSpec`] fixtures.
///
/// # Example
///
/// ```rust
/// let mapping = MappingBuilder::new()
///     .os(FieldDescriptor::candidates(["OSName", "os_name"]))
///     .cpu(FieldDescriptor::direct("processor"))
///     .memory_json(serde_json::json!("kib-to-gib"))
///     .build();
/// ```
#[derive(Default)]
pub struct MappingBuilder {
    spec: MappingSpec,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn os(mut self, descriptor: FieldDescriptor) -> Self {
        self.spec.os = descriptor;
        self
    }

    pub fn cpu(mut self, descriptor: FieldDescriptor) -> Self {
        self.spec.cpu = descriptor;
        self
    }

    pub fn memory(mut self, descriptor: FieldDescriptor) -> Self {
        self.spec.memory_gb = descriptor;
        self
    }

    /// Memory descriptor in its mapping-file JSON form.
    pub fn memory_json(self, raw: serde_json::Value) -> Self {
        let descriptor = FieldDescriptor::from_value(&raw).expect("test descriptor must be valid");
        self.memory(descriptor)
    }

    pub fn optional_memory(mut self) -> Self {
        self.spec.memory_policy = MemoryPolicy::Optional;
        self
    }

    pub fn build(self) -> MappingSpec {
        self.spec
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// One source's mapping from the built-in defaults.
pub fn default_mapping(source: &str) -> MappingSpec {
    MappingSnapshot::defaults()
        .get(source)
        .cloned()
        .unwrap_or_else(|| panic!("no built-in mapping for {source:?}"))
}

pub fn team_a() -> MappingSpec {
    default_mapping("team_a")
}

pub fn team_b() -> MappingSpec {
    default_mapping("team_b")
}

pub fn team_c() -> MappingSpec {
    default_mapping("team_c")
}

pub fn record(os: &str, cpu: &str, memory_gb: Option<f64>) -> CanonicalRecord {
    CanonicalRecord::new(os, cpu, memory_gb)
}

/// Split a `json!([...])` literal into batch items.
pub fn items(batch: serde_json::Value) -> Vec<serde_json::Value> {
    match batch {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    }
}
