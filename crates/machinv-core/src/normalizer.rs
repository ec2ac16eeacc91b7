//! RecordNormalizer — turns a batch of raw items into canonical records.
//!
//! Each item is resolved field by field (cpu, then memory_gb, then os)
//! against one [`MappingSpec`] and either accepted whole or rejected whole.
//! A rejection never stops the batch: the failure is recorded against the
//! item's 0-based index and processing moves on, so every input item appears
//! exactly once in the [`NormalizationResult`].
//!
//! Normalization is pure. The caller passes the mapping snapshot it wants
//! used, and two runs over the same batch and mapping give the same result.

use serde_json::Value;

use crate::error::{ItemError, ItemFailure, PayloadError, ResolutionError, ValidationError};
use crate::mapping::{MappingSpec, MemoryPolicy};
use crate::resolver::{as_number, resolve};
use crate::types::{CanonicalField, CanonicalRecord};

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// The items of one submission, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    items: Vec<Value>,
}

impl Batch {
    /// Split a parsed payload into items. A single object is a batch of one;
    /// an array is a batch of its elements, whatever their shape. Anything
    /// else is refused before normalization starts.
    pub fn from_payload(payload: Value) -> Result<Self, PayloadError> {
        let items = match payload {
            Value::Object(obj) if obj.is_empty() => return Err(PayloadError::Empty),
            Value::Object(obj) => vec![Value::Object(obj)],
            Value::Array(items) if items.is_empty() => return Err(PayloadError::Empty),
            Value::Array(items) => items,
            Value::Null => return Err(PayloadError::Empty),
            _ => return Err(PayloadError::NotObjectOrArray),
        };
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// NormalizationResult
// ---------------------------------------------------------------------------

/// Outcome of one [`normalize`] call: accepted records in input order, and
/// one error per rejected item in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationResult {
    pub accepted: Vec<CanonicalRecord>,
    pub errors: Vec<ItemError>,
}

impl NormalizationResult {
    /// Number of items covered (accepted + rejected).
    pub fn len(&self) -> usize {
        self.accepted.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no item was rejected.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Rendered error strings, as surfaced to submitters.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// RecordNormalizer
// ---------------------------------------------------------------------------

/// Normalize `items` with `mapping`. Shorthand for
/// `RecordNormalizer::new(mapping).normalize(items)`.
pub fn normalize(items: &[Value], mapping: &MappingSpec) -> NormalizationResult {
    RecordNormalizer::new(mapping).normalize(items)
}

/// Applies one source's mapping to raw items.
#[derive(Debug, Clone, Copy)]
pub struct RecordNormalizer<'a> {
    mapping: &'a MappingSpec,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(mapping: &'a MappingSpec) -> Self {
        Self { mapping }
    }

    pub fn normalize(&self, items: &[Value]) -> NormalizationResult {
        let mut result = NormalizationResult::default();

        for (index, item) in items.iter().enumerate() {
            match self.normalize_item(item) {
                Ok(record) => result.accepted.push(record),
                Err(failure) => {
                    tracing::debug!(index, error = %failure, "rejected inventory item");
                    result.errors.push(ItemError::new(index, failure));
                }
            }
        }

        tracing::debug!(
            accepted = result.accepted.len(),
            rejected = result.errors.len(),
            "normalized batch"
        );
        result
    }

    /// Normalize one item. The record is only built once every field has
    /// resolved and validated.
    pub fn normalize_item(&self, item: &Value) -> Result<CanonicalRecord, ItemFailure> {
        let item = item.as_object().ok_or(ItemFailure::NotAnObject)?;

        let cpu = match resolve(item, &self.mapping.cpu)? {
            Some(value) => text(CanonicalField::Cpu, value)?,
            None => String::new(),
        };

        let memory_gb = match resolve(item, &self.mapping.memory_gb)? {
            None | Some(Value::Null) => match self.mapping.memory_policy {
                MemoryPolicy::Required => return Err(ValidationError::MissingMemory.into()),
                MemoryPolicy::Optional => None,
            },
            Some(value) => Some(memory(&value)?),
        };

        let os = match resolve(item, &self.mapping.os)? {
            Some(value) => text(CanonicalField::Os, value)?,
            None => String::new(),
        };

        if os.is_empty() || cpu.is_empty() {
            return Err(ValidationError::MissingRequiredFields.into());
        }

        Ok(CanonicalRecord { os, cpu, memory_gb })
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Render a resolved value as canonical text. Only `cpu` accepts a list; its
/// parts are joined with `", "` (multi-socket descriptions).
fn text(field: CanonicalField, value: Value) -> Result<String, ResolutionError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(parts) if field == CanonicalField::Cpu => Ok(parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")),
        _ => Err(ResolutionError::NotText(field)),
    }
}

fn memory(value: &Value) -> Result<f64, ValidationError> {
    let gb = as_number(value).ok_or(ValidationError::MemoryNotNumber)?;
    if gb < 0.0 {
        return Err(ValidationError::NegativeMemory);
    }
    Ok(gb)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
