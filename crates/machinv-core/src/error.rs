//! Error taxonomy for the normalization engine.
//!
//! Only [`DescriptorError`] and [`MappingError`] ever reach a caller as a hard
//! failure, and both happen at configuration-load time. Everything raised
//! while processing a single item is folded into an [`ItemError`] and stored
//! on the batch result.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::CanonicalField;

/// A field descriptor in a mapping file has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid mapping type")]
    InvalidMappingType,

    #[error("unknown transform {0:?}")]
    UnknownTransform(String),

    #[error("transform {0} requires a \"field\" argument")]
    MissingTransformField(&'static str),

    #[error("transform {0} does not take a \"field\" argument")]
    UnexpectedTransformField(&'static str),

    #[error("unsupported expression {0:?}; use a named transform instead")]
    UnsupportedExpression(String),
}

/// A named transform, or a text coercion, could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Failed to parse RAM: {0}")]
    Ram(String),

    #[error("Failed to convert mem to GB: {0}")]
    KibToGib(String),

    #[error("Failed to read numeric field {field:?}: {reason}")]
    DirectNumeric { field: String, reason: String },

    #[error("{0} must be a string")]
    NotText(CanonicalField),
}

/// Resolved values break a canonical-record invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields (os or cpu)")]
    MissingRequiredFields,

    #[error("Missing memory_gb field")]
    MissingMemory,

    #[error("memory_gb must be a number")]
    MemoryNotNumber,

    #[error("memory_gb must not be negative")]
    NegativeMemory,
}

/// Why a single batch item was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemFailure {
    #[error("not a valid JSON object")]
    NotAnObject,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A rejected item, keyed by its 0-based position in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemError {
    pub index: usize,
    pub failure: ItemFailure,
}

impl ItemError {
    pub fn new(index: usize, failure: impl Into<ItemFailure>) -> Self {
        Self {
            index,
            failure: failure.into(),
        }
    }

    /// The cause without the item prefix.
    pub fn message(&self) -> String {
        self.failure.to_string()
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.failure {
            ItemFailure::NotAnObject => {
                write!(f, "Item {} is not a valid JSON object", self.index)
            }
            other => write!(f, "Item {}: {}", self.index, other),
        }
    }
}

/// The submitted payload cannot be split into items at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("No data provided")]
    Empty,

    #[error("Payload must be a JSON object or an array of objects")]
    NotObjectOrArray,
}

/// Loading a mapping file failed.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mapping file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to watch mapping file: {0}")]
    Watch(#[from] notify::Error),
}

/// The record store could not complete an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record store lock poisoned")]
    Poisoned,
}
