//! machinv-core — schema normalization engine for machine inventory.
//!
//! Upstream teams submit machine records (os, cpu, memory) in their own
//! shapes. Each team is a *source* with a [`MappingSpec`] that says where
//! each canonical field lives in that team's items. This crate turns raw
//! batches into [`CanonicalRecord`]s.
//!
//! # Architecture
//!
//! ```text
//! MappingProvider ──► MappingSnapshot ──┐
//!                                       ▼
//! raw batch ──► RecordNormalizer ──► FieldResolver (per field, per item)
//!                     │
//!                     ▼
//!             NormalizationResult ──► RecordStore
//! ```
//!
//! Normalization is synchronous and holds no shared state; the only
//! shared pieces are the snapshot (immutable) and the store.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod mapping;
pub mod normalizer;
pub mod resolver;
pub mod store;
pub mod types;

pub use descriptor::{FieldDescriptor, Transform};
pub use error::{ItemError, ItemFailure, PayloadError, ResolutionError, ValidationError};
pub use mapping::{MappingProvider, MappingSnapshot, MappingSpec, MemoryPolicy};
pub use normalizer::{normalize, Batch, NormalizationResult, RecordNormalizer};
pub use types::{CanonicalRecord, RawItem};
