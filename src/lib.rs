//! machinv — machine inventory ingestion.
//!
//! Upstream teams POST machine records in their own schemas; each record is
//! normalized into `{os, cpu, memory_gb}` and stored for listing and
//! aggregation. The engine lives in [`machinv_core`], the HTTP shell in
//! [`machinv_server`]; this crate wires them together from a [`Config`].
//!
//! # Architecture
//!
//! ```text
//! HTTP ──► Batch ──► RecordNormalizer ──► RecordStore ──► /machines, /stats
//!                        ▲
//!          MappingProvider (snapshot per request)
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::Router;

pub use machinv_core::config::Config;
use machinv_core::mapping::{FileMappings, StaticMappings};
use machinv_core::store::{InMemoryStore, RecordStore};
use machinv_core::{MappingProvider, MappingSnapshot};
use machinv_server::AppState;

/// Mapping provider for `path`. A missing file falls back to the built-in
/// mappings; a file that exists but does not parse is an error.
pub fn mapping_provider(path: &Path) -> anyhow::Result<Arc<dyn MappingProvider>> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "mapping file not found; using built-in mappings"
        );
        return Ok(Arc::new(StaticMappings::new(MappingSnapshot::defaults())));
    }
    Ok(Arc::new(FileMappings::open(path)?))
}

/// Build the full application router over `store`.
pub fn app(config: &Config, store: Arc<dyn RecordStore>) -> anyhow::Result<Router> {
    let mappings = mapping_provider(&config.mappings.path)?;
    let state = AppState::new(store, mappings, config.query);
    Ok(machinv_server::router(state, config.cors.clone()))
}

/// [`app`] over a fresh in-memory store.
pub fn in_memory_app(config: &Config) -> anyhow::Result<Router> {
    app(config, Arc::new(InMemoryStore::new()))
}
