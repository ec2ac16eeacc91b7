use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};

use machinv_core::config::QueryConfig;
use machinv_core::store::{Page, RecordFilter, Stats};
use machinv_core::{normalize, Batch, CanonicalRecord};

use crate::error::ApiError;
use crate::AppState;

pub const SOURCE_HEADER: &str = "X-Source";

// ---------------------------------------------------------------------------
// POST /machines
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub inserted: usize,
    pub errors: Vec<String>,
    pub message: String,
}

pub async fn post_machines(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let snapshot = state.mappings.snapshot();
    let (source, mapping) = headers
        .get(SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| snapshot.get(s).map(|mapping| (s, mapping)))
        .ok_or_else(|| ApiError::UnknownSource {
            valid: snapshot.sources(),
        })?;

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    let batch = Batch::from_payload(payload)?;

    let result = normalize(batch.items(), mapping);
    let mut errors = result.error_messages();
    let mut inserted = 0;

    for record in result.accepted {
        match state.store.insert(source, record) {
            Ok(id) => {
                tracing::debug!(source, id, "inserted record");
                inserted += 1;
            }
            Err(err) => {
                tracing::error!(source, error = %err, "failed to insert record");
                errors.push(format!("Failed to store record: {err}"));
            }
        }
    }

    tracing::info!(
        source,
        items = batch.len(),
        inserted,
        rejected = errors.len(),
        "processed submission"
    );

    Ok(Json(IngestResponse {
        status: "success".to_string(),
        inserted,
        errors,
        message: format!("Inserted {inserted} records"),
    }))
}

// ---------------------------------------------------------------------------
// GET /machines
// ---------------------------------------------------------------------------

/// `GET /machines` query string. `limit`/`offset` win over `page`/`per_page`.
///
/// Paging values that are not non-negative integers are treated as absent,
/// so `?limit=abc` falls back to the configured default.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub os: Option<String>,
    pub cpu: Option<String>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub offset: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "lenient_usize")]
    pub per_page: Option<usize>,
}

fn lenient_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.trim().parse().ok()))
}

impl ListParams {
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            os: self.os.clone().filter(|s| !s.is_empty()),
            cpu: self.cpu.clone().filter(|s| !s.is_empty()),
        }
    }

    pub fn page(&self, query: QueryConfig) -> Page {
        if self.limit.is_some() || self.offset.is_some() {
            return Page {
                offset: self.offset.unwrap_or(0),
                limit: self.limit.unwrap_or(query.default_limit).min(query.max_limit),
            };
        }
        let per_page = self
            .per_page
            .unwrap_or(query.default_limit)
            .min(query.max_limit);
        let page = self.page.unwrap_or(1).max(1);
        Page {
            offset: (page - 1).saturating_mul(per_page),
            limit: per_page,
        }
    }
}

pub async fn list_machines(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CanonicalRecord>>, ApiError> {
    let records = state
        .store
        .find(&params.filter(), params.page(state.query))?;
    Ok(Json(records))
}

// ---------------------------------------------------------------------------
// GET /stats, GET /machines/sources
// ---------------------------------------------------------------------------

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.store.stats()?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourcesResponse {
    /// Sources that have stored records.
    pub sources: Vec<String>,
    /// Sources with a configured mapping.
    pub mappings: Vec<String>,
}

pub async fn list_sources(State(state): State<AppState>) -> Result<Json<SourcesResponse>, ApiError> {
    Ok(Json(SourcesResponse {
        sources: state.store.sources()?,
        mappings: state.mappings.snapshot().sources(),
    }))
}
