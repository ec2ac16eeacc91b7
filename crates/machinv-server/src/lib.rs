//! machinv-server — HTTP shell around the normalization engine.
//!
//! | Route                    | Handler                           |
//! |--------------------------|-----------------------------------|
//! | `POST /machines`         | [`handlers::post_machines`]       |
//! | `GET /machines`          | [`handlers::list_machines`]       |
//! | `GET /machines/sources`  | [`handlers::list_sources`]        |
//! | `GET /stats`             | [`handlers::get_stats`]           |
//!
//! Handlers share an [`AppState`]; every submission takes one mapping
//! snapshot from the provider and uses it for the whole batch.

pub mod cors;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};
use tokio::net::TcpListener;

use machinv_core::config::{CorsConfig, QueryConfig};
use machinv_core::store::RecordStore;
use machinv_core::MappingProvider;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub mappings: Arc<dyn MappingProvider>,
    pub query: QueryConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        mappings: Arc<dyn MappingProvider>,
        query: QueryConfig,
    ) -> Self {
        Self {
            store,
            mappings,
            query,
        }
    }
}

/// Build the router with CORS applied to every route.
pub fn router(state: AppState, cors: CorsConfig) -> Router {
    Router::new()
        .route(
            "/machines",
            get(handlers::list_machines).post(handlers::post_machines),
        )
        .route("/machines/sources", get(handlers::list_sources))
        .route("/stats", get(handlers::get_stats))
        .layer(middleware::from_fn_with_state(Arc::new(cors), cors::apply))
        .with_state(state)
}

/// Serve `app` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
