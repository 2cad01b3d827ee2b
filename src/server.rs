//! HTTP surface for the connection registry.
//!
//! Paths and query parameters follow the service this replaces: create and query address a
//! connection by `burro_id`, `src` and `dst`, while update takes the joined id as `nonsense_id`.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clock::Clock,
    connection::ConnectionKey,
    data::Progress,
    error::Error,
    registry::Registry,
    units::{Bytes, BytesPerSec},
};

pub type AppState<C> = Arc<Registry<C>>;

/// Query parameters for `POST /connections/`.
#[derive(Debug, serde::Deserialize)]
pub struct CreateParams {
    pub burro_id: String,
    pub src: String,
    pub dst: String,
    /// Total amount of data to transfer, in bytes.
    pub total_data: f64,
}

/// Query parameters for `PUT /connections/`.
#[derive(Debug, serde::Deserialize)]
pub struct UpdateParams {
    /// The underscore-joined connection id.
    pub nonsense_id: String,
    /// New bandwidth, in bytes per second.
    pub bandwidth: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CheckResponse {
    pub result: bool,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::ConnectionNotFound { .. } => StatusCode::NOT_FOUND,
            Error::UninitializedConnection { .. } => StatusCode::CONFLICT,
        };
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router<C: Clock + 'static>(registry: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/connections/",
            get(check_connection::<C>)
                .post(create_connection::<C>)
                .put(update_connection::<C>),
        )
        .route("/connections/progress", get(connection_progress::<C>))
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

/// GET /connections/
async fn check_connection<C: Clock + 'static>(
    State(registry): State<AppState<C>>,
    Query(key): Query<ConnectionKey>,
) -> Result<Json<CheckResponse>, Error> {
    let result = registry.is_finished(&key)?;
    Ok(Json(CheckResponse { result }))
}

/// POST /connections/
async fn create_connection<C: Clock + 'static>(
    State(registry): State<AppState<C>>,
    Query(params): Query<CreateParams>,
) -> Json<()> {
    let key = ConnectionKey::new(params.burro_id, params.src, params.dst);
    registry.create(key, Bytes::new(params.total_data));
    Json(())
}

/// PUT /connections/
async fn update_connection<C: Clock + 'static>(
    State(registry): State<AppState<C>>,
    Query(params): Query<UpdateParams>,
) -> Result<Json<()>, Error> {
    registry.update_by_id(&params.nonsense_id, BytesPerSec::new(params.bandwidth))?;
    Ok(Json(()))
}

/// GET /connections/progress
async fn connection_progress<C: Clock + 'static>(
    State(registry): State<AppState<C>>,
    Query(key): Query<ConnectionKey>,
) -> Result<Json<Progress>, Error> {
    Ok(Json(registry.progress(&key)?))
}

/// Binds `addr` and serves the registry until ctrl-c.
pub async fn serve<C: Clock + 'static>(
    addr: SocketAddr,
    registry: AppState<C>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("psnet listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("psnet stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
