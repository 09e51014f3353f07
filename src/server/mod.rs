//! HTTP Server
//!
//! Assembles the axum router for both façades and runs it until shutdown.
//! Façades reach handlers through `Extension` layers; every route shares a
//! permissive CORS policy and request tracing. The OpenAPI document for all
//! routes is served from `openapi`.

pub mod openapi;


use crate::cache::facade::KeyValueFacade;
use crate::cache::handlers::*;
use crate::cache::protocol::*;
use crate::ringbuffer::facade::AppendLogFacade;
use crate::ringbuffer::handlers::*;
use crate::ringbuffer::protocol::*;
use crate::store::StoreError;
use openapi::{ENDPOINT_API_DOCS, handle_api_docs};

use axum::{
    Router,
    extract::Extension,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Liveness greeting.
pub const ENDPOINT_HELLO: &str = "/api/hello";
pub const MSG_HELLO: &str = "Hello from the data grid facade!";

/// Converts a store failure into a plain-text response.
///
/// Lock timeouts become `408`, bad arguments `400`; anything else is the
/// store failing and becomes `500` with the error text as body.
pub fn error_response(err: &StoreError) -> Response {
    match err {
        StoreError::LockTimeout { key, .. } => {
            (StatusCode::REQUEST_TIMEOUT, lock_timed_out(key)).into_response()
        }
        StoreError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()).into_response(),
        StoreError::NotActive
        | StoreError::LockNotOwned { .. }
        | StoreError::SequenceFull { .. }
        | StoreError::ListenerLimit { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/hello",
    tag = "sample",
    responses((status = 200, description = "Greeting", body = String, content_type = "text/plain"))
)]
async fn handle_hello() -> &'static str {
    MSG_HELLO
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn build_router(cache: Arc<KeyValueFacade>, ringbuffer: Arc<AppendLogFacade>) -> Router {
    Router::new()
        // Key-value façade:
        .route(ENDPOINT_STATS, get(handle_stats))
        .route(ENDPOINT_QUERY, get(handle_query))
        .route(ENDPOINT_LOCK, post(handle_lock))
        .route(ENDPOINT_UNLOCK, post(handle_unlock))
        .route(
            ENDPOINT_LISTENER,
            post(handle_add_listeners).delete(handle_remove_listeners),
        )
        .route(
            ENDPOINT_ENTRY,
            put(handle_put_entry)
                .get(handle_get_entry)
                .delete(handle_delete_entry),
        )
        // Append-log façade:
        .route(ENDPOINT_ADD, post(handle_add))
        .route(ENDPOINT_READ, get(handle_read))
        .route(ENDPOINT_INFO, get(handle_info))
        .route(ENDPOINT_HELLO, get(handle_hello))
        .route(ENDPOINT_API_DOCS, get(handle_api_docs))
        .layer(Extension(cache))
        .layer(Extension(ringbuffer))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
