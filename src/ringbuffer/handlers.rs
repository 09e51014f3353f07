use super::facade::AppendLogFacade;
use super::protocol::*;
use crate::server::error_response;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/ringbuffer/add",
    tag = "ringbuffer",
    request_body(content = String, description = "Item to append", content_type = "text/plain"),
    responses((status = 200, description = "Sequence number of the appended item", body = i64))
)]
pub async fn handle_add(
    Extension(ringbuffer): Extension<Arc<AppendLogFacade>>,
    item: String,
) -> Response {
    tracing::info!("Adding item to ringbuffer: {}", item);

    match ringbuffer.append(item).await {
        Ok(sequence) => (StatusCode::OK, Json(sequence)).into_response(),
        Err(e) => {
            tracing::error!("Error adding item to ringbuffer: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/ringbuffer/read",
    tag = "ringbuffer",
    params(ReadParams),
    responses(
        (status = 200, description = "Items in ascending sequence order", body = Vec<String>),
        (status = 400, description = "Invalid read arguments", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_read(
    Extension(ringbuffer): Extension<Arc<AppendLogFacade>>,
    Query(params): Query<ReadParams>,
) -> Response {
    let max_count = params.max_count.unwrap_or(DEFAULT_MAX_COUNT);
    let min_count = params.min_count.unwrap_or(DEFAULT_MIN_COUNT);
    tracing::info!(
        "Reading from ringbuffer: startSequence={}, maxCount={}, minCount={}",
        params.start_sequence,
        max_count,
        min_count
    );

    match ringbuffer
        .read(params.start_sequence, max_count, min_count)
        .await
    {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            tracing::error!(
                "Error reading from ringbuffer: startSequence={}, error={}",
                params.start_sequence,
                e
            );
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/ringbuffer/info",
    tag = "ringbuffer",
    responses((status = 200, description = "Ring buffer metadata", body = RingbufferInfo))
)]
pub async fn handle_info(Extension(ringbuffer): Extension<Arc<AppendLogFacade>>) -> Response {
    match ringbuffer.info().await {
        Ok(info) => {
            tracing::info!(
                "Ringbuffer info: name={}, size={}, head={}, tail={}",
                info.name,
                info.size,
                info.head_sequence,
                info.tail_sequence
            );
            (StatusCode::OK, Json(info)).into_response()
        }
        Err(e) => {
            tracing::error!("Error fetching ringbuffer info: {}", e);
            error_response(&e)
        }
    }
}
