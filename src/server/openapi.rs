//! OpenAPI description of the HTTP surface, served at `/v3/api-docs`.

use crate::cache::protocol::CacheStats;
use crate::ringbuffer::protocol::RingbufferInfo;

use axum::Json;
use utoipa::OpenApi;

/// OpenAPI 3 JSON document for every route.
pub const ENDPOINT_API_DOCS: &str = "/v3/api-docs";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Data Grid Facade API",
        description = "Key-value cache and ring buffer operations over an embedded data grid."
    ),
    paths(
        crate::cache::handlers::handle_put_entry,
        crate::cache::handlers::handle_get_entry,
        crate::cache::handlers::handle_delete_entry,
        crate::cache::handlers::handle_stats,
        crate::cache::handlers::handle_query,
        crate::cache::handlers::handle_lock,
        crate::cache::handlers::handle_unlock,
        crate::cache::handlers::handle_add_listeners,
        crate::cache::handlers::handle_remove_listeners,
        crate::ringbuffer::handlers::handle_add,
        crate::ringbuffer::handlers::handle_read,
        crate::ringbuffer::handlers::handle_info,
        super::handle_hello,
    ),
    components(schemas(CacheStats, RingbufferInfo)),
    tags(
        (name = "cache", description = "Operations on the key-value map"),
        (name = "ringbuffer", description = "Operations on the bounded append-only sequence"),
        (name = "sample", description = "Liveness greeting")
    )
)]
pub struct ApiDoc;

pub async fn handle_api_docs() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
