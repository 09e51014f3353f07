use super::facade::KeyValueFacade;
use super::protocol::*;
use crate::server::error_response;
use crate::store::LockOwner;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;

fn lock_owner(headers: &HeaderMap) -> LockOwner {
    headers
        .get(LOCK_OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .map(LockOwner::new)
        .unwrap_or_else(LockOwner::anonymous)
}

#[utoipa::path(
    put,
    path = "/cache/{key}",
    tag = "cache",
    params(("key" = String, Path, description = "Cache entry key")),
    request_body(content = String, description = "Value to store", content_type = "text/plain"),
    responses(
        (status = 200, description = "Entry added or updated", body = String, content_type = "text/plain"),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_put_entry(
    Extension(cache): Extension<Arc<KeyValueFacade>>,
    Path(key): Path<String>,
    value: String,
) -> Response {
    tracing::info!("Adding entry to cache: key={}, value={}", key, value);

    match cache.put(key.clone(), value).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => {
            tracing::error!("Error adding entry to cache: key={}, error={}", key, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/cache/{key}",
    tag = "cache",
    params(("key" = String, Path, description = "Cache entry key")),
    responses(
        (status = 200, description = "Stored value, or \"Entry not found.\"", body = String, content_type = "text/plain"),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_get_entry(
    Extension(cache): Extension<Arc<KeyValueFacade>>,
    Path(key): Path<String>,
) -> Response {
    tracing::info!("Retrieving entry from cache: key={}", key);

    match cache.get(&key).await {
        Ok(value) => (StatusCode::OK, value).into_response(),
        Err(e) => {
            tracing::error!("Error retrieving entry from cache: key={}, error={}", key, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/cache/{key}",
    tag = "cache",
    params(("key" = String, Path, description = "Cache entry key")),
    responses(
        (status = 200, description = "Entry removed, or was already absent", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_delete_entry(
    Extension(cache): Extension<Arc<KeyValueFacade>>,
    Path(key): Path<String>,
) -> Response {
    tracing::info!("Removing entry from cache: key={}", key);

    match cache.delete(&key).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => {
            tracing::error!("Error removing entry from cache: key={}, error={}", key, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/cache/stats",
    tag = "cache",
    responses((status = 200, description = "Map size and emptiness", body = CacheStats))
)]
pub async fn handle_stats(Extension(cache): Extension<Arc<KeyValueFacade>>) -> Response {
    match cache.stats().await {
        Ok(stats) => {
            tracing::info!(
                "Fetching cache statistics: size={}, isEmpty={}",
                stats.size,
                stats.is_empty
            );
            (StatusCode::OK, Json(stats)).into_response()
        }
        Err(e) => {
            tracing::error!("Error fetching cache statistics: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/cache/query",
    tag = "cache",
    params(QueryParams),
    responses(
        (status = 200, description = "Matching entries as a key to value object", body = std::collections::HashMap<String, String>),
        (status = 400, description = "keyPrefix missing")
    )
)]
pub async fn handle_query(
    Extension(cache): Extension<Arc<KeyValueFacade>>,
    Query(params): Query<QueryParams>,
) -> Response {
    tracing::info!("Querying cache for keys starting with: {}", params.key_prefix);

    match cache.query_by_prefix(&params.key_prefix).await {
        Ok(entries) => {
            tracing::debug!("Prefix query matched {} entries", entries.len());
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(e) => {
            tracing::error!("Error querying cache: prefix={}, error={}", params.key_prefix, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/cache/lock/{key}",
    tag = "cache",
    params(
        ("key" = String, Path, description = "Key to lock"),
        ("x-lock-owner" = Option<String>, Header, description = "Lock owner, \"anonymous\" when absent"),
        LockParams
    ),
    responses(
        (status = 200, description = "Key locked", body = String, content_type = "text/plain"),
        (status = 408, description = "Lock not acquired within the timeout", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_lock(
    Extension(cache): Extension<Arc<KeyValueFacade>>,
    Path(key): Path<String>,
    Query(params): Query<LockParams>,
    headers: HeaderMap,
) -> Response {
    let owner = lock_owner(&headers);
    tracing::info!("Locking key in cache: {} (owner={})", key, owner);

    let timeout = params.timeout_ms.map(Duration::from_millis);
    let lease = params.lease_ms.map(Duration::from_millis);

    match cache.lock(&key, &owner, timeout, lease).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => {
            tracing::error!("Error locking key in cache: key={}, error={}", key, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/cache/unlock/{key}",
    tag = "cache",
    params(
        ("key" = String, Path, description = "Key to unlock"),
        ("x-lock-owner" = Option<String>, Header, description = "Lock owner, \"anonymous\" when absent")
    ),
    responses(
        (status = 200, description = "Key unlocked, or it was not locked", body = String, content_type = "text/plain"),
        (status = 500, description = "Lock held by another owner", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_unlock(
    Extension(cache): Extension<Arc<KeyValueFacade>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    let owner = lock_owner(&headers);
    tracing::info!("Unlocking key in cache: {} (owner={})", key, owner);

    match cache.unlock(&key, &owner).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => {
            tracing::error!("Error unlocking key in cache: key={}, error={}", key, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/cache/listener",
    tag = "cache",
    responses(
        (status = 200, description = "Logging listeners registered, replacing earlier ones", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_add_listeners(Extension(cache): Extension<Arc<KeyValueFacade>>) -> Response {
    tracing::info!("Adding listeners to cache.");

    match cache.register_demo_listeners().await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => {
            tracing::error!("Error adding listeners to cache: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/cache/listener",
    tag = "cache",
    responses(
        (status = 200, description = "Listeners removed, or none were registered", body = String, content_type = "text/plain")
    )
)]
pub async fn handle_remove_listeners(Extension(cache): Extension<Arc<KeyValueFacade>>) -> Response {
    tracing::info!("Removing listeners from cache.");

    match cache.unregister_demo_listeners().await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(e) => {
            tracing::error!("Error removing listeners from cache: {}", e);
            error_response(&e)
        }
    }
}
