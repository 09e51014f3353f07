//! Cache HTTP Protocol
//!
//! Endpoint paths, response bodies and query DTOs for the `/cache` routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// --- API Endpoints ---

/// Put, get or delete a single entry by key.
pub const ENDPOINT_ENTRY: &str = "/cache/:key";
/// Size and emptiness of the map.
pub const ENDPOINT_STATS: &str = "/cache/stats";
/// Entries whose key starts with `keyPrefix`.
pub const ENDPOINT_QUERY: &str = "/cache/query";
/// Acquire the per-key lock for the calling owner.
pub const ENDPOINT_LOCK: &str = "/cache/lock/:key";
/// Release one hold of the per-key lock.
pub const ENDPOINT_UNLOCK: &str = "/cache/unlock/:key";
/// Register (POST) or remove (DELETE) the logging entry listeners.
pub const ENDPOINT_LISTENER: &str = "/cache/listener";

/// Request header naming the caller a lock is taken or released for.
pub const LOCK_OWNER_HEADER: &str = "x-lock-owner";

// --- Response Bodies ---

pub const MSG_ENTRY_ADDED: &str = "Entry added to cache.";
pub const MSG_ENTRY_NOT_FOUND: &str = "Entry not found.";
pub const MSG_ENTRY_REMOVED: &str = "Entry removed from cache.";
pub const MSG_LISTENERS_ADDED: &str = "Listeners added to cache.";
pub const MSG_LISTENERS_REMOVED: &str = "Listeners removed from cache.";
pub const MSG_NO_LISTENERS: &str = "No listeners registered.";

pub fn key_locked(key: &str) -> String {
    format!("Key locked: {}", key)
}

pub fn key_unlocked(key: &str) -> String {
    format!("Key unlocked: {}", key)
}

pub fn key_not_locked(key: &str) -> String {
    format!("Key is not locked: {}", key)
}

pub fn lock_timed_out(key: &str) -> String {
    format!("Timed out acquiring lock: {}", key)
}

// --- Data Transfer Objects ---

/// Point-in-time size of the map. Advisory under concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries in the map.
    pub size: usize,
    pub is_empty: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QueryParams {
    /// Literal, case-sensitive key prefix. Empty matches every key.
    pub key_prefix: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LockParams {
    /// Overrides the configured lock wait.
    pub timeout_ms: Option<u64>,
    /// Releases the lock automatically after this long.
    pub lease_ms: Option<u64>,
}
