//! Ring Buffer HTTP Protocol

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// --- API Endpoints ---

/// Append an item at the tail; answers with its sequence number.
pub const ENDPOINT_ADD: &str = "/ringbuffer/add";
/// Ranged read starting at `startSequence`.
pub const ENDPOINT_READ: &str = "/ringbuffer/read";
/// Capacity, size and head/tail sequence snapshot.
pub const ENDPOINT_INFO: &str = "/ringbuffer/info";

// --- Read Defaults ---

pub const DEFAULT_MAX_COUNT: usize = 10;
pub const DEFAULT_MIN_COUNT: usize = 1;

// --- Data Transfer Objects ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReadParams {
    /// First sequence to read; older sequences are clamped to the head.
    pub start_sequence: i64,
    /// At most this many items (default 10, limit 1000).
    pub max_count: Option<usize>,
    /// Wait for at least this many items (default 1).
    pub min_count: Option<usize>,
}

/// Metadata snapshot of a ring buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RingbufferInfo {
    pub name: String,
    pub capacity: u64,
    pub size: u64,
    pub remaining_capacity: u64,
    pub head_sequence: i64,
    pub tail_sequence: i64,
}
