use super::protocol::*;
use crate::store::*;

use std::sync::Arc;

/// Request handler logic for the `/ringbuffer` routes. Stateless.
pub struct AppendLogFacade {
    store: Arc<dyn SequenceStore>,
}

impl AppendLogFacade {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    /// Appends at the tail, overwriting the oldest item when full.
    pub async fn append(&self, item: String) -> StoreResult<i64> {
        self.store.add(item, OverflowPolicy::Overwrite).await
    }

    /// Reads up to `max_count` items starting at `start_sequence`.
    ///
    /// A start older than the head is clamped to the head. The call waits
    /// for `min_count` items at most as long as the store's read wait, then
    /// returns whatever is available.
    pub async fn read(
        &self,
        start_sequence: i64,
        max_count: usize,
        min_count: usize,
    ) -> StoreResult<Vec<String>> {
        let result = self
            .store
            .read_many(start_sequence, min_count, max_count)
            .await?;

        tracing::debug!(
            "Read {} item(s) from '{}' starting at {}, next sequence {}",
            result.read_count(),
            self.store.name(),
            result.first_sequence,
            result.next_sequence_to_read_from
        );

        Ok(result.items)
    }

    pub async fn info(&self) -> StoreResult<RingbufferInfo> {
        Ok(RingbufferInfo {
            name: self.store.name().to_string(),
            capacity: self.store.capacity(),
            size: self.store.size().await?,
            remaining_capacity: self.store.remaining_capacity().await?,
            head_sequence: self.store.head_sequence().await?,
            tail_sequence: self.store.tail_sequence().await?,
        })
    }
}
