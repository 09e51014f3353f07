//! Bounded Sequence (Ring Buffer)
//!
//! Items are kept in a `VecDeque` together with the sequence number of the
//! oldest retained item. Sequence numbers start at 0 and only grow:
//!
//! - `head_sequence` is the oldest retained item (0 while empty),
//! - `tail_sequence` is the newest item (-1 while nothing was ever added),
//! - appending to a full buffer with `OverflowPolicy::Overwrite` drops the head.
//!
//! Readers waiting for items park on a `Notify` signalled by every append.

use crate::config::RingbufferConfig;
use crate::store::*;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Largest `max_count` a single read may ask for.
pub const MAX_BATCH_SIZE: usize = 1_000;

#[derive(Debug, Clone)]
pub struct RingbufferSettings {
    pub capacity: u64,
    /// Longest a read waits for `min_count` items before returning what it has.
    pub read_wait: Duration,
}

impl From<&RingbufferConfig> for RingbufferSettings {
    fn from(config: &RingbufferConfig) -> Self {
        Self {
            capacity: config.capacity.max(1),
            read_wait: Duration::from_millis(config.read_wait_ms),
        }
    }
}

impl Default for RingbufferSettings {
    fn default() -> Self {
        Self::from(&RingbufferConfig::default())
    }
}

#[derive(Debug)]
struct RingState {
    items: VecDeque<String>,
    head_sequence: i64,
}

impl RingState {
    fn tail_sequence(&self) -> i64 {
        self.head_sequence + self.items.len() as i64 - 1
    }

    /// Items from `start` (clamped to head) up to `max_count`.
    fn collect(&self, start: i64, max_count: usize) -> ReadResultSet {
        let first_sequence = start.max(self.head_sequence);
        let offset = (first_sequence - self.head_sequence) as usize;
        let items: Vec<String> = self
            .items
            .iter()
            .skip(offset)
            .take(max_count)
            .cloned()
            .collect();

        ReadResultSet {
            next_sequence_to_read_from: first_sequence + items.len() as i64,
            first_sequence,
            items,
        }
    }

    fn available_from(&self, start: i64) -> usize {
        let first_sequence = start.max(self.head_sequence);
        (self.tail_sequence() - first_sequence + 1).max(0) as usize
    }
}

pub struct GridRingbuffer {
    name: String,
    settings: RingbufferSettings,
    state: Mutex<RingState>,
    appended: Notify,
    active: Arc<AtomicBool>,
}

impl GridRingbuffer {
    pub fn new(name: &str, settings: RingbufferSettings, active: Arc<AtomicBool>) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(RingState {
                items: VecDeque::with_capacity(settings.capacity.min(1024) as usize),
                head_sequence: 0,
            }),
            settings,
            appended: Notify::new(),
            active,
        }
    }

    fn ensure_active(&self) -> StoreResult<()> {
        if self.active.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotActive)
        }
    }

    fn append(&self, item: String, policy: OverflowPolicy) -> StoreResult<i64> {
        let sequence = {
            let mut state = self.state.lock();
            if state.items.len() as u64 >= self.settings.capacity {
                match policy {
                    OverflowPolicy::Overwrite => {
                        state.items.pop_front();
                        state.head_sequence += 1;
                    }
                    OverflowPolicy::Fail => {
                        return Err(StoreError::SequenceFull {
                            name: self.name.clone(),
                        });
                    }
                }
            }
            state.items.push_back(item);
            state.tail_sequence()
        };

        self.appended.notify_waiters();
        Ok(sequence)
    }

    fn validate_read(&self, start_sequence: i64, min_count: usize, max_count: usize) -> StoreResult<()> {
        if start_sequence < 0 {
            return Err(StoreError::invalid(format!(
                "startSequence can't be smaller than 0, got {}",
                start_sequence
            )));
        }
        if min_count > max_count {
            return Err(StoreError::invalid(format!(
                "minCount ({}) can't be larger than maxCount ({})",
                min_count, max_count
            )));
        }
        if max_count > MAX_BATCH_SIZE {
            return Err(StoreError::invalid(format!(
                "maxCount can't be larger than {}, got {}",
                MAX_BATCH_SIZE, max_count
            )));
        }
        if min_count as u64 > self.settings.capacity {
            return Err(StoreError::invalid(format!(
                "minCount ({}) can't be larger than capacity ({})",
                min_count, self.settings.capacity
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for GridRingbuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn capacity(&self) -> u64 {
        self.settings.capacity
    }

    async fn add(&self, item: String, policy: OverflowPolicy) -> StoreResult<i64> {
        self.ensure_active()?;
        self.append(item, policy)
    }

    async fn read_many(
        &self,
        start_sequence: i64,
        min_count: usize,
        max_count: usize,
    ) -> StoreResult<ReadResultSet> {
        self.ensure_active()?;
        self.validate_read(start_sequence, min_count, max_count)?;

        let deadline = Instant::now().checked_add(self.settings.read_wait);

        loop {
            let notified = self.appended.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.state.lock();
                if start_sequence > state.tail_sequence() + 1 {
                    return Err(StoreError::invalid(format!(
                        "startSequence ({}) is larger than tailSequence + 1 ({})",
                        start_sequence,
                        state.tail_sequence() + 1
                    )));
                }
                if state.available_from(start_sequence) >= min_count {
                    return Ok(state.collect(start_sequence, max_count));
                }
            }

            let timed_out = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, notified).await.is_err(),
                None => {
                    notified.await;
                    false
                }
            };
            if timed_out {
                tracing::debug!(
                    "Read on '{}' from {} timed out waiting for {} item(s)",
                    self.name,
                    start_sequence,
                    min_count
                );
                let state = self.state.lock();
                return Ok(state.collect(start_sequence, max_count));
            }
            self.ensure_active()?;
        }
    }

    async fn size(&self) -> StoreResult<u64> {
        self.ensure_active()?;
        Ok(self.state.lock().items.len() as u64)
    }

    async fn head_sequence(&self) -> StoreResult<i64> {
        self.ensure_active()?;
        Ok(self.state.lock().head_sequence)
    }

    async fn tail_sequence(&self) -> StoreResult<i64> {
        self.ensure_active()?;
        Ok(self.state.lock().tail_sequence())
    }

    async fn remaining_capacity(&self) -> StoreResult<u64> {
        self.ensure_active()?;
        let size = self.state.lock().items.len() as u64;
        Ok(self.settings.capacity - size)
    }
}
