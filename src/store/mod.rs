//! Store Interface
//!
//! The façades talk to the data grid exclusively through the two traits in
//! this module. Nothing above this layer assumes the store lives in the same
//! process: replication, eviction, lock arbitration and sequence ordering are
//! all the store's business.
//!
//! - **`KeyValueStore`**: a named keyed collection with locks and entry listeners.
//! - **`SequenceStore`**: a named, bounded, append-only sequence (ring buffer).

pub mod error;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use types::*;

use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Stores `value` under `key`, returning the previous value.
    async fn put(&self, key: String, value: String) -> StoreResult<Option<String>>;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Removes `key`, returning the value it held.
    async fn remove(&self, key: &str) -> StoreResult<Option<String>>;

    async fn size(&self) -> StoreResult<usize>;

    async fn is_empty(&self) -> StoreResult<bool>;

    async fn entries(&self, predicate: &KeyPredicate) -> StoreResult<Vec<(String, String)>>;

    async fn lock(&self, key: &str, owner: &LockOwner, options: LockOptions) -> StoreResult<()>;

    async fn is_locked(&self, key: &str) -> StoreResult<bool>;

    /// Releases one hold of `owner` on `key`. Fails if `owner` does not hold it.
    async fn unlock(&self, key: &str, owner: &LockOwner) -> StoreResult<()>;

    /// Checks and releases in one step, so the reported outcome always
    /// matches what happened to the lock.
    async fn unlock_if_locked(&self, key: &str, owner: &LockOwner) -> StoreResult<UnlockOutcome>;

    fn add_entry_listener(&self, listener: EntryListener) -> StoreResult<ListenerId>;

    fn remove_entry_listener(&self, id: &ListenerId) -> StoreResult<bool>;
}

#[async_trait]
pub trait SequenceStore: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn capacity(&self) -> u64;

    /// Appends `item` at the tail and returns its sequence number.
    async fn add(&self, item: String, policy: OverflowPolicy) -> StoreResult<i64>;

    /// Reads up to `max_count` items from `start_sequence`, waiting until at
    /// least `min_count` are available or the store's wait policy elapses.
    async fn read_many(
        &self,
        start_sequence: i64,
        min_count: usize,
        max_count: usize,
    ) -> StoreResult<ReadResultSet>;

    async fn size(&self) -> StoreResult<u64>;

    async fn head_sequence(&self) -> StoreResult<i64>;

    async fn tail_sequence(&self) -> StoreResult<i64>;

    async fn remaining_capacity(&self) -> StoreResult<u64>;
}
