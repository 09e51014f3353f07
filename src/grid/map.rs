use super::listeners::ListenerRegistry;
use super::locks::LockTable;
use super::{deadline_ms, now_ms};
use super::partitioner::PartitionManager;
use crate::config::MapConfig;
use crate::store::*;

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Entries inspected when picking an eviction victim.
pub const EVICTION_SAMPLE_SIZE: usize = 15;

/// Runtime settings of a single map.
#[derive(Debug, Clone)]
pub struct MapSettings {
    /// `None` disables expiry.
    pub time_to_live: Option<Duration>,
    /// `None` disables size eviction.
    pub max_entries: Option<usize>,
    pub max_listeners: usize,
}

impl From<&MapConfig> for MapSettings {
    fn from(config: &MapConfig) -> Self {
        Self {
            time_to_live: (config.time_to_live_seconds > 0)
                .then(|| Duration::from_secs(config.time_to_live_seconds)),
            max_entries: (config.max_entries > 0).then_some(config.max_entries),
            max_listeners: config.max_listeners,
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self::from(&MapConfig::default())
    }
}

#[derive(Debug, Clone)]
struct Record {
    value: String,
    last_access: u64,
    expires_at: Option<u64>,
}

impl Record {
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// A named, partitioned key-value map held by the local grid member.
///
/// Entries live in one `DashMap` per partition. Writes refresh the entry's
/// time-to-live; reads refresh its last-access stamp. Once `max_entries` is
/// exceeded the least recently used entry of a small sample is evicted,
/// with expired entries going first.
pub struct GridMap {
    name: String,
    local_data: DashMap<u32, DashMap<String, Record>>,
    partitioner: Arc<PartitionManager>,
    settings: MapSettings,
    locks: LockTable,
    listeners: ListenerRegistry,
    /// Logical clock stamped on each access, for LRU ordering.
    access_clock: AtomicU64,
    /// Records held across all partitions, expired ones included.
    stored: AtomicUsize,
    /// Partition the next eviction sample starts from.
    eviction_cursor: AtomicU32,
    active: Arc<AtomicBool>,
}

impl GridMap {
    pub fn new(
        name: &str,
        partitioner: Arc<PartitionManager>,
        settings: MapSettings,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            name: name.to_string(),
            local_data: DashMap::new(),
            partitioner,
            listeners: ListenerRegistry::new(settings.max_listeners),
            settings,
            locks: LockTable::new(),
            access_clock: AtomicU64::new(0),
            stored: AtomicUsize::new(0),
            eviction_cursor: AtomicU32::new(0),
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

    fn tick(&self) -> u64 {
        self.access_clock.fetch_add(1, Ordering::Relaxed)
    }

    fn event(&self, event_type: EntryEventType, key: &str) -> EntryEvent {
        EntryEvent {
            map_name: self.name.clone(),
            event_type,
            key: key.to_string(),
            value: None,
            old_value: None,
        }
    }

    pub fn store_local(&self, key: String, value: String) -> Option<String> {
        let partition = self.partitioner.get_partition(&key);
        let now = now_ms();
        let record = Record {
            value: value.clone(),
            last_access: self.tick(),
            expires_at: self
                .settings
                .time_to_live
                .map(|ttl| deadline_ms(now, ttl)),
        };

        let previous = {
            let partition_map = self
                .local_data
                .entry(partition)
                .or_insert_with(DashMap::new);
            partition_map.insert(key.clone(), record)
        };
        if previous.is_none() {
            self.stored.fetch_add(1, Ordering::Relaxed);
        }

        // An expired record being replaced counts as a fresh insert.
        let old_value = previous.filter(|old| !old.is_expired(now)).map(|old| old.value);

        let mut event = match old_value {
            Some(_) => self.event(EntryEventType::Updated, &key),
            None => self.event(EntryEventType::Added, &key),
        };
        event.value = Some(value);
        event.old_value = old_value.clone();
        self.listeners.publish(event);

        if old_value.is_none() {
            self.evict_if_needed();
        }
        old_value
    }

    pub fn get_local(&self, key: &str) -> Option<String> {
        let partition = self.partitioner.get_partition(key);
        let now = now_ms();

        {
            let partition_map = self.local_data.get(&partition)?;
            let mut record = partition_map.get_mut(key)?;
            if !record.is_expired(now) {
                record.last_access = self.tick();
                return Some(record.value.clone());
            }
        }

        self.expire(partition, key, now);
        None
    }

    pub fn remove_local(&self, key: &str) -> Option<String> {
        let partition = self.partitioner.get_partition(key);
        let now = now_ms();

        let (_, record) = {
            let partition_map = self.local_data.get(&partition)?;
            partition_map.remove(key)?
        };
        self.stored.fetch_sub(1, Ordering::Relaxed);

        if record.is_expired(now) {
            let mut event = self.event(EntryEventType::Expired, key);
            event.old_value = Some(record.value);
            self.listeners.publish(event);
            return None;
        }

        let mut event = self.event(EntryEventType::Removed, key);
        event.old_value = Some(record.value.clone());
        self.listeners.publish(event);
        Some(record.value)
    }

    fn expire(&self, partition: u32, key: &str, now: u64) {
        let removed = self
            .local_data
            .get(&partition)
            .and_then(|partition_map| partition_map.remove_if(key, |_, record| record.is_expired(now)));

        if let Some((key, record)) = removed {
            self.stored.fetch_sub(1, Ordering::Relaxed);
            tracing::debug!("Entry '{}' expired in map '{}'", key, self.name);
            let mut event = self.event(EntryEventType::Expired, &key);
            event.old_value = Some(record.value);
            self.listeners.publish(event);
        }
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn evict_expired(&self) -> usize {
        if self.settings.time_to_live.is_none() {
            return 0;
        }
        let now = now_ms();

        let mut expired = Vec::new();
        for partition in self.local_data.iter() {
            for entry in partition.value().iter() {
                if entry.value().is_expired(now) {
                    expired.push((*partition.key(), entry.key().clone()));
                }
            }
        }

        let count = expired.len();
        for (partition, key) in expired {
            self.expire(partition, &key, now);
        }
        count
    }

    fn evict_if_needed(&self) {
        let Some(max_entries) = self.settings.max_entries else {
            return;
        };

        while self.stored.load(Ordering::Relaxed) > max_entries {
            let now = now_ms();
            let Some((partition, key)) = self.eviction_candidate(now) else {
                return;
            };
            let removed = self
                .local_data
                .get(&partition)
                .and_then(|partition_map| partition_map.remove(&key));

            if let Some((key, record)) = removed {
                self.stored.fetch_sub(1, Ordering::Relaxed);
                let event_type = if record.is_expired(now) {
                    EntryEventType::Expired
                } else {
                    tracing::debug!("Evicted '{}' from map '{}' (max_entries={})", key, self.name, max_entries);
                    EntryEventType::Evicted
                };
                let mut event = self.event(event_type, &key);
                event.old_value = Some(record.value);
                self.listeners.publish(event);
            }
        }
    }

    /// Least recently used entry among up to `EVICTION_SAMPLE_SIZE` entries,
    /// walking partitions from a rotating start. An expired entry met on the
    /// way is returned at once.
    fn eviction_candidate(&self, now: u64) -> Option<(u32, String)> {
        let partitions = self.partitioner.partition_count();
        let start = self.eviction_cursor.fetch_add(1, Ordering::Relaxed) % partitions;

        let mut oldest: Option<(u64, u32, String)> = None;
        let mut sampled = 0;

        'partitions: for offset in 0..partitions {
            let partition = (start + offset) % partitions;
            let Some(partition_map) = self.local_data.get(&partition) else {
                continue;
            };
            for entry in partition_map.iter() {
                let record = entry.value();
                if record.is_expired(now) {
                    return Some((partition, entry.key().clone()));
                }
                if oldest.as_ref().map(|(ts, _, _)| record.last_access < *ts).unwrap_or(true) {
                    oldest = Some((record.last_access, partition, entry.key().clone()));
                }
                sampled += 1;
                if sampled >= EVICTION_SAMPLE_SIZE {
                    break 'partitions;
                }
            }
        }
        oldest.map(|(_, partition, key)| (partition, key))
    }

    pub fn local_entries(&self, predicate: &KeyPredicate) -> Vec<(String, String)> {
        let now = now_ms();
        let mut entries = Vec::new();
        for partition in self.local_data.iter() {
            for entry in partition.value().iter() {
                if !entry.value().is_expired(now) && predicate.matches(entry.key()) {
                    entries.push((entry.key().clone(), entry.value().value.clone()));
                }
            }
        }
        entries
    }

    pub fn local_entry_count(&self) -> usize {
        let now = now_ms();
        self.local_data
            .iter()
            .map(|partition| {
                partition
                    .value()
                    .iter()
                    .filter(|entry| !entry.value().is_expired(now))
                    .count()
            })
            .sum()
    }

    /// Records currently held, including expired ones not yet removed.
    pub fn stored_count(&self) -> usize {
        self.stored.load(Ordering::Relaxed)
    }

    pub fn local_partition_count(&self) -> usize {
        self.local_data
            .iter()
            .filter(|partition| !partition.value().is_empty())
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn locked_count(&self) -> usize {
        self.locks.locked_count()
    }
}

#[async_trait]
impl KeyValueStore for GridMap {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, key: String, value: String) -> StoreResult<Option<String>> {
        self.ensure_active()?;
        Ok(self.store_local(key, value))
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_active()?;
        Ok(self.get_local(key))
    }

    async fn remove(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_active()?;
        Ok(self.remove_local(key))
    }

    async fn size(&self) -> StoreResult<usize> {
        self.ensure_active()?;
        Ok(self.local_entry_count())
    }

    async fn is_empty(&self) -> StoreResult<bool> {
        self.ensure_active()?;
        Ok(self.local_entry_count() == 0)
    }

    async fn entries(&self, predicate: &KeyPredicate) -> StoreResult<Vec<(String, String)>> {
        self.ensure_active()?;
        Ok(self.local_entries(predicate))
    }

    async fn lock(&self, key: &str, owner: &LockOwner, options: LockOptions) -> StoreResult<()> {
        self.ensure_active()?;
        self.locks.lock(key, owner, options).await
    }

    async fn is_locked(&self, key: &str) -> StoreResult<bool> {
        self.ensure_active()?;
        Ok(self.locks.is_locked(key))
    }

    async fn unlock(&self, key: &str, owner: &LockOwner) -> StoreResult<()> {
        self.ensure_active()?;
        self.locks.unlock(key, owner)
    }

    async fn unlock_if_locked(&self, key: &str, owner: &LockOwner) -> StoreResult<UnlockOutcome> {
        self.ensure_active()?;
        self.locks.unlock_if_locked(key, owner)
    }

    fn add_entry_listener(&self, listener: EntryListener) -> StoreResult<ListenerId> {
        self.ensure_active()?;
        self.listeners.register(listener)
    }

    fn remove_entry_listener(&self, id: &ListenerId) -> StoreResult<bool> {
        self.ensure_active()?;
        Ok(self.listeners.deregister(id))
    }
}
