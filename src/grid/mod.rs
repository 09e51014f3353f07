//! Embedded Data Grid
//!
//! A single-member, in-process implementation of the store interfaces. The
//! `DataGrid` instance plays the role of a grid client: it hands out named
//! data structures, creating each one on first use and returning the same
//! handle afterwards.
//!
//! ## Core Concepts
//! - **Partitioning**: map entries are spread over a fixed number of partitions by key hash.
//! - **Expiry & Eviction**: entries carry a time-to-live and are evicted least-recently-used
//!   first once a map exceeds `max_entries`.
//! - **Locks**: reentrant per-key locks with optional leases and bounded waits.
//! - **Listeners**: entry events are pushed asynchronously to registered callbacks.
//! - **Ring buffers**: bounded sequences with overwrite-on-full and blocking ranged reads.
//!
//! ## Submodules
//! - **`map`**: `GridMap`, the `KeyValueStore` implementation.
//! - **`ringbuffer`**: `GridRingbuffer`, the `SequenceStore` implementation.
//! - **`locks`**, **`listeners`**, **`partitioner`**: building blocks of `GridMap`.

pub mod listeners;
pub mod locks;
pub mod map;
pub mod partitioner;
pub mod ringbuffer;

#[cfg(test)]
mod tests;

use crate::config::Config;
use map::{GridMap, MapSettings};
use partitioner::PartitionManager;
use ringbuffer::{GridRingbuffer, RingbufferSettings};

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct DataGrid {
    pub instance_name: String,
    pub member_id: uuid::Uuid,
    partitioner: Arc<PartitionManager>,
    map_settings: MapSettings,
    ringbuffer_settings: RingbufferSettings,
    maps: DashMap<String, Arc<GridMap>>,
    ringbuffers: DashMap<String, Arc<GridRingbuffer>>,
    active: Arc<AtomicBool>,
}

impl DataGrid {
    pub fn new(config: &Config) -> Arc<Self> {
        Self::with_settings(
            &config.grid.instance_name,
            config.grid.partition_count,
            MapSettings::from(&config.map),
            RingbufferSettings::from(&config.ringbuffer),
        )
    }

    pub fn with_settings(
        instance_name: &str,
        partition_count: u32,
        map_settings: MapSettings,
        ringbuffer_settings: RingbufferSettings,
    ) -> Arc<Self> {
        let grid = Self {
            instance_name: instance_name.to_string(),
            member_id: uuid::Uuid::new_v4(),
            partitioner: Arc::new(PartitionManager::new(partition_count)),
            map_settings,
            ringbuffer_settings,
            maps: DashMap::new(),
            ringbuffers: DashMap::new(),
            active: Arc::new(AtomicBool::new(true)),
        };

        tracing::info!(
            "Data grid '{}' started (member {}, {} partitions)",
            grid.instance_name,
            grid.member_id,
            grid.partitioner.partition_count()
        );

        Arc::new(grid)
    }

    pub fn get_map(&self, name: &str) -> Arc<GridMap> {
        self.maps
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!("Creating map '{}'", name);
                Arc::new(GridMap::new(
                    name,
                    self.partitioner.clone(),
                    self.map_settings.clone(),
                    self.active.clone(),
                ))
            })
            .clone()
    }

    pub fn get_ringbuffer(&self, name: &str) -> Arc<GridRingbuffer> {
        self.ringbuffers
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!(
                    "Creating ringbuffer '{}' (capacity {})",
                    name,
                    self.ringbuffer_settings.capacity
                );
                Arc::new(GridRingbuffer::new(
                    name,
                    self.ringbuffer_settings.clone(),
                    self.active.clone(),
                ))
            })
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the instance inactive. Every later store call on any of its
    /// data structures fails with `StoreError::NotActive`.
    pub fn shutdown(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            tracing::info!("Data grid '{}' shut down", self.instance_name);
        }
    }

    /// Drops expired entries from every map, returning the total removed.
    pub fn evict_expired(&self) -> usize {
        self.maps
            .iter()
            .map(|entry| entry.value().evict_expired())
            .sum()
    }

    /// Spawns the periodic expiry sweep. The task ends once the grid shuts down.
    pub fn spawn_expiry_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let grid = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            loop {
                ticker.tick().await;
                if !grid.is_active() {
                    break;
                }
                let removed = grid.evict_expired();
                if removed > 0 {
                    tracing::debug!("Expiry sweep removed {} entries", removed);
                }
            }
        })
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Millisecond timestamp `after` past `now`, saturating at `u64::MAX`.
pub(crate) fn deadline_ms(now: u64, after: Duration) -> u64 {
    now.saturating_add(u64::try_from(after.as_millis()).unwrap_or(u64::MAX))
}
