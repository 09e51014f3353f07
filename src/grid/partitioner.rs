use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps keys onto a fixed number of partitions.
///
/// Every map in the grid shares one `PartitionManager`, so a key lands in the
/// same partition regardless of which map it is stored in.
#[derive(Debug, Clone)]
pub struct PartitionManager {
    pub(crate) num_partitions: u32,
}

impl PartitionManager {
    pub fn new(num_partitions: u32) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
        }
    }

    pub fn get_partition(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let hash = hasher.finish();
        (hash % self.num_partitions as u64) as u32
    }

    pub fn partition_count(&self) -> u32 {
        self.num_partitions
    }
}
