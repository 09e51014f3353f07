use super::protocol::*;
use crate::store::*;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Request handler logic for the `/cache` routes.
///
/// Each call is a single operation against the store. The only state kept
/// here is the registration ids of the demo listeners, so that registering
/// them again replaces the previous pair instead of stacking duplicates.
pub struct KeyValueFacade {
    store: Arc<dyn KeyValueStore>,
    lock_timeout: Duration,
    demo_listeners: Mutex<Vec<ListenerId>>,
}

impl KeyValueFacade {
    pub fn new(store: Arc<dyn KeyValueStore>, lock_timeout: Duration) -> Self {
        Self {
            store,
            lock_timeout,
            demo_listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn map_name(&self) -> &str {
        self.store.name()
    }

    pub async fn put(&self, key: String, value: String) -> StoreResult<&'static str> {
        self.store.put(key, value).await?;
        Ok(MSG_ENTRY_ADDED)
    }

    /// Returns the stored value, or the not-found sentinel.
    pub async fn get(&self, key: &str) -> StoreResult<String> {
        Ok(self
            .store
            .get(key)
            .await?
            .unwrap_or_else(|| MSG_ENTRY_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, key: &str) -> StoreResult<&'static str> {
        self.store.remove(key).await?;
        Ok(MSG_ENTRY_REMOVED)
    }

    pub async fn stats(&self) -> StoreResult<CacheStats> {
        let size = self.store.size().await?;
        Ok(CacheStats {
            size,
            is_empty: size == 0,
        })
    }

    pub async fn query_by_prefix(&self, prefix: &str) -> StoreResult<BTreeMap<String, String>> {
        let predicate = KeyPredicate::KeyPrefix(prefix.to_string());
        let entries = self.store.entries(&predicate).await?;
        Ok(entries.into_iter().collect())
    }

    pub async fn lock(
        &self,
        key: &str,
        owner: &LockOwner,
        timeout: Option<Duration>,
        lease: Option<Duration>,
    ) -> StoreResult<String> {
        let options = LockOptions::with_timeout(timeout.unwrap_or(self.lock_timeout)).lease(lease);
        self.store.lock(key, owner, options).await?;
        Ok(key_locked(key))
    }

    pub async fn unlock(&self, key: &str, owner: &LockOwner) -> StoreResult<String> {
        match self.store.unlock_if_locked(key, owner).await? {
            UnlockOutcome::Unlocked => Ok(key_unlocked(key)),
            UnlockOutcome::NotLocked => Ok(key_not_locked(key)),
        }
    }

    /// Registers the logging listeners, replacing any earlier registration.
    pub async fn register_demo_listeners(&self) -> StoreResult<&'static str> {
        let mut registered = self.demo_listeners.lock().await;

        for id in registered.drain(..) {
            self.store.remove_entry_listener(&id)?;
        }

        let added = EntryListener::new(|event: EntryEvent| {
            tracing::info!(
                "Entry added: key={}, value={}",
                event.key,
                event.value.as_deref().unwrap_or_default()
            );
        })
        .on(EntryEventType::Added);

        let removed = EntryListener::new(|event: EntryEvent| {
            tracing::info!(
                "Entry removed: key={}, oldValue={}",
                event.key,
                event.old_value.as_deref().unwrap_or_default()
            );
        })
        .on(EntryEventType::Removed);

        registered.push(self.store.add_entry_listener(added)?);
        registered.push(self.store.add_entry_listener(removed)?);

        Ok(MSG_LISTENERS_ADDED)
    }

    pub async fn unregister_demo_listeners(&self) -> StoreResult<&'static str> {
        let mut registered = self.demo_listeners.lock().await;
        if registered.is_empty() {
            return Ok(MSG_NO_LISTENERS);
        }

        for id in registered.drain(..) {
            self.store.remove_entry_listener(&id)?;
        }
        Ok(MSG_LISTENERS_REMOVED)
    }

    pub async fn demo_listener_ids(&self) -> Vec<ListenerId> {
        self.demo_listeners.lock().await.clone()
    }
}
