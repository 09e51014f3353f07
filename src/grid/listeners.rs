//! Entry Listener Registry
//!
//! Holds the callbacks subscribed to a map's entry events, keyed by
//! registration id. Deliveries are queued on an mpsc channel drained by one
//! dispatcher task per map, so callbacks run off the writing task and see
//! events in the order the map produced them.

use crate::store::{EntryCallback, EntryEvent, EntryListener, ListenerId, StoreError, StoreResult};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

type Delivery = (EntryCallback, EntryEvent);

pub struct ListenerRegistry {
    listeners: DashMap<ListenerId, EntryListener>,
    max_listeners: usize,
    dispatcher: Mutex<Option<mpsc::UnboundedSender<Delivery>>>,
}

impl ListenerRegistry {
    pub fn new(max_listeners: usize) -> Self {
        Self {
            listeners: DashMap::new(),
            max_listeners,
            dispatcher: Mutex::new(None),
        }
    }

    /// Registers a listener under a fresh id.
    ///
    /// Fails once `max_listeners` registrations are live.
    pub fn register(&self, listener: EntryListener) -> StoreResult<ListenerId> {
        if self.listeners.len() >= self.max_listeners {
            tracing::warn!(
                "Rejecting listener registration, {} already registered",
                self.listeners.len()
            );
            return Err(StoreError::ListenerLimit {
                limit: self.max_listeners,
            });
        }

        let id = ListenerId::new();
        tracing::debug!("Registered entry listener {} for {:?}", id, listener.event_types);
        self.listeners.insert(id, listener);
        Ok(id)
    }

    pub fn deregister(&self, id: &ListenerId) -> bool {
        let removed = self.listeners.remove(id).is_some();
        if removed {
            tracing::debug!("Deregistered entry listener {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `event` to every listener subscribed to its type.
    pub fn publish(&self, event: EntryEvent) {
        // Collect first so no shard lock is held while callbacks run.
        let targets: Vec<EntryListener> = self
            .listeners
            .iter()
            .filter(|entry| entry.value().accepts(event.event_type))
            .map(|entry| entry.value().clone())
            .collect();

        for listener in targets {
            let mut event = event.clone();
            if !listener.include_value {
                event.value = None;
                event.old_value = None;
            }
            self.dispatch((listener.callback.clone(), event));
        }
    }

    /// Queues a delivery, starting the dispatcher task on first use or after
    /// its runtime went away. Outside a runtime the callback runs inline.
    fn dispatch(&self, delivery: Delivery) {
        let mut dispatcher = self.dispatcher.lock();

        let delivery = match dispatcher.as_ref() {
            Some(sender) => match sender.send(delivery) {
                Ok(()) => return,
                Err(mpsc::error::SendError(delivery)) => delivery,
            },
            None => delivery,
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (sender, mut receiver) = mpsc::unbounded_channel::<Delivery>();
                handle.spawn(async move {
                    while let Some((callback, event)) = receiver.recv().await {
                        callback(event);
                    }
                });
                // The receiver was just created and is alive.
                let _ = sender.send(delivery);
                *dispatcher = Some(sender);
            }
            Err(_) => {
                *dispatcher = None;
                let (callback, event) = delivery;
                drop(dispatcher);
                callback(event);
            }
        }
    }
}
