use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Registration handle returned by `add_entry_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub uuid::Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller identity a lock is held by.
///
/// Locks are reentrant per owner: the same owner may lock a key it already
/// holds, and must unlock it as many times.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockOwner(pub String);

impl LockOwner {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }
}

impl fmt::Display for LockOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds for a lock acquisition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LockOptions {
    /// How long to wait for the lock. `None` waits until acquired.
    pub timeout: Option<Duration>,
    /// Lock is released automatically once the lease elapses.
    pub lease: Option<Duration>,
}

impl LockOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            lease: None,
        }
    }

    pub fn lease(mut self, lease: Option<Duration>) -> Self {
        self.lease = lease;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    NotLocked,
}

/// Structured key filter evaluated by the store.
///
/// Caller input is carried as data, never spliced into a query string, so
/// characters such as `%`, `_` or `'` match themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPredicate {
    All,
    KeyPrefix(String),
}

impl KeyPredicate {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPredicate::All => true,
            KeyPredicate::KeyPrefix(prefix) => key.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryEventType {
    Added,
    Updated,
    Removed,
    Evicted,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryEvent {
    pub map_name: String,
    pub event_type: EntryEventType,
    pub key: String,
    pub value: Option<String>,
    pub old_value: Option<String>,
}

pub type EntryCallback = Arc<dyn Fn(EntryEvent) + Send + Sync>;

/// A callback subscribed to a subset of entry event types.
#[derive(Clone)]
pub struct EntryListener {
    pub event_types: Vec<EntryEventType>,
    pub include_value: bool,
    pub callback: EntryCallback,
}

impl EntryListener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(EntryEvent) + Send + Sync + 'static,
    {
        Self {
            event_types: Vec::new(),
            include_value: true,
            callback: Arc::new(callback),
        }
    }

    pub fn on(mut self, event_type: EntryEventType) -> Self {
        if !self.event_types.contains(&event_type) {
            self.event_types.push(event_type);
        }
        self
    }

    pub fn include_value(mut self, include: bool) -> Self {
        self.include_value = include;
        self
    }

    pub fn accepts(&self, event_type: EntryEventType) -> bool {
        self.event_types.contains(&event_type)
    }
}

impl fmt::Debug for EntryListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryListener")
            .field("event_types", &self.event_types)
            .field("include_value", &self.include_value)
            .finish_non_exhaustive()
    }
}

/// What to do when appending to a full sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop the oldest item to make room.
    Overwrite,
    /// Reject the append while the sequence is full.
    Fail,
}

/// Items returned by a ranged sequence read, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResultSet {
    pub items: Vec<String>,
    /// Sequence of `items[0]`, after clamping to the head.
    pub first_sequence: i64,
    pub next_sequence_to_read_from: i64,
}

impl ReadResultSet {
    pub fn read_count(&self) -> usize {
        self.items.len()
    }
}
