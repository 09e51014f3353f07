//! Per-key Lock Table
//!
//! A lock is a record keyed by the locked key. It carries the owning caller,
//! a hold count (locks are reentrant for the same owner) and an optional lease
//! deadline. A record whose lease has passed counts as unlocked and is
//! replaced by the next acquirer.
//!
//! Waiters park on a shared `Notify` that is signalled on every release; each
//! wait is also capped by the holder's remaining lease so an expiring lock is
//! picked up without a release signal.

use super::{deadline_ms, now_ms};
use crate::store::{LockOptions, LockOwner, StoreError, StoreResult, UnlockOutcome};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
struct LockRecord {
    owner: LockOwner,
    hold_count: u32,
    lease_expires: Option<u64>,
}

impl LockRecord {
    fn is_expired(&self, now: u64) -> bool {
        self.lease_expires.map(|lease| now >= lease).unwrap_or(false)
    }
}

enum Acquire {
    Acquired,
    /// Held by someone else; the holder's lease ends after `lease_remaining`.
    Held { lease_remaining: Option<Duration> },
}

pub struct LockTable {
    locks: DashMap<String, LockRecord>,
    released: Notify,
}

impl LockTable {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
            released: Notify::new(),
        }
    }

    fn try_acquire(&self, key: &str, owner: &LockOwner, lease: Option<Duration>) -> Acquire {
        let now = now_ms();
        let lease_expires = lease.map(|lease| deadline_ms(now, lease));

        match self.locks.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired(now) {
                    tracing::debug!("Lock on '{}' held by {} expired", key, record.owner);
                    *record = LockRecord {
                        owner: owner.clone(),
                        hold_count: 1,
                        lease_expires,
                    };
                    Acquire::Acquired
                } else if &record.owner == owner {
                    record.hold_count += 1;
                    if lease_expires.is_some() {
                        record.lease_expires = lease_expires;
                    }
                    Acquire::Acquired
                } else {
                    Acquire::Held {
                        lease_remaining: record
                            .lease_expires
                            .map(|lease| Duration::from_millis(lease.saturating_sub(now))),
                    }
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(LockRecord {
                    owner: owner.clone(),
                    hold_count: 1,
                    lease_expires,
                });
                Acquire::Acquired
            }
        }
    }

    /// Waits until `owner` holds the lock on `key` or the timeout elapses.
    pub async fn lock(&self, key: &str, owner: &LockOwner, options: LockOptions) -> StoreResult<()> {
        let started = Instant::now();
        // A timeout too large to represent waits without a deadline.
        let deadline = options
            .timeout
            .and_then(|timeout| started.checked_add(timeout));

        loop {
            // Register for the release signal before checking, so a release
            // between the check and the wait is not missed.
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let lease_remaining = match self.try_acquire(key, owner, options.lease) {
                Acquire::Acquired => {
                    tracing::debug!("Lock on '{}' acquired by {}", key, owner);
                    return Ok(());
                }
                Acquire::Held { lease_remaining } => lease_remaining,
            };

            let until_deadline = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(StoreError::LockTimeout {
                            key: key.to_string(),
                            waited: started.elapsed(),
                        });
                    }
                    Some(deadline - now)
                }
                None => None,
            };

            let wait = match (until_deadline, lease_remaining) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };

            match wait {
                Some(wait) => {
                    let _ = tokio::time::timeout(wait, notified).await;
                }
                None => notified.await,
            }
        }
    }

    pub fn is_locked(&self, key: &str) -> bool {
        let now = now_ms();
        self.locks
            .get(key)
            .map(|record| !record.is_expired(now))
            .unwrap_or(false)
    }

    /// Releases one hold. Fails when `owner` does not currently hold `key`.
    pub fn unlock(&self, key: &str, owner: &LockOwner) -> StoreResult<()> {
        match self.unlock_if_locked(key, owner)? {
            UnlockOutcome::Unlocked => Ok(()),
            UnlockOutcome::NotLocked => Err(StoreError::LockNotOwned {
                key: key.to_string(),
            }),
        }
    }

    pub fn unlock_if_locked(&self, key: &str, owner: &LockOwner) -> StoreResult<UnlockOutcome> {
        let now = now_ms();

        let outcome = match self.locks.entry(key.to_string()) {
            Entry::Vacant(_) => UnlockOutcome::NotLocked,
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired(now) {
                    occupied.remove();
                    UnlockOutcome::NotLocked
                } else if &record.owner != owner {
                    return Err(StoreError::LockNotOwned {
                        key: key.to_string(),
                    });
                } else if record.hold_count > 1 {
                    record.hold_count -= 1;
                    UnlockOutcome::Unlocked
                } else {
                    occupied.remove();
                    UnlockOutcome::Unlocked
                }
            }
        };

        if outcome == UnlockOutcome::Unlocked {
            self.released.notify_waiters();
        }
        Ok(outcome)
    }

    pub fn locked_count(&self) -> usize {
        let now = now_ms();
        self.locks
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new()
    }
}
