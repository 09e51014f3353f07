//! Grid Module Tests
//!
//! Exercises the embedded store directly, without the HTTP layer.
//!
//! ## Test Scopes
//! - **GridMap**: put/get/remove, expiry, sampled LRU eviction and structured prefix queries.
//! - **Listeners**: event types, value stripping, registration limits.
//! - **Locks**: reentrancy, bounded waits, wake-up on release, leases.
//! - **GridRingbuffer**: sequence numbering, overwrite, clamped and blocking reads.
//! - **DataGrid**: named handles and shutdown.

#[cfg(test)]
mod tests {
    use crate::grid::DataGrid;
    use crate::grid::map::{GridMap, MapSettings};
    use crate::grid::partitioner::PartitionManager;
    use crate::grid::ringbuffer::{GridRingbuffer, RingbufferSettings};
    use crate::store::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn settings() -> MapSettings {
        MapSettings {
            time_to_live: None,
            max_entries: None,
            max_listeners: 8,
        }
    }

    fn test_map(settings: MapSettings) -> GridMap {
        GridMap::new(
            "test-map",
            Arc::new(PartitionManager::new(16)),
            settings,
            Arc::new(AtomicBool::new(true)),
        )
    }

    fn test_ringbuffer(capacity: u64, read_wait: Duration) -> GridRingbuffer {
        GridRingbuffer::new(
            "test-ringbuffer",
            RingbufferSettings {
                capacity,
                read_wait,
            },
            Arc::new(AtomicBool::new(true)),
        )
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<EntryEvent>) -> EntryEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event not delivered in time")
            .expect("listener channel closed")
    }

    // ============================================================
    // GRID MAP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_put_then_get_returns_value() {
        let map = test_map(settings());

        let previous = map.put("k1".to_string(), "v1".to_string()).await.unwrap();
        assert_eq!(previous, None);
        assert_eq!(map.get("k1").await.unwrap(), Some("v1".to_string()));
    }

    #[tokio::test]
    async fn test_put_overwrites_and_returns_previous() {
        let map = test_map(settings());

        map.put("k1".to_string(), "v1".to_string()).await.unwrap();
        let previous = map.put("k1".to_string(), "v2".to_string()).await.unwrap();

        assert_eq!(previous, Some("v1".to_string()));
        assert_eq!(map.get("k1").await.unwrap(), Some("v2".to_string()));
        assert_eq!(map.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() {
        let map = test_map(settings());

        assert_eq!(map.remove("missing").await.unwrap(), None);
        assert_eq!(map.remove("missing").await.unwrap(), None);
        assert!(map.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_size_tracks_live_keys() {
        let map = test_map(settings());

        for i in 0..50 {
            map.put(format!("key-{}", i), format!("value-{}", i))
                .await
                .unwrap();
        }
        map.remove("key-0").await.unwrap();

        assert_eq!(map.size().await.unwrap(), 49);
        assert!(!map.is_empty().await.unwrap());
        assert!(map.local_partition_count() > 1);
    }

    #[tokio::test]
    async fn test_prefix_query_matches_literally() {
        let map = test_map(settings());

        map.put("user:1".to_string(), "alice".to_string()).await.unwrap();
        map.put("user:2".to_string(), "bob".to_string()).await.unwrap();
        map.put("User:3".to_string(), "carol".to_string()).await.unwrap();
        map.put("order:1".to_string(), "book".to_string()).await.unwrap();
        map.put("50%_off".to_string(), "sale".to_string()).await.unwrap();
        map.put("500_off".to_string(), "other".to_string()).await.unwrap();

        let mut users = map
            .entries(&KeyPredicate::KeyPrefix("user:".to_string()))
            .await
            .unwrap();
        users.sort();
        assert_eq!(
            users,
            vec![
                ("user:1".to_string(), "alice".to_string()),
                ("user:2".to_string(), "bob".to_string()),
            ]
        );

        // '%' and '_' are not wildcards.
        let sale = map
            .entries(&KeyPredicate::KeyPrefix("50%_".to_string()))
            .await
            .unwrap();
        assert_eq!(sale, vec![("50%_off".to_string(), "sale".to_string())]);

        let quoted = map
            .entries(&KeyPredicate::KeyPrefix("' OR '1'='1".to_string()))
            .await
            .unwrap();
        assert!(quoted.is_empty());

        let all = map.entries(&KeyPredicate::KeyPrefix(String::new())).await.unwrap();
        assert_eq!(all.len(), 6);
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let map = test_map(MapSettings {
            time_to_live: Some(Duration::from_millis(50)),
            ..settings()
        });

        map.put("short".to_string(), "lived".to_string()).await.unwrap();
        assert_eq!(map.get("short").await.unwrap(), Some("lived".to_string()));

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(map.get("short").await.unwrap(), None);
        assert_eq!(map.size().await.unwrap(), 0);
        assert!(map.entries(&KeyPredicate::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_evict_expired_sweeps_entries() {
        let map = test_map(MapSettings {
            time_to_live: Some(Duration::from_millis(30)),
            ..settings()
        });

        for i in 0..5 {
            map.store_local(format!("k{}", i), "v".to_string());
        }
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(map.evict_expired(), 5);
        assert_eq!(map.evict_expired(), 0);
    }

    #[tokio::test]
    async fn test_lru_eviction_drops_least_recently_used() {
        let map = test_map(MapSettings {
            max_entries: Some(3),
            ..settings()
        });

        map.store_local("a".to_string(), "1".to_string());
        map.store_local("b".to_string(), "2".to_string());
        map.store_local("c".to_string(), "3".to_string());

        // Touch "a" so "b" becomes the oldest.
        assert!(map.get_local("a").is_some());

        map.store_local("d".to_string(), "4".to_string());

        assert_eq!(map.local_entry_count(), 3);
        assert!(map.get_local("b").is_none());
        assert!(map.get_local("a").is_some());
        assert!(map.get_local("c").is_some());
        assert!(map.get_local("d").is_some());
    }

    #[tokio::test]
    async fn test_stored_count_tracks_inserts_and_removals() {
        let map = test_map(MapSettings {
            time_to_live: Some(Duration::from_millis(30)),
            ..settings()
        });

        map.store_local("a".to_string(), "1".to_string());
        map.store_local("b".to_string(), "2".to_string());
        map.store_local("a".to_string(), "3".to_string());
        assert_eq!(map.stored_count(), 2);

        map.remove_local("a");
        map.remove_local("a");
        assert_eq!(map.stored_count(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(map.get_local("b"), None);
        assert_eq!(map.stored_count(), 0);
    }

    #[tokio::test]
    async fn test_eviction_prefers_expired_entries() {
        let map = test_map(MapSettings {
            time_to_live: Some(Duration::from_millis(30)),
            max_entries: Some(2),
            ..settings()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        map.add_entry_listener(
            EntryListener::new(move |event| {
                let _ = tx.send(event);
            })
            .on(EntryEventType::Expired)
            .on(EntryEventType::Evicted),
        )
        .unwrap();

        map.store_local("old1".to_string(), "v".to_string());
        map.store_local("old2".to_string(), "v".to_string());
        tokio::time::sleep(Duration::from_millis(60)).await;

        map.store_local("fresh".to_string(), "v".to_string());

        let event = next_event(&mut rx).await;
        assert_eq!(event.event_type, EntryEventType::Expired);
        assert_eq!(map.stored_count(), 2);
        assert_eq!(map.get_local("fresh"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_filling_bounded_map_keeps_puts_cheap() {
        let map = test_map(MapSettings {
            max_entries: Some(5_000),
            ..settings()
        });

        let started = std::time::Instant::now();
        for i in 0..20_000 {
            map.put(format!("key-{}", i), "v".to_string()).await.unwrap();
        }

        assert_eq!(map.stored_count(), 5_000);
        assert_eq!(map.size().await.unwrap(), 5_000);
        assert!(
            started.elapsed() < Duration::from_secs(10),
            "20000 puts took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_huge_time_to_live_keeps_entries() {
        let map = test_map(MapSettings {
            time_to_live: Some(Duration::from_secs(u64::MAX)),
            ..settings()
        });

        map.put("k".to_string(), "v".to_string()).await.unwrap();
        assert_eq!(map.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(map.evict_expired(), 0);
    }

    // ============================================================
    // LISTENER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_listener_receives_added_updated_removed() {
        let map = test_map(settings());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let listener = EntryListener::new(move |event| {
            let _ = tx.send(event);
        })
        .on(EntryEventType::Added)
        .on(EntryEventType::Updated)
        .on(EntryEventType::Removed);
        map.add_entry_listener(listener).unwrap();

        map.put("k".to_string(), "v1".to_string()).await.unwrap();
        let added = next_event(&mut rx).await;
        assert_eq!(added.event_type, EntryEventType::Added);
        assert_eq!(added.map_name, "test-map");
        assert_eq!(added.value, Some("v1".to_string()));

        map.put("k".to_string(), "v2".to_string()).await.unwrap();
        let updated = next_event(&mut rx).await;
        assert_eq!(updated.event_type, EntryEventType::Updated);
        assert_eq!(updated.old_value, Some("v1".to_string()));

        map.remove("k").await.unwrap();
        let removed = next_event(&mut rx).await;
        assert_eq!(removed.event_type, EntryEventType::Removed);
        assert_eq!(removed.old_value, Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_listener_filters_event_types_and_values() {
        let map = test_map(settings());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let listener = EntryListener::new(move |event| {
            let _ = tx.send(event);
        })
        .on(EntryEventType::Removed)
        .include_value(false);
        map.add_entry_listener(listener).unwrap();

        map.put("k".to_string(), "secret".to_string()).await.unwrap();
        map.remove("k").await.unwrap();

        let event = next_event(&mut rx).await;
        assert_eq!(event.event_type, EntryEventType::Removed);
        assert_eq!(event.key, "k");
        assert_eq!(event.old_value, None);

        // Nothing else (the Added event was filtered out).
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_removed_listener_stops_receiving() {
        let map = test_map(settings());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let id = map
            .add_entry_listener(
                EntryListener::new(move |event| {
                    let _ = tx.send(event);
                })
                .on(EntryEventType::Added),
            )
            .unwrap();

        assert!(map.remove_entry_listener(&id).unwrap());
        assert!(!map.remove_entry_listener(&id).unwrap());
        assert_eq!(map.listener_count(), 0);

        map.put("k".to_string(), "v".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_listener_limit_enforced() {
        let map = test_map(MapSettings {
            max_listeners: 2,
            ..settings()
        });

        for _ in 0..2 {
            map.add_entry_listener(EntryListener::new(|_| {}).on(EntryEventType::Added))
                .unwrap();
        }
        let result = map.add_entry_listener(EntryListener::new(|_| {}));
        assert!(matches!(result, Err(StoreError::ListenerLimit { limit: 2 })));
    }

    #[tokio::test]
    async fn test_listener_sees_events_in_write_order() {
        let map = test_map(settings());
        let (tx, mut rx) = mpsc::unbounded_channel();
        map.add_entry_listener(
            EntryListener::new(move |event| {
                let _ = tx.send(event);
            })
            .on(EntryEventType::Added)
            .on(EntryEventType::Removed),
        )
        .unwrap();

        for i in 0..50 {
            map.put("k".to_string(), format!("v{}", i)).await.unwrap();
            map.remove("k").await.unwrap();
        }

        for i in 0..50 {
            let added = next_event(&mut rx).await;
            assert_eq!(added.event_type, EntryEventType::Added);
            assert_eq!(added.value, Some(format!("v{}", i)));

            let removed = next_event(&mut rx).await;
            assert_eq!(removed.event_type, EntryEventType::Removed);
            assert_eq!(removed.old_value, Some(format!("v{}", i)));
        }
    }

    // ============================================================
    // LOCK TESTS
    // ============================================================

    #[tokio::test]
    async fn test_lock_is_reentrant_for_same_owner() {
        let map = test_map(settings());
        let owner = LockOwner::new("alice");
        let options = LockOptions::with_timeout(Duration::from_millis(100));

        map.lock("k", &owner, options).await.unwrap();
        map.lock("k", &owner, options).await.unwrap();
        assert!(map.is_locked("k").await.unwrap());

        assert_eq!(
            map.unlock_if_locked("k", &owner).await.unwrap(),
            UnlockOutcome::Unlocked
        );
        assert!(map.is_locked("k").await.unwrap(), "second hold still active");

        map.unlock("k", &owner).await.unwrap();
        assert!(!map.is_locked("k").await.unwrap());
        assert_eq!(map.locked_count(), 0);
    }

    #[tokio::test]
    async fn test_lock_times_out_when_held_by_other_owner() {
        let map = test_map(settings());
        let alice = LockOwner::new("alice");
        let bob = LockOwner::new("bob");

        map.lock("k", &alice, LockOptions::default()).await.unwrap();

        let result = map
            .lock("k", &bob, LockOptions::with_timeout(Duration::from_millis(50)))
            .await;
        match result {
            Err(StoreError::LockTimeout { key, waited }) => {
                assert_eq!(key, "k");
                assert!(waited >= Duration::from_millis(50));
            }
            other => panic!("expected LockTimeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_release_wakes_waiting_owner() {
        let map = Arc::new(test_map(settings()));
        let alice = LockOwner::new("alice");

        map.lock("k", &alice, LockOptions::default()).await.unwrap();

        let waiter = {
            let map = map.clone();
            tokio::spawn(async move {
                map.lock(
                    "k",
                    &LockOwner::new("bob"),
                    LockOptions::with_timeout(Duration::from_secs(2)),
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        map.unlock("k", &alice).await.unwrap();

        waiter.await.unwrap().unwrap();
        assert!(map.is_locked("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_lease_frees_lock() {
        let map = test_map(settings());
        let alice = LockOwner::new("alice");
        let bob = LockOwner::new("bob");

        map.lock(
            "k",
            &alice,
            LockOptions::default().lease(Some(Duration::from_millis(50))),
        )
        .await
        .unwrap();

        // Bob waits past the lease without any release signal.
        map.lock("k", &bob, LockOptions::with_timeout(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(matches!(
            map.unlock("k", &alice).await,
            Err(StoreError::LockNotOwned { .. })
        ));
        map.unlock("k", &bob).await.unwrap();
    }

    #[tokio::test]
    async fn test_unlock_if_locked_reports_not_locked() {
        let map = test_map(settings());
        let owner = LockOwner::anonymous();

        assert_eq!(
            map.unlock_if_locked("never", &owner).await.unwrap(),
            UnlockOutcome::NotLocked
        );
        assert!(!map.is_locked("never").await.unwrap());
    }

    #[tokio::test]
    async fn test_unlock_by_other_owner_fails() {
        let map = test_map(settings());

        map.lock("k", &LockOwner::new("alice"), LockOptions::default())
            .await
            .unwrap();

        let result = map.unlock_if_locked("k", &LockOwner::new("bob")).await;
        assert!(matches!(result, Err(StoreError::LockNotOwned { .. })));
        assert!(map.is_locked("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_lease_keeps_lock_held() {
        let map = test_map(settings());
        let alice = LockOwner::new("alice");
        let bob = LockOwner::new("bob");

        map.lock(
            "k",
            &alice,
            LockOptions::default().lease(Some(Duration::from_millis(u64::MAX))),
        )
        .await
        .unwrap();

        assert!(map.is_locked("k").await.unwrap());
        let result = map
            .lock("k", &bob, LockOptions::with_timeout(Duration::from_millis(30)))
            .await;
        assert!(matches!(result, Err(StoreError::LockTimeout { .. })));
        map.unlock("k", &alice).await.unwrap();
    }

    #[tokio::test]
    async fn test_huge_timeout_acquires_free_lock() {
        let map = test_map(settings());
        let owner = LockOwner::new("alice");

        map.lock("k", &owner, LockOptions::with_timeout(Duration::MAX))
            .await
            .unwrap();
        assert!(map.is_locked("k").await.unwrap());
    }

    // ============================================================
    // RINGBUFFER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_fresh_ringbuffer_sequences() {
        let rb = test_ringbuffer(10, Duration::from_millis(10));

        assert_eq!(rb.head_sequence().await.unwrap(), 0);
        assert_eq!(rb.tail_sequence().await.unwrap(), -1);
        assert_eq!(rb.size().await.unwrap(), 0);
        assert_eq!(rb.remaining_capacity().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_add_assigns_increasing_sequences() {
        let rb = test_ringbuffer(10, Duration::from_millis(10));

        let s0 = rb.add("event1".to_string(), OverflowPolicy::Overwrite).await.unwrap();
        let s1 = rb.add("event2".to_string(), OverflowPolicy::Overwrite).await.unwrap();
        assert_eq!((s0, s1), (0, 1));

        let result = rb.read_many(0, 1, 10).await.unwrap();
        assert_eq!(result.items, vec!["event1".to_string(), "event2".to_string()]);
        assert_eq!(result.first_sequence, 0);
        assert_eq!(result.next_sequence_to_read_from, 2);

        assert_eq!(rb.size().await.unwrap(), 2);
        assert_eq!(rb.head_sequence().await.unwrap(), 0);
        assert_eq!(rb.tail_sequence().await.unwrap(), 1);
        assert_eq!(rb.remaining_capacity().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_overwrite_moves_head_and_clamps_reads() {
        let rb = test_ringbuffer(3, Duration::from_millis(10));

        for i in 0..5 {
            rb.add(format!("item{}", i), OverflowPolicy::Overwrite)
                .await
                .unwrap();
        }

        assert_eq!(rb.head_sequence().await.unwrap(), 2);
        assert_eq!(rb.tail_sequence().await.unwrap(), 4);
        assert_eq!(rb.size().await.unwrap(), 3);
        assert_eq!(rb.remaining_capacity().await.unwrap(), 0);

        let result = rb.read_many(0, 1, 10).await.unwrap();
        assert_eq!(result.first_sequence, 2);
        assert_eq!(result.items, vec!["item2", "item3", "item4"]);
    }

    #[tokio::test]
    async fn test_fail_policy_rejects_when_full() {
        let rb = test_ringbuffer(1, Duration::from_millis(10));

        rb.add("a".to_string(), OverflowPolicy::Fail).await.unwrap();
        let result = rb.add("b".to_string(), OverflowPolicy::Fail).await;
        assert!(matches!(result, Err(StoreError::SequenceFull { .. })));
    }

    #[tokio::test]
    async fn test_read_respects_max_count() {
        let rb = test_ringbuffer(100, Duration::from_millis(10));
        for i in 0..25 {
            rb.add(format!("item{}", i), OverflowPolicy::Overwrite)
                .await
                .unwrap();
        }

        let result = rb.read_many(5, 1, 10).await.unwrap();
        assert_eq!(result.read_count(), 10);
        assert_eq!(result.items[0], "item5");
        assert_eq!(result.items[9], "item14");
    }

    #[tokio::test]
    async fn test_read_past_tail_returns_empty_after_wait() {
        let rb = test_ringbuffer(10, Duration::from_millis(50));
        rb.add("only".to_string(), OverflowPolicy::Overwrite).await.unwrap();

        let started = std::time::Instant::now();
        let result = rb.read_many(1, 1, 10).await.unwrap();

        assert!(result.items.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_blocked_read_wakes_on_append() {
        let rb = Arc::new(test_ringbuffer(10, Duration::from_secs(5)));

        let reader = {
            let rb = rb.clone();
            tokio::spawn(async move { rb.read_many(0, 1, 10).await })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        rb.add("late".to_string(), OverflowPolicy::Overwrite).await.unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .expect("reader was not woken")
            .unwrap()
            .unwrap();
        assert_eq!(result.items, vec!["late".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_read_arguments() {
        let rb = test_ringbuffer(5, Duration::from_millis(10));
        rb.add("x".to_string(), OverflowPolicy::Overwrite).await.unwrap();

        for (start, min, max) in [(-1, 1, 10), (0, 5, 2), (0, 1, 1_001), (0, 6, 10), (3, 1, 10)] {
            let result = rb.read_many(start, min, max).await;
            assert!(
                matches!(result, Err(StoreError::InvalidArgument(_))),
                "start={} min={} max={} should be rejected",
                start,
                min,
                max
            );
        }
    }

    #[tokio::test]
    async fn test_huge_read_wait_returns_available_items() {
        let ringbuffer = test_ringbuffer(4, Duration::MAX);

        ringbuffer.add("a".to_string(), OverflowPolicy::Overwrite).await.unwrap();
        let result = ringbuffer.read_many(0, 1, 10).await.unwrap();
        assert_eq!(result.items, vec!["a".to_string()]);
    }

    // ============================================================
    // DATA GRID TESTS
    // ============================================================

    #[tokio::test]
    async fn test_grid_returns_same_handle_per_name() {
        let grid = DataGrid::with_settings(
            "test-grid",
            16,
            settings(),
            RingbufferSettings::default(),
        );

        let first = grid.get_map("default");
        first.put("k".to_string(), "v".to_string()).await.unwrap();

        let second = grid.get_map("default");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get("k").await.unwrap(), Some("v".to_string()));

        let other = grid.get_map("other");
        assert_eq!(other.get("k").await.unwrap(), None);

        let rb1 = grid.get_ringbuffer("ringbuffer-demo");
        let rb2 = grid.get_ringbuffer("ringbuffer-demo");
        assert!(Arc::ptr_eq(&rb1, &rb2));
    }

    #[tokio::test]
    async fn test_shutdown_makes_store_inactive() {
        let grid = DataGrid::with_settings(
            "test-grid",
            16,
            settings(),
            RingbufferSettings::default(),
        );
        let map = grid.get_map("default");
        let rb = grid.get_ringbuffer("ringbuffer-demo");

        grid.shutdown();

        assert!(!grid.is_active());
        assert!(matches!(
            map.put("k".to_string(), "v".to_string()).await,
            Err(StoreError::NotActive)
        ));
        assert!(matches!(
            rb.add("x".to_string(), OverflowPolicy::Overwrite).await,
            Err(StoreError::NotActive)
        ));
    }

    #[tokio::test]
    async fn test_expiry_sweeper_stops_after_shutdown() {
        let grid = DataGrid::with_settings(
            "test-grid",
            16,
            MapSettings {
                time_to_live: Some(Duration::from_millis(20)),
                ..settings()
            },
            RingbufferSettings::default(),
        );
        let map = grid.get_map("default");
        map.store_local("k".to_string(), "v".to_string());

        let sweeper = grid.spawn_expiry_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(map.local_entry_count(), 0);

        grid.shutdown();
        tokio::time::timeout(Duration::from_secs(1), sweeper)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
