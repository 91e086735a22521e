// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetdash::notifications::{
    DEFAULT_DURATION_MS, NewNotification, NotificationKind, NotificationQueue,
};
use std::time::Duration;

async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    // let the expiry tasks that just became ready run
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn defaults_to_info_and_expires_after_five_seconds() {
    let queue = NotificationQueue::new();
    let id = queue.add(NewNotification::new("Saved"));
    let snapshot = queue.snapshot();
    assert_eq!(snapshot[0].kind, NotificationKind::Info);
    assert_eq!(snapshot[0].duration, DEFAULT_DURATION_MS);

    advance(4900).await;
    assert!(queue.contains(&id));
    advance(101).await;
    assert!(!queue.contains(&id));
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_duration_persists_until_removed() {
    let queue = NotificationQueue::new();
    let id = queue.add(NewNotification::error("Sticky").persistent());
    advance(60_000).await;
    assert!(queue.contains(&id));
    queue.remove(&id);
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn remove_is_idempotent_and_cancels_only_its_own_timer() {
    let queue = NotificationQueue::new();
    let a = queue.add(NewNotification::success("a").with_duration(1000));
    let b = queue.add(NewNotification::warning("b").with_duration(3000));
    let c = queue.add(NewNotification::new("c").with_title("t"));

    queue.remove(&a);
    queue.remove(&a);
    queue.remove("never-issued");
    let ids: Vec<String> = queue.snapshot().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![b.clone(), c.clone()]);

    advance(3001).await;
    assert!(!queue.contains(&b));
    assert!(queue.contains(&c));
    advance(2000).await;
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn preserves_insertion_order_with_unique_ids() {
    let queue = NotificationQueue::new();
    let ids: Vec<String> = (0..50)
        .map(|i| queue.add(NewNotification::new(format!("n{}", i)).persistent()))
        .collect();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 50);
    let messages: Vec<String> = queue.snapshot().into_iter().map(|n| n.message).collect();
    assert_eq!(messages[0], "n0");
    assert_eq!(messages[49], "n49");
}

#[tokio::test(start_paused = true)]
async fn drain_empties_the_queue_and_stops_timers() {
    let queue = NotificationQueue::new();
    queue.add(NewNotification::new("x"));
    queue.add(NewNotification::new("y").persistent());
    let drained = queue.drain();
    assert_eq!(drained.len(), 2);
    assert!(queue.is_empty());
    advance(10_000).await;
    assert!(queue.is_empty());
}
