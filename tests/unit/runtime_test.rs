//! Tests for tokio adapters and API models

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use load_stagger::core::{LivenessTimer, Spawn, TimerTarget};
use load_stagger::runtime::api::{health, BatchSubmission, ItemRequest};
use load_stagger::runtime::{TokioSpawner, TokioTimer};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[derive(Default)]
struct Counter(AtomicUsize);

impl TimerTarget for Counter {
    fn on_timer_fired(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn test_tokio_timer_fires_once() {
    let timer = TokioTimer::current();
    let target = Arc::new(Counter::default());
    timer.bind(Arc::downgrade(&target) as Weak<dyn TimerTarget>);

    timer.start(Duration::from_secs(5));
    assert!(timer.is_armed());
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(target.0.load(Ordering::SeqCst), 1);
    assert!(!timer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_tokio_timer_restart_replaces_pending_expiry() {
    let timer = TokioTimer::current();
    let target = Arc::new(Counter::default());
    timer.bind(Arc::downgrade(&target) as Weak<dyn TimerTarget>);

    timer.start(Duration::from_secs(5));
    timer.start(Duration::from_secs(10));
    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(target.0.load(Ordering::SeqCst), 0);

    timer.stop();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(target.0.load(Ordering::SeqCst), 0);
}

#[test]
fn test_item_request_conversion() {
    let req: BatchSubmission = serde_json::from_str(
        r#"{ "items": [ { "id": 1, "priority": true }, { "id": 2, "idle_secs": 30, "priority_score": 20 } ] }"#,
    )
    .unwrap();
    let now = Instant::now() + Duration::from_secs(60);
    let items: Vec<_> = req.items.into_iter().map(|r| r.into_item(now)).collect();

    assert!(items[0].is_priority);
    assert!(items[0].last_active.is_none());
    assert_eq!(items[1].priority_score, 20);
    assert_eq!(items[1].last_active, Some(now - Duration::from_secs(30)));

    let direct = ItemRequest {
        id: 3,
        priority: false,
        idle_secs: None,
        priority_score: 0,
    };
    assert!(!direct.into_item(now).is_priority);
}

#[test]
fn test_health() {
    assert!(health().ok);
}
