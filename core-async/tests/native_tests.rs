//! Integration tests for core-async on native platforms.

#![cfg(not(target_arch = "wasm32"))]

use core_async::{runtime, task, time};

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test(start_paused = true)]
async fn test_sleep_follows_paused_clock() {
    let start = time::Instant::now();
    time::sleep(time::Duration::from_millis(2000)).await;
    assert!(start.elapsed() >= time::Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[test]
fn test_now_millis_is_after_2020() {
    assert!(time::now_millis() > 1_577_836_800_000);
}

#[test]
fn test_block_on_runs_future() {
    assert_eq!(runtime::block_on(async { 7 }), Some(7));
}
