mod common;

use common::*;
use ingest::queue::JobQueue;
use ingest::services::{run_worker, WorkerStats};
use shared::{CandleJob, Interval};
use std::time::Duration;

fn job(symbol: &str) -> CandleJob {
    CandleJob {
        symbols: vec![symbol.to_string()],
        interval: Interval::OneMinute,
        start_ms: Some(BASE_MS),
        end_ms: None,
    }
}

#[tokio::test]
async fn test_worker_drains_queue_and_survives_failures() {
    let harness = Harness::new(1000);
    harness.exchange.with_klines("ETHUSDT", minute_series("ETHUSDT", BASE_MS, 3));
    let service = harness.service();

    harness.queue.enqueue(&job("ETHUSDT")).await.unwrap();
    harness.queue.enqueue(&job("NOSUCHCOIN")).await.unwrap();
    harness.queue.push_raw("{not json");

    let stats = run_worker(&service, harness.queue.as_ref(), true, Duration::from_millis(1))
        .await
        .unwrap();

    assert_eq!(
        stats,
        WorkerStats {
            jobs: 2,
            failed: 2,
            stored: 4
        }
    );
    assert_eq!(harness.queue.len(), 0);
    assert_eq!(harness.candles.rows(Interval::OneMinute, "ETHUSDT").len(), 3);
}

#[tokio::test]
async fn test_dispatched_jobs_are_worked() {
    let harness = Harness::new(2).with_symbols(&["BTCUSDT", "ETHUSDT"]);
    for symbol in ["BTCUSDT", "ETHUSDT"] {
        harness.exchange.with_klines(symbol, minute_series(symbol, BASE_MS, 4));
    }

    let request = ingest::services::IngestRequest {
        symbols: vec!["ALL".to_string()],
        interval: "1m".to_string(),
        from: Some((BASE_MS / 1000).to_string()),
        use_queue: true,
        ..Default::default()
    };
    harness.queued_service().run(&request).await.unwrap();
    assert_eq!(harness.queue.len(), 2);

    let stats = run_worker(&harness.service(), harness.queue.as_ref(), true, Duration::from_millis(1))
        .await
        .unwrap();

    assert_eq!(stats.jobs, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(harness.candles.len(), 8);
}

#[tokio::test]
async fn test_empty_queue_with_once_returns_immediately() {
    let harness = Harness::new(1000);
    let stats = run_worker(&harness.service(), harness.queue.as_ref(), true, Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(stats, WorkerStats::default());
}

#[tokio::test]
async fn test_worker_keeps_polling_an_idle_queue() {
    let harness = Harness::new(1000);
    harness.exchange.with_klines("ETHUSDT", minute_series("ETHUSDT", BASE_MS, 3));
    let service = harness.service();

    let worker = tokio::time::timeout(
        Duration::from_millis(300),
        run_worker(&service, harness.queue.as_ref(), false, Duration::from_millis(1)),
    );
    let late_job = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        harness.queue.enqueue(&job("ETHUSDT")).await.unwrap();
    };
    let (result, ()) = tokio::join!(worker, late_job);

    // Without `once` the worker only stops when cancelled.
    assert!(result.is_err());
    assert_eq!(harness.queue.len(), 0);
    assert_eq!(harness.candles.rows(Interval::OneMinute, "ETHUSDT").len(), 3);
}
