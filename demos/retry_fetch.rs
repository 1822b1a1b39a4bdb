//! # Example: retry_fetch
//!
//! A flaky "endpoint" fails twice and then answers. The operation retries
//! with a growing, jittered delay while the caller watches
//! `{data, loading, error}` change.
//!
//! ## Flow
//! ```text
//! start() ─► Attempting ─► Err("503 #1") ─► WaitingRetry (~200ms)
//!        ─► Attempting ─► Err("503 #2") ─► WaitingRetry (~400ms)
//!        ─► Attempting ─► Ok(profile)   ─► Success
//! refetch() ─► a new sequence; the old result stays visible meanwhile
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_fetch
//! ```

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use faultline::{BackoffPolicy, JitterPolicy, ProducerFn, RetryableOperation};

static CALLS: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone)]
struct Profile {
    name: String,
    visits: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faultline=debug".into()),
        )
        .init();

    // 1. The producer: fails on the first two calls.
    let fetch = ProducerFn::new("profile", || async {
        let call = CALLS.fetch_add(1, Ordering::Relaxed) + 1;
        tokio::time::sleep(Duration::from_millis(50)).await;
        if call <= 2 {
            println!("[endpoint] call {call}: 503");
            return Err(format!("503 Service Unavailable (#{call})"));
        }
        println!("[endpoint] call {call}: 200");
        Ok(Profile {
            name: "alice".into(),
            visits: call,
        })
    });

    // 2. Exponential delay (200ms, 400ms, ...) with equal jitter.
    let backoff = BackoffPolicy::exponential(
        Duration::from_millis(200),
        2.0,
        Duration::from_secs(2),
    )
    .with_jitter(JitterPolicy::Equal);

    let op = RetryableOperation::builder(fetch)
        .retries(3)
        .backoff(backoff)
        .start();

    // 3. Watch the state until the sequence settles.
    let mut rx = op.watch();
    loop {
        {
            let s = rx.borrow_and_update();
            println!(
                "[view] phase={:?} attempt={} loading={} data={:?} error={:?}",
                s.phase, s.attempts, s.loading, s.data, s.error
            );
            if !s.loading {
                break;
            }
        }
        if rx.changed().await.is_err() {
            break;
        }
    }

    // 4. Manual refresh: the previous profile remains visible while loading.
    op.refetch();
    println!("[view] refetching, still showing {:?}", op.data());
    let state = op.settled().await;
    if let Some(profile) = &state.data {
        println!("[view] {} has {} visits", profile.name, profile.visits);
    }

    Ok(())
}
