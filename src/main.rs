//! Shulz Memo - demonstration driver
//!
//! Wraps a slow lookup and hammers it from concurrent tasks to show that
//! each key is computed once per TTL window.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shulz_memo::{Config, Memoizer};

const DEFAULT_DELAY_MS: u64 = 2000;
const CALLS_PER_ROUND: u64 = 10;

/// Slow stand-in for a remote lookup.
fn slow_lookup(id: u64, delay: Duration) -> anyhow::Result<String> {
    std::thread::sleep(delay);
    info!(id, "running the actual lookup");
    Ok(format!("Result for ID {}", id))
}

/// Main entry point for the demonstration.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Fire concurrent calls alternating between two keys
/// 4. Wait past the TTL (when it is short enough) and fire another round
/// 5. Log statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shulz_memo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let delay = env::var("MEMO_DEMO_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(DEFAULT_DELAY_MS));
    info!(
        "Configuration loaded: max_entries={}, ttl={}ms, delay={}ms",
        config.max_entries,
        config.ttl.as_millis(),
        delay.as_millis()
    );

    let memo = Arc::new(Memoizer::with_config(
        move |id: u64| slow_lookup(id, delay),
        config,
    ));

    run_round(&memo).await?;

    // Only wait for expiry when it is not absurdly far away
    let pause = config.ttl + Duration::from_secs(1);
    if pause <= Duration::from_secs(30) {
        info!("Waiting {}ms for entries to expire", pause.as_millis());
        tokio::time::sleep(pause).await;
    } else {
        warn!("TTL too long to wait out; second round will be served from cache");
    }

    run_round(&memo).await?;

    let stats = json!({
        "memo": memo.stats(),
        "cache": memo.cache().stats(),
    });
    info!("Stats: {}", serde_json::to_string(&stats)?);

    Ok(())
}

/// Issues concurrent calls for keys 100 and 101 on the blocking pool.
async fn run_round<F>(memo: &Arc<Memoizer<u64, String, F>>) -> anyhow::Result<()>
where
    F: Fn(u64) -> anyhow::Result<String> + Send + Sync + 'static,
{
    let handles: Vec<_> = (0..CALLS_PER_ROUND)
        .map(|i| {
            let memo = Arc::clone(memo);
            tokio::task::spawn_blocking(move || memo.call(100 + i % 2))
        })
        .collect();

    for handle in handles {
        match handle.await? {
            Ok(result) => info!("Got: {}", result),
            Err(err) => warn!("Call failed: {}", err),
        }
    }

    Ok(())
}
