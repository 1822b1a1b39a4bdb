//! # Example: diagnostics_panel
//!
//! Several views observe one [`EventLog`]: a panel rendering the last few
//! events, a counter, the built-in `LogWriter`, and a buggy view that panics.
//! The buggy view does not stop the others from updating.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example diagnostics_panel
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use faultline::{EventKind, EventLog, LogEvent, Subscribe};
use serde_json::json;

/// Renders the newest events like a collapsible debug panel.
struct Panel {
    rows: usize,
}

impl Subscribe for Panel {
    fn on_change(&self, events: &[LogEvent]) {
        println!("┌─ diagnostics ({} events)", events.len());
        for e in events.iter().rev().take(self.rows) {
            println!("│ {e}");
            if let Some(data) = e.data_pretty() {
                for line in data.lines() {
                    println!("│     {line}");
                }
            }
        }
        println!("└─");
    }

    fn name(&self) -> &'static str {
        "panel"
    }
}

struct Buggy;

impl Subscribe for Buggy {
    fn on_change(&self, events: &[LogEvent]) {
        if events.len() == 2 {
            panic!("buggy view cannot handle two events");
        }
    }

    fn name(&self) -> &'static str {
        "buggy"
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let log = EventLog::with_capacity(50);

    let _panel = log.subscribe(Panel { rows: 3 });
    let _buggy = log.subscribe(Buggy);

    let errors = Arc::new(AtomicUsize::new(0));
    let counter = {
        let errors = Arc::clone(&errors);
        log.subscribe(move |events: &[LogEvent]| {
            let n = events.iter().filter(|e| e.kind() == EventKind::Error).count();
            errors.store(n, Ordering::Relaxed);
        })
    };

    #[cfg(feature = "logging")]
    let _writer = log.subscribe(faultline::LogWriter::new());

    log.request("GET /api/orders");
    log.append_with(
        EventKind::Response,
        "200 OK",
        &json!({ "status": 200, "items": 12, "ms": 84 }),
    );
    log.sync("local cache refreshed");
    log.append_with(
        EventKind::Error,
        "DB timeout",
        &json!({ "query": "orders_by_user", "after_ms": 5000 }),
    );
    log.warning("falling back to cached orders");

    println!("[main] error badge: {}", errors.load(Ordering::Relaxed));

    counter.unsubscribe();
    log.success("orders reloaded");

    println!("[main] export:\n{}", log.to_json()?);

    log.clear();
    println!("[main] cleared, {} events left", log.len());
    Ok(())
}
