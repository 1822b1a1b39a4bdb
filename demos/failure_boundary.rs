//! # Example: failure_boundary
//!
//! A root boundary guards "rendering" of a page. The first render panics;
//! the failure is logged once, the fallback screen is shown, and later
//! renders keep showing it until the user presses reload.
//!
//! ## Flow
//! ```text
//! render #1 ─► panic ─► log(error) ─► fallback
//! render #2 ─► fallback (not re-run, not re-logged)
//! reset()   ─► log(info) ─► ResetAction::Reload ─► host rebuilds
//! render #3 ─► page
//! ```
//!
//! ## Run
//! ```bash
//! RUST_BACKTRACE=1 cargo run --example failure_boundary
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use faultline::{EventLog, FailureBoundary, LogEvent, Outcome, ResetAction};

static BROKEN: AtomicBool = AtomicBool::new(true);

fn render_page() -> Result<String, String> {
    if BROKEN.load(Ordering::Relaxed) {
        let widgets: Vec<&str> = Vec::new();
        // Simulated bug: indexing an empty list.
        return Ok(widgets[3].to_string());
    }
    Ok("<page>dashboard</page>".to_string())
}

fn show(outcome: Outcome<String>, boundary: &FailureBoundary) {
    match outcome {
        Outcome::Rendered(page) => println!("[host] rendered {page}"),
        Outcome::Fallback(_) => {
            if let Some(view) = boundary.fallback_view() {
                println!("[host] fallback:\n{view}\n");
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faultline=info".into()),
        )
        .init();

    // Keep the default hook quiet; the boundary reports the panic itself.
    std::panic::set_hook(Box::new(|_| {}));

    let log = EventLog::new();
    let _sub = log.subscribe(|events: &[LogEvent]| {
        if let Some(last) = events.last() {
            println!("[log] {last}");
        }
    });

    let boundary = FailureBoundary::builder(log.clone()).name("root").build();

    show(boundary.run(render_page), &boundary);
    show(boundary.run(render_page), &boundary);

    BROKEN.store(false, Ordering::Relaxed);
    match boundary.reset() {
        ResetAction::Reload => println!("[host] full reload requested"),
        ResetAction::Resume => println!("[host] resuming in place"),
    }
    show(boundary.run(render_page), &boundary);

    println!("[main] {} events recorded", log.len());
}
