use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use faultline::{EventKind, EventLog, LogEvent, Subscribe};
use parking_lot::Mutex;
use serde_json::json;

/// Records every snapshot it receives.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<Vec<LogEvent>>>,
}

impl Subscribe for Recorder {
    fn on_change(&self, events: &[LogEvent]) {
        self.seen.lock().push(events.to_vec());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

impl Recorder {
    fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    fn last_len(&self) -> Option<usize> {
        self.seen.lock().last().map(Vec::len)
    }
}

struct Exploder;

impl Subscribe for Exploder {
    fn on_change(&self, _events: &[LogEvent]) {
        panic!("subscriber exploded");
    }

    fn name(&self) -> &'static str {
        "exploder"
    }
}

#[test]
fn test_events_keep_append_order_and_fields() {
    let log = EventLog::new();
    let created: Vec<LogEvent> = (0..20)
        .map(|i| {
            let kind = EventKind::ALL[i % EventKind::ALL.len()];
            log.append_with(kind, format!("event {i}"), &json!({ "i": i }))
        })
        .collect();

    let all = log.get_all();
    assert_eq!(all, created);
    for (i, ev) in all.iter().enumerate() {
        assert_eq!(ev.message(), format!("event {i}"));
        assert_eq!(ev.data().unwrap()["i"], json!(i));
    }
}

#[test]
fn test_error_then_info_scenario() {
    let log = EventLog::new();
    let rec = Arc::new(Recorder::default());

    log.append(EventKind::Error, "DB timeout", None);
    let _sub = log.subscribe_arc(rec.clone());
    log.append(EventKind::Info, "retrying", None);

    let all = log.get_all();
    assert_eq!(all.len(), 2);
    assert_eq!((all[0].kind(), all[0].message()), (EventKind::Error, "DB timeout"));
    assert_eq!((all[1].kind(), all[1].message()), (EventKind::Info, "retrying"));

    let seen = rec.seen.lock();
    assert_eq!(seen.len(), 1, "subscriber must only see the second append");
    assert_eq!(seen[0], all);
}

#[test]
fn test_all_subscribers_notified_before_append_returns() {
    let log = EventLog::new();
    let recs: Vec<Arc<Recorder>> = (0..5).map(|_| Arc::new(Recorder::default())).collect();
    let _subs: Vec<_> = recs.iter().map(|r| log.subscribe_arc(r.clone())).collect();

    log.info("one");
    for r in &recs {
        assert_eq!(r.calls(), 1);
        assert_eq!(r.last_len(), Some(1));
    }
}

#[test]
fn test_subscribe_does_not_call_back_immediately() {
    let log = EventLog::new();
    log.info("before");
    let rec = Arc::new(Recorder::default());
    let _sub = log.subscribe_arc(rec.clone());
    assert_eq!(rec.calls(), 0);
}

#[test]
fn test_notifications_follow_registration_order() {
    let log = EventLog::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let subs: Vec<_> = (0..4)
        .map(|i| {
            let order = Arc::clone(&order);
            log.subscribe(move |_: &[LogEvent]| order.lock().push(i))
        })
        .collect();

    log.info("x");
    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    drop(subs);
}

#[test]
fn test_unsubscribe_removes_only_that_registration() {
    let log = EventLog::new();
    let rec = Arc::new(Recorder::default());
    let first = log.subscribe_arc(rec.clone());
    let second = log.subscribe_arc(rec.clone());
    assert_eq!(log.subscriber_count(), 2);

    log.info("a");
    assert_eq!(rec.calls(), 2);

    assert!(first.unsubscribe());
    log.info("b");
    assert_eq!(rec.calls(), 3);
    assert!(second.is_active());

    assert!(second.unsubscribe());
    log.info("c");
    assert_eq!(rec.calls(), 3);
    assert_eq!(log.subscriber_count(), 0);
}

#[test]
fn test_panicking_subscriber_is_isolated() {
    let log = EventLog::new();
    let before = Arc::new(Recorder::default());
    let after = Arc::new(Recorder::default());

    let _a = log.subscribe_arc(before.clone());
    let _b = log.subscribe(Exploder);
    let _c = log.subscribe_arc(after.clone());

    let ev = log.warning("disk almost full");

    assert_eq!(before.calls(), 1);
    assert_eq!(after.calls(), 1);
    assert_eq!(log.get_all(), vec![ev]);

    log.info("still works");
    assert_eq!(after.last_len(), Some(2));
}

#[test]
fn test_clear_notifies_with_empty_list() {
    let log = EventLog::new();
    let rec = Arc::new(Recorder::default());
    let _sub = log.subscribe_arc(rec.clone());

    for i in 0..10 {
        log.info(format!("{i}"));
    }
    log.clear();
    assert!(log.get_all().is_empty());
    assert_eq!(rec.last_len(), Some(0));

    log.clear();
    assert!(log.is_empty());
    assert_eq!(rec.calls(), 12);
    assert_eq!(rec.last_len(), Some(0));
}

#[test]
fn test_bounded_log_keeps_newest() {
    let log = EventLog::with_capacity(4);
    for i in 0..10 {
        log.sync(format!("tick {i}"));
    }
    let msgs: Vec<String> = log.get_all().iter().map(|e| e.message().to_string()).collect();
    assert_eq!(msgs, ["tick 6", "tick 7", "tick 8", "tick 9"]);
}

#[test]
fn test_concurrent_appenders_never_interleave_deliveries() {
    let log = EventLog::new();
    let lengths = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&lengths);
    let _sub = log.subscribe(move |events: &[LogEvent]| l.lock().push(events.len()));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    log.info(format!("t{t}-{i}"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let lengths = lengths.lock();
    assert_eq!(lengths.len(), 100);
    assert!(lengths.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(log.len(), 100);
}

#[test]
fn test_unsubscribe_from_inside_callback() {
    let log = EventLog::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<faultline::Subscription>>> = Arc::new(Mutex::new(None));

    let c = Arc::clone(&calls);
    let s = Arc::clone(&slot);
    let sub = log.subscribe(move |_: &[LogEvent]| {
        c.fetch_add(1, Ordering::SeqCst);
        if let Some(sub) = s.lock().take() {
            sub.unsubscribe();
        }
    });
    *slot.lock() = Some(sub);

    log.info("once");
    log.info("twice");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
