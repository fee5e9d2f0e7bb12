//! # Demo: workers
//!
//! Two worker threads post namespaced lifecycle events; a wildcard
//! [`LogSubscriber`] traces the whole stream while a console consumer
//! watches heartbeats only.
//!
//! Shows how to:
//! - Implement [`NamespacedName`] for typed event constants.
//! - Register wildcard and exact-name subscribers.
//! - Post events with payloads from multiple threads.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example workers --features logging
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use eventcast::{
    Dispatch, Event, LogSubscriber, NamespacedName, SubscribeFn, SubscriberRef,
};
use serde_json::json;

#[derive(Clone, Copy)]
enum WorkerEvent {
    Started,
    Heartbeat,
    Stopped,
}

impl NamespacedName for WorkerEvent {
    fn namespace(&self) -> &str {
        "worker"
    }

    fn value(&self) -> &str {
        match self {
            WorkerEvent::Started => "started",
            WorkerEvent::Heartbeat => "heartbeat",
            WorkerEvent::Stopped => "stopped",
        }
    }
}

fn run_worker(dispatch: Dispatch, name: &'static str, beats: u32) {
    let tagged = |extra: Option<(&str, serde_json::Value)>| {
        let mut p = eventcast::Payload::new();
        p.insert("worker".to_string(), json!(name));
        if let Some((k, v)) = extra {
            p.insert(k.to_string(), v);
        }
        Some(p)
    };

    dispatch.post(WorkerEvent::Started, tagged(None)).unwrap();
    for beat in 1..=beats {
        thread::sleep(Duration::from_millis(100));
        dispatch
            .post(WorkerEvent::Heartbeat, tagged(Some(("beat", json!(beat)))))
            .unwrap();
    }
    dispatch.post(WorkerEvent::Stopped, tagged(None)).unwrap();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let dispatch = Dispatch::default();

    // Trace everything.
    let log: SubscriberRef = Arc::new(LogSubscriber);
    dispatch.register_all(&log).unwrap();

    // Watch heartbeats only.
    let beats: SubscriberRef = SubscribeFn::arc("console", |ev: &Event| {
        let p = ev.payload().expect("heartbeats carry a payload");
        println!("[beat] worker={} n={}", p["worker"], p["beat"]);
    });
    dispatch.register(&beats, &[WorkerEvent::Heartbeat]).unwrap();

    let workers: Vec<_> = [("alpha", 3), ("bravo", 5)]
        .into_iter()
        .map(|(name, beats)| {
            let d = dispatch.clone();
            thread::spawn(move || run_worker(d, name, beats))
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    println!("finished");
}
