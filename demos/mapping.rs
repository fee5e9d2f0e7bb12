//! # Demo: mapping
//!
//! Maps two worker-readiness events onto one combined event: nothing is
//! posted until both watched events have occurred, then the combined event
//! fires exactly once and the mapping removes itself.
//!
//! ## Flow
//! ```text
//! map_events([alpha_ready, bravo_ready], all_ready)
//! post(alpha_ready) ─► (waiting)
//! post(bravo_ready) ─► post(all_ready) ─► mapping removed
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example mapping --features logging,mapper
//! ```

use std::sync::Arc;

use eventcast::{Dispatch, Event, LogSubscriber, SubscribeFn, SubscriberRef};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let dispatch = Dispatch::default();

    let log: SubscriberRef = Arc::new(LogSubscriber);
    dispatch.register_all(&log).unwrap();

    let ready: SubscriberRef = SubscribeFn::arc("ready", |ev: &Event| {
        println!("all workers ready: {}", ev.to_json());
    });
    dispatch.register(&ready, &["workers.all_ready"]).unwrap();

    let key = dispatch
        .map_events(
            vec![
                Event::new("worker.alpha_ready", None),
                Event::new("worker.bravo_ready", None),
            ],
            Event::new(
                "workers.all_ready",
                Some(
                    [("count".to_string(), json!(2))]
                        .into_iter()
                        .collect(),
                ),
            ),
            false,
        )
        .unwrap();
    println!("mapping created: key={key}");

    dispatch.post("worker.alpha_ready", None).unwrap();
    println!("alpha ready, waiting for bravo...");

    dispatch.post("worker.bravo_ready", None).unwrap();
    println!("active mappings left: {}", dispatch.event_maps().len());
}
