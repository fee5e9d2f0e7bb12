//! # eventcast
//!
//! **Eventcast** is a lightweight in-process publish/subscribe library for Rust.
//!
//! Components post named events (optionally carrying a JSON payload); other
//! components register callbacks for specific names or for everything.
//! Delivery is synchronous, in the posting thread, with per-subscriber
//! failure isolation. There is no transport and no persistence: the crate
//! is a building block for in-process signaling, not an event store.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   producer   │   │   producer   │   │ Notify error │
//!     │ post("a",p)  │   │ post("b",p)  │   │ (bridge)     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatch (context object; clones share state)                    │
//! │  - Registry (name → subscribers, plus wildcard bucket)            │
//! │  - Event log (bounded ring, test/debug support)                   │
//! │  - EventMapper (feature `mapper`)                                 │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   sub.on_event(&ev)  sub.on_event(&ev)  sub.on_event(&ev)
//!   (exact match)      (exact match)      (wildcard)
//!        │                  │                  │
//!        └── panic? caught, logged, delivery continues ──┘
//! ```
//!
//! ### Delivery
//! ```text
//! post(name, payload)
//!   ├─► validate name (empty → InvalidName)
//!   ├─► Event::new(name, payload)        assigns id + timestamp
//!   ├─► Registry::resolve(name)          one read-lock snapshot:
//!   │       exact-name subscribers (registration order),
//!   │       then wildcard subscribers, deduplicated
//!   ├─► invoke each subscriber synchronously (catch_unwind per call)
//!   └─► return the Event to the poster
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                  |
//! |-----------------|----------------------------------------------------------|-------------------------------------|
//! | **Events**      | Immutable occurrence records with ids and payloads.      | [`Event`], [`Payload`]              |
//! | **Subscribers** | Callback contract and closure adapter.                   | [`Subscribe`], [`SubscribeFn`]      |
//! | **Dispatch**    | Registration, synchronous delivery, failure isolation.   | [`Dispatch`], [`Config`]            |
//! | **Naming**      | Typed namespaced event-name constants.                   | [`NamespacedName`], [`EventName`]   |
//! | **Error bridge**| Recognized errors post a canonical event once.           | [`Notify`], [`NotifiableError`]     |
//! | **Properties**  | Global named values with set-once semantics.             | [`Properties`], [`properties`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogSubscriber`] _(demo/reference only)_.
//! - `mapper`: exposes event mapping (post one event once a set of watched
//!   events has occurred).
//!
//! ## Example
//! ```rust
//! use eventcast::{Dispatch, Event, Payload, SubscribeFn, SubscriberRef};
//! use serde_json::json;
//!
//! let dispatch = Dispatch::default();
//!
//! // Register a wildcard subscriber (empty name list = all events).
//! let log_all: SubscriberRef = SubscribeFn::arc("log_all", |ev: &Event| {
//!     println!("[{}] {}", ev.id(), ev.name());
//! });
//! dispatch.register_all(&log_all).unwrap();
//!
//! // Post an event with a payload; the subscriber runs before post returns.
//! let payload: Payload = [("id".to_string(), json!(1)), ("name".to_string(), json!("Jane"))]
//!     .into_iter()
//!     .collect();
//! let ev = dispatch.post("user_added", Some(payload)).unwrap();
//! assert_eq!(ev.name(), "user_added");
//! ```
mod core;
mod error;
mod events;
mod properties;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    default_dispatch, post_event, register_for_events, unregister_from_events, Config, Dispatch,
    DispatchBuilder,
};
pub use error::{DispatchError, NotifiableError, Notify};
pub use events::{DispatchEvent, Event, EventName, NamespacedName, Payload};
pub use properties::{properties, Properties, PropertyError, SetOptions};
pub use subscribers::{Subscribe, SubscribeFn, SubscriberRef};

// Optional: expose the event mapping facility.
// Enable with: `--features mapper`
#[cfg(feature = "mapper")]
pub use crate::core::MapperEvent;

// Optional: expose a simple built-in logging subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogSubscriber;
