//! Dispatch core: registry, delivery and the context object.
//!
//! The public API from this module is [`Dispatch`] (plus its [`Config`],
//! [`DispatchBuilder`] and the default-instance facade); the registry is an
//! implementation detail behind it.
//!
//! ## Wiring
//! ```text
//! register(sub, names) ──► Registry (write lock)
//!                             │        └─► admin event (optional)
//! post(name, payload) ──► Event::new ──► Registry::resolve (read lock)
//!                                             │
//!                                             ▼  snapshot, no lock held
//!                                  sub.on_event(&event)  × N
//!                                  (catch_unwind per subscriber)
//! ```
//!
//! Internal modules:
//! - [`registry`]: name → subscriber buckets plus the wildcard bucket;
//! - [`dispatch`]: validation, delivery, failure isolation, error bridge;
//! - [`builder`]: construction with initial subscriptions;
//! - [`global`]: process-wide default instance and facade functions;
//! - [`mapper`] (feature `mapper`): post-one-event-after-many mappings.

mod builder;
mod config;
mod dispatch;
mod global;
mod registry;

#[cfg(feature = "mapper")]
mod mapper;

pub use builder::DispatchBuilder;
pub use config::Config;
pub use dispatch::Dispatch;
pub use global::{default_dispatch, post_event, register_for_events, unregister_from_events};

#[cfg(feature = "mapper")]
pub use mapper::MapperEvent;
