//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the closure adapter
//! [`SubscribeFn`], and the built-in [`LogSubscriber`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   producer ── post(name, payload) ──► Dispatch ── resolve(name) ──► Registry
//!                                          │
//!                                          ▼  (synchronous, posting thread)
//!                                   Subscribe::on_event(&Event)
//!                                          │
//!                                ┌─────────┼─────────┐
//!                                ▼         ▼         ▼
//!                           SubscribeFn  LogSubscriber  custom...
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use eventcast::{Event, Subscribe};
//!
//! struct Metrics;
//!
//! impl Subscribe for Metrics {
//!     fn on_event(&self, event: &Event) {
//!         if event.name().ends_with(".failed") {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

mod sub_fn;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use sub_fn::SubscribeFn;
pub use subscribe::{Subscribe, SubscriberRef};

#[cfg(feature = "logging")]
pub use log::LogSubscriber;
