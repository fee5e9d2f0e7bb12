//! # Process-wide default dispatch.
//!
//! Most applications need exactly one dispatch context. This module holds a
//! lazily-initialized default instance plus free-function shorthands for
//! the three everyday operations, so call sites don't thread a [`Dispatch`]
//! handle through code that has no other reason to know about it.
//!
//! Code that needs isolated subscriptions (tests, embedded components)
//! constructs its own [`Dispatch`] instead; everything here is plain sugar
//! over [`default_dispatch`].
//!
//! ## Example
//! ```rust
//! use eventcast::{post_event, register_for_events, Event, SubscribeFn, SubscriberRef};
//! use serde_json::json;
//!
//! let log_all: SubscriberRef = SubscribeFn::arc("log_all", |ev: &Event| {
//!     println!("{}", ev.to_json());
//! });
//! register_for_events::<&str>(&log_all, &[]).unwrap();
//!
//! let payload = [("id".to_string(), json!(1))].into_iter().collect();
//! post_event("user_added", Some(payload)).unwrap();
//! ```

use std::sync::OnceLock;

use crate::core::dispatch::Dispatch;
use crate::error::DispatchError;
use crate::events::{Event, EventName, Payload};
use crate::subscribers::SubscriberRef;

static DEFAULT: OnceLock<Dispatch> = OnceLock::new();

/// The process-wide dispatch context, created on first use with the
/// default [`Config`](crate::Config). Lives until process exit.
pub fn default_dispatch() -> &'static Dispatch {
    DEFAULT.get_or_init(Dispatch::default)
}

/// Registers a subscriber on the default context.
///
/// An empty `names` slice subscribes to all events. See
/// [`Dispatch::register`].
pub fn register_for_events<N: EventName>(
    sub: &SubscriberRef,
    names: &[N],
) -> Result<(), DispatchError> {
    default_dispatch().register(sub, names)
}

/// Unregisters a subscriber on the default context.
///
/// An empty `names` slice removes the subscriber everywhere. See
/// [`Dispatch::unregister`].
pub fn unregister_from_events<N: EventName>(
    sub: &SubscriberRef,
    names: &[N],
) -> Result<(), DispatchError> {
    default_dispatch().unregister(sub, names)
}

/// Posts an event on the default context. See [`Dispatch::post`].
pub fn post_event(
    name: impl EventName,
    payload: Option<Payload>,
) -> Result<Event, DispatchError> {
    default_dispatch().post(name, payload)
}
