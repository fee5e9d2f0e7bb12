//! # Closure-backed subscriber (`SubscribeFn`)
//!
//! [`SubscribeFn`] wraps a closure `F: Fn(&Event)`, which covers the common
//! case where a full [`Subscribe`] type is not worth writing. The closure is
//! `Fn`, not `FnMut`: shared state goes through `Arc<...>` explicitly inside
//! the closure.
//!
//! ## Example
//! ```rust
//! use eventcast::{Event, SubscribeFn, SubscriberRef};
//!
//! let log_all: SubscriberRef = SubscribeFn::arc("log_all", |ev: &Event| {
//!     println!("got {}", ev.name());
//! });
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Closure-backed subscriber implementation.
pub struct SubscribeFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SubscribeFn<F> {
    /// Creates a new closure-backed subscriber.
    ///
    /// Prefer [`SubscribeFn::arc`] when you immediately need a
    /// [`SubscriberRef`](crate::SubscriberRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Subscribe for SubscribeFn<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        (self.f)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_invokes_closure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in = Arc::clone(&hits);
        let sub = SubscribeFn::new("counter", move |_ev: &Event| {
            hits_in.fetch_add(1, Ordering::SeqCst);
        });

        sub.on_event(&Event::new("x", None));
        sub.on_event(&Event::new("y", None));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_static_name_reported() {
        let sub = SubscribeFn::new("counter", |_ev: &Event| {});
        assert_eq!(sub.name(), "counter");
    }
}
