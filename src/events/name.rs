//! # Namespaced event-name constants.
//!
//! Event names are flat strings at the registry level, but call sites are
//! better served by typed constants. [`NamespacedName`] is the capability a
//! constant type implements to report its namespace and short value; the
//! provided [`full_name`](NamespacedName::full_name) resolves the pair into
//! the flat dotted name the registry uses. Resolution is a pure string
//! concatenation with no state and no failure mode.
//!
//! [`EventName`] is the conversion accepted by `post`/`register`, so both
//! flat strings and namespaced constants work at the call site.
//!
//! ## Example
//! ```rust
//! use eventcast::NamespacedName;
//!
//! enum WorkerEvent {
//!     Started,
//!     Stopped,
//! }
//!
//! impl NamespacedName for WorkerEvent {
//!     fn namespace(&self) -> &str {
//!         "worker"
//!     }
//!
//!     fn value(&self) -> &str {
//!         match self {
//!             WorkerEvent::Started => "started",
//!             WorkerEvent::Stopped => "stopped",
//!         }
//!     }
//! }
//!
//! assert_eq!(WorkerEvent::Started.full_name(), "worker.started");
//! ```

use std::borrow::Cow;

/// Capability of a typed event-name constant: a namespace plus a short value.
///
/// An empty namespace is allowed and resolves to the bare value (no dot).
pub trait NamespacedName {
    /// Namespace prefix, without the trailing dot.
    fn namespace(&self) -> &str;

    /// Short constant value.
    fn value(&self) -> &str;

    /// Resolves to the flat event name: `namespace + "." + value`,
    /// or just `value` when the namespace is empty.
    fn full_name(&self) -> String {
        let ns = self.namespace();
        if ns.is_empty() {
            self.value().to_string()
        } else {
            format!("{ns}.{}", self.value())
        }
    }
}

/// Anything `post`/`register` accept as an event name.
///
/// Implemented for `str`/`String` (used as-is) and for every
/// [`NamespacedName`] constant (resolved via
/// [`full_name`](NamespacedName::full_name)).
pub trait EventName {
    /// The flat name the registry keys on.
    fn to_event_name(&self) -> Cow<'_, str>;
}

impl EventName for str {
    fn to_event_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl EventName for &str {
    fn to_event_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(*self)
    }
}

impl EventName for String {
    fn to_event_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: NamespacedName> EventName for T {
    fn to_event_name(&self) -> Cow<'_, str> {
        Cow::Owned(self.full_name())
    }
}

/// Administrative events posted by the dispatcher itself
/// (when [`Config::admin_events`](crate::Config::admin_events) is on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEvent {
    /// A subscriber was added under at least one new name (or the wildcard).
    ///
    /// Payload:
    /// - `events`: list of registered names (empty list = wildcard)
    /// - `subscriber`: subscriber name
    SubscriberRegistered,

    /// A subscriber was removed from at least one name (or fully).
    ///
    /// Payload:
    /// - `events`: list of unregistered names (empty list = full unregistration)
    /// - `subscriber`: subscriber name
    SubscriberUnregistered,
}

impl NamespacedName for DispatchEvent {
    fn namespace(&self) -> &str {
        "dispatch"
    }

    fn value(&self) -> &str {
        match self {
            DispatchEvent::SubscriberRegistered => "subscriber_registered",
            DispatchEvent::SubscriberUnregistered => "subscriber_unregistered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl NamespacedName for Bare {
        fn namespace(&self) -> &str {
            ""
        }

        fn value(&self) -> &str {
            "event1"
        }
    }

    struct Namespaced;

    impl NamespacedName for Namespaced {
        fn namespace(&self) -> &str {
            "my_parent"
        }

        fn value(&self) -> &str {
            "event1"
        }
    }

    #[test]
    fn test_full_name_with_namespace() {
        assert_eq!(Namespaced.full_name(), "my_parent.event1");
    }

    #[test]
    fn test_full_name_empty_namespace() {
        assert_eq!(Bare.full_name(), "event1");
    }

    #[test]
    fn test_event_name_for_strings() {
        assert_eq!("plain".to_event_name(), "plain");
        assert_eq!("owned".to_string().to_event_name(), "owned");
    }

    #[test]
    fn test_event_name_for_constants() {
        assert_eq!(Namespaced.to_event_name(), "my_parent.event1");
    }

    #[test]
    fn test_dispatch_event_names() {
        assert_eq!(
            DispatchEvent::SubscriberRegistered.full_name(),
            "dispatch.subscriber_registered"
        );
        assert_eq!(
            DispatchEvent::SubscriberUnregistered.full_name(),
            "dispatch.subscriber_unregistered"
        );
    }
}
