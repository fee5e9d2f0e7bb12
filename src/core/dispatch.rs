//! # Dispatch context - registration, posting, delivery.
//!
//! [`Dispatch`] is the context object that ties a [`Registry`] to the
//! posting path. Producers call [`Dispatch::post`]; consumers call
//! [`Dispatch::register`] / [`Dispatch::unregister`]. Cloning a `Dispatch`
//! is cheap and every clone shares the same registry and event log.
//!
//! ## Delivery model
//! ```text
//! post(name, payload)
//!     ├─► validate flat name (empty → InvalidName)
//!     ├─► Event::new(name, payload)
//!     ├─► Registry::resolve(name)        (one read-lock snapshot)
//!     └─► for each subscriber:           (posting thread, no lock held)
//!           catch_unwind(on_event(&event))
//!               └─ panic → tracing::error, delivery continues
//! ```
//!
//! ## Rules
//! - Delivery is synchronous: `post` returns only after every resolved
//!   subscriber ran (or panicked and was caught). A hung subscriber hangs
//!   the poster; there is no timeout or cancellation.
//! - Subscriber panics never reach the poster and are not converted into
//!   events (that would invite feedback storms). Subscribers that want the
//!   error bridge raise a [`Notify`](crate::Notify) error explicitly.
//! - A post races cleanly with register/unregister on other threads: it
//!   delivers to the registry state before or after the mutation, never to
//!   a torn state.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::core::config::Config;
use crate::core::registry::Registry;
use crate::error::{bridge_payload, DispatchError, Notify};
use crate::events::{DispatchEvent, Event, EventName, NamespacedName, Payload};
use crate::subscribers::{Subscribe, SubscriberRef};

#[cfg(feature = "mapper")]
use std::sync::OnceLock;

#[cfg(feature = "mapper")]
use crate::core::mapper::EventMapper;

/// Shared state behind every clone of a [`Dispatch`].
pub(crate) struct DispatchInner {
    registry: Registry,
    config: Config,
    log_events: AtomicBool,
    log_unhandled: AtomicBool,
    event_log: Mutex<VecDeque<Event>>,

    #[cfg(feature = "mapper")]
    mapper: OnceLock<Arc<EventMapper>>,
}

/// Event-name constant for bridged errors: namespace `error`, value = code.
struct ErrorName<'a>(&'a str);

impl NamespacedName for ErrorName<'_> {
    fn namespace(&self) -> &str {
        "error"
    }

    fn value(&self) -> &str {
        self.0
    }
}

/// Extracts a printable message from a caught panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// In-process publish/subscribe context.
///
/// Construct one per scope that needs isolated subscriptions, or use the
/// process-wide [`default_dispatch`](crate::default_dispatch) for the
/// common single-context case. Clones share all state.
#[derive(Clone)]
pub struct Dispatch {
    inner: Arc<DispatchInner>,
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Dispatch {
    /// Creates a dispatch context with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(DispatchInner {
                registry: Registry::new(),
                config,
                log_events: AtomicBool::new(false),
                log_unhandled: AtomicBool::new(false),
                event_log: Mutex::new(VecDeque::new()),

                #[cfg(feature = "mapper")]
                mapper: OnceLock::new(),
            }),
        }
    }

    /// Starts a builder for a context with initial subscriptions.
    pub fn builder(config: Config) -> crate::core::builder::DispatchBuilder {
        crate::core::builder::DispatchBuilder::new(config)
    }

    #[cfg(feature = "mapper")]
    pub(crate) fn from_inner(inner: Arc<DispatchInner>) -> Self {
        Self { inner }
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a subscriber for the listed event names.
    ///
    /// An empty `names` slice subscribes to **all** events (wildcard).
    /// Registration is idempotent per (subscriber, name) pair and per
    /// (subscriber, wildcard); names need no pre-declaration.
    ///
    /// # Errors
    /// [`DispatchError::InvalidName`] if any name resolves to the empty
    /// string; nothing is registered in that case.
    pub fn register<N: EventName>(
        &self,
        sub: &SubscriberRef,
        names: &[N],
    ) -> Result<(), DispatchError> {
        let names = Self::validate(names)?;
        let changed = self.inner.registry.register(sub, &names);

        if changed {
            debug!(subscriber = sub.name(), events = ?names, "registered");
            self.post_admin_event(DispatchEvent::SubscriberRegistered, sub, &names);
        }
        Ok(())
    }

    /// Registers a subscriber for every event, whatever the name.
    ///
    /// Shorthand for `register(sub, &[] as &[&str])`.
    pub fn register_all(&self, sub: &SubscriberRef) -> Result<(), DispatchError> {
        self.register::<&str>(sub, &[])
    }

    /// Unregisters a subscriber from the listed event names.
    ///
    /// An empty `names` slice removes the subscriber everywhere: from the
    /// wildcard set and from every specific name it was registered under.
    /// Removing a subscription that does not exist is a no-op.
    ///
    /// # Errors
    /// [`DispatchError::InvalidName`] if any name resolves to the empty
    /// string; nothing is unregistered in that case.
    pub fn unregister<N: EventName>(
        &self,
        sub: &SubscriberRef,
        names: &[N],
    ) -> Result<(), DispatchError> {
        let names = Self::validate(names)?;
        let changed = self.inner.registry.unregister(sub, &names);

        if changed {
            debug!(subscriber = sub.name(), events = ?names, "unregistered");
            self.post_admin_event(DispatchEvent::SubscriberUnregistered, sub, &names);
        }
        Ok(())
    }

    /// Removes every subscription (test support).
    pub fn clear_subscribers(&self) {
        self.inner.registry.clear();
    }

    /// Snapshot of registrations: subscriber names per event name, wildcard
    /// subscribers under `"*"`. Diagnostic/test support.
    pub fn snapshot(&self) -> HashMap<String, Vec<String>> {
        self.inner.registry.snapshot()
    }

    // ---------------------------
    // Posting
    // ---------------------------

    /// Posts an event: constructs the [`Event`], resolves subscribers
    /// (exact-name matches plus wildcard subscribers, each at most once)
    /// and invokes them synchronously in the calling thread.
    ///
    /// Returns the constructed event regardless of subscriber outcomes.
    ///
    /// # Errors
    /// [`DispatchError::InvalidName`] if `name` resolves to the empty
    /// string; no event is constructed in that case.
    pub fn post(
        &self,
        name: impl EventName,
        payload: Option<Payload>,
    ) -> Result<Event, DispatchError> {
        let flat = name.to_event_name();
        if flat.is_empty() {
            return Err(DispatchError::InvalidName);
        }
        Ok(self.deliver(Event::new(flat.as_ref(), payload)))
    }

    /// Posts the canonical error event for `err` and hands the error back.
    ///
    /// The event is named `error.<code>`; its payload is the error's payload
    /// merged with the code (under `error`, kept when already present) and
    /// the display message (under `message`, when non-empty). Each call
    /// posts exactly once; propagating the returned error never re-posts.
    pub fn notify<E: Notify>(&self, err: E) -> E {
        self.post_error_event(&err);
        err
    }

    pub(crate) fn post_error_event(&self, err: &dyn Notify) {
        let name = ErrorName(err.error_code()).full_name();
        let payload = bridge_payload(err, &err.to_string());
        self.deliver(Event::new(name, Some(payload)));
    }

    /// Constructs and delivers; the name is already validated.
    fn deliver(&self, event: Event) -> Event {
        let subs = self.inner.registry.resolve(event.name());
        self.capture(&event, !subs.is_empty());

        if subs.is_empty() {
            debug!(event = event.name(), "not propagating, no subscribers");
            return event;
        }

        debug!(
            event = event.name(),
            id = event.id(),
            subscribers = subs.len(),
            "posting event"
        );

        for sub in &subs {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sub.on_event(&event))) {
                let info = panic_message(&*panic);
                error!(
                    subscriber = sub.name(),
                    event = event.name(),
                    panic = %info,
                    "subscriber panicked, continuing delivery"
                );
            }
        }
        event
    }

    // ---------------------------
    // Event log (test/debug support)
    // ---------------------------

    /// Enables or disables capture of posted events into the recent-event
    /// ring buffer. Off by default.
    pub fn set_event_logging(&self, enabled: bool) {
        self.inner
            .log_events
            .store(enabled, AtomicOrdering::Relaxed);
    }

    /// When event logging is on, also capture events that resolved to zero
    /// subscribers. Off by default.
    pub fn log_unhandled_events(&self, enabled: bool) {
        self.inner
            .log_unhandled
            .store(enabled, AtomicOrdering::Relaxed);
    }

    /// Returns the captured recent events, oldest first.
    pub fn event_log(&self) -> Vec<Event> {
        let log = self.inner.event_log.lock().unwrap_or_else(|e| e.into_inner());
        log.iter().cloned().collect()
    }

    /// Clears the captured recent events.
    pub fn clear_event_log(&self) {
        let mut log = self.inner.event_log.lock().unwrap_or_else(|e| e.into_inner());
        log.clear();
    }

    fn capture(&self, event: &Event, delivered: bool) {
        if !self.inner.log_events.load(AtomicOrdering::Relaxed) {
            return;
        }
        if !delivered && !self.inner.log_unhandled.load(AtomicOrdering::Relaxed) {
            return;
        }
        let cap = self.inner.config.event_log_capacity_clamped();
        let mut log = self.inner.event_log.lock().unwrap_or_else(|e| e.into_inner());
        log.push_back(event.clone());
        while log.len() > cap {
            log.pop_front();
        }
    }

    // ---------------------------
    // Event mapping (feature `mapper`)
    // ---------------------------

    /// Maps a set of watched events to one event posted when all of them
    /// have occurred. See [`EventMapper`](crate::core::mapper) for matching
    /// rules. Returns the mapping key.
    ///
    /// # Errors
    /// - [`DispatchError::InvalidMapping`] when `events_to_map` is empty.
    /// - [`DispatchError::MappingExists`] when a mapping for the same watch
    ///   list exists and `ignore_if_exists` is false; with
    ///   `ignore_if_exists` the existing key is returned instead.
    #[cfg(feature = "mapper")]
    pub fn map_events(
        &self,
        events_to_map: Vec<Event>,
        event_to_post: Event,
        ignore_if_exists: bool,
    ) -> Result<String, DispatchError> {
        self.mapper()
            .map_events(self, events_to_map, event_to_post, ignore_if_exists)
    }

    /// Removes an event mapping by key, posting `mapper.mapping_removed`.
    ///
    /// # Errors
    /// [`DispatchError::MappingNotFound`] when no mapping has that key.
    #[cfg(feature = "mapper")]
    pub fn remove_event_map(&self, key: &str) -> Result<(), DispatchError> {
        self.mapper().remove_by_key(self, key)
    }

    /// Keys of the currently active event mappings.
    #[cfg(feature = "mapper")]
    pub fn event_maps(&self) -> Vec<String> {
        self.mapper().keys()
    }

    #[cfg(feature = "mapper")]
    fn mapper(&self) -> Arc<EventMapper> {
        let mapper = self
            .inner
            .mapper
            .get_or_init(|| Arc::new(EventMapper::new(Arc::downgrade(&self.inner))));

        // Trigger events drive map cleanup. Registration is idempotent per
        // Arc identity, so repeating it here is a cheap no-op; the name is
        // ours, so it cannot fail validation.
        let as_sub: SubscriberRef = Arc::clone(mapper) as SubscriberRef;
        let _ = self.register(&as_sub, &[crate::MapperEvent::MappingTriggered]);
        Arc::clone(mapper)
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    /// Resolves and validates a name list; empty flat names are rejected
    /// before any state changes.
    fn validate<N: EventName>(names: &[N]) -> Result<Vec<String>, DispatchError> {
        let mut flat = Vec::with_capacity(names.len());
        for name in names {
            let name = name.to_event_name();
            if name.is_empty() {
                return Err(DispatchError::InvalidName);
            }
            flat.push(name.into_owned());
        }
        Ok(flat)
    }

    /// Posts the administrative registration event when enabled.
    ///
    /// Runs after the registry mutation, with no lock held.
    fn post_admin_event(&self, kind: DispatchEvent, sub: &SubscriberRef, names: &[String]) {
        if !self.inner.config.admin_events {
            return;
        }
        let payload: Payload = [
            ("events".to_string(), serde_json::json!(names)),
            ("subscriber".to_string(), serde_json::json!(sub.name())),
        ]
        .into_iter()
        .collect();
        self.deliver(Event::new(kind.full_name(), Some(payload)));
    }
}
