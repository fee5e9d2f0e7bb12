//! Error types and the error-to-event bridge.
//!
//! This module defines:
//!
//! - [`DispatchError`] — errors raised by the dispatch machinery itself.
//! - [`Notify`] — the recognized error capability: any error reporting a
//!   stable code and a structured payload can be bridged into an event.
//! - [`NotifiableError`] — a concrete base error whose factory posts the
//!   canonical event at construction time.
//!
//! ## Bridge semantics
//! Bridging an error posts exactly one event per emission, named
//! `error.<code>` (the `error` namespace composed with the error's code),
//! whose payload carries the caller-supplied payload merged with the code
//! and the human-readable message. The error value then propagates through
//! ordinary `Result` plumbing; catching and returning it again never
//! re-posts. The event is a side channel, not a substitute for propagation.
//!
//! Emission happens in explicit factories — [`NotifiableError::emit`] and
//! [`Dispatch::notify`](crate::Dispatch::notify) — so the side effect is
//! visible at the call site and testable without interception machinery.

use serde_json::json;
use thiserror::Error;

use crate::events::Payload;

/// # Errors produced by the dispatch machinery.
///
/// None of these occur in normal operation; they signal malformed input at
/// the call site (empty event names, bad mapping requests).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An event name resolved to the empty string.
    #[error("event name must be a non-empty string")]
    InvalidName,

    /// An event-mapping request carried no events to watch.
    #[cfg(feature = "mapper")]
    #[error("event mapping requires at least one event to watch")]
    InvalidMapping,

    /// An event mapping for the same watch list already exists.
    #[cfg(feature = "mapper")]
    #[error("event mapping already exists for key {key}")]
    MappingExists {
        /// Key of the existing mapping.
        key: String,
    },

    /// No event mapping was found for the given key.
    #[cfg(feature = "mapper")]
    #[error("no event mapping found for key {key}")]
    MappingNotFound {
        /// The key that was looked up.
        key: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventcast::DispatchError;
    ///
    /// assert_eq!(DispatchError::InvalidName.as_label(), "invalid_event_name");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::InvalidName => "invalid_event_name",
            #[cfg(feature = "mapper")]
            DispatchError::InvalidMapping => "invalid_mapping_events",
            #[cfg(feature = "mapper")]
            DispatchError::MappingExists { .. } => "duplicate_mapping",
            #[cfg(feature = "mapper")]
            DispatchError::MappingNotFound { .. } => "mapping_not_found",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

impl Notify for DispatchError {
    fn error_code(&self) -> &str {
        self.as_label()
    }

    fn payload(&self) -> Option<Payload> {
        match self {
            DispatchError::InvalidName => None,
            #[cfg(feature = "mapper")]
            DispatchError::InvalidMapping => None,
            #[cfg(feature = "mapper")]
            DispatchError::MappingExists { key } | DispatchError::MappingNotFound { key } => Some(
                [("key".to_string(), json!(key))].into_iter().collect(),
            ),
        }
    }
}

/// # Recognized error capability.
///
/// Implementing `Notify` marks an error type as bridgeable: passing a value
/// to [`Dispatch::notify`](crate::Dispatch::notify) posts the canonical
/// `error.<code>` event exactly once and hands the value back for normal
/// propagation.
pub trait Notify: std::error::Error {
    /// Short stable error code (snake_case); becomes the event-name suffix.
    fn error_code(&self) -> &str;

    /// Structured data describing the failure; merged into the event payload.
    fn payload(&self) -> Option<Payload> {
        None
    }
}

/// # Base error for application-defined bridged errors.
///
/// Carries the three bridge fields — message, code, payload — for callers
/// that don't need a dedicated error type. [`NotifiableError::emit`] posts
/// the canonical event at construction; the returned value is an ordinary
/// error afterwards, and re-propagating it never posts again.
///
/// ## Example
/// ```rust
/// use eventcast::{Dispatch, NotifiableError};
/// use serde_json::json;
///
/// fn load(dispatch: &Dispatch) -> Result<(), NotifiableError> {
///     Err(NotifiableError::emit(
///         dispatch,
///         "config file missing",
///         "config_missing",
///         Some([("path".to_string(), json!("app.toml"))].into_iter().collect()),
///     ))
/// }
///
/// let dispatch = Dispatch::default();
/// let err = load(&dispatch).unwrap_err();
/// assert_eq!(err.error_code(), "config_missing");
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct NotifiableError {
    message: String,
    code: String,
    payload: Option<Payload>,
}

impl NotifiableError {
    /// Constructs the error and posts its `error.<code>` event.
    ///
    /// This is the only constructor: creating the value and emitting the
    /// event are one step, which is what guarantees exactly-once emission
    /// no matter how often the error is later caught and returned.
    pub fn emit(
        dispatch: &crate::Dispatch,
        message: impl Into<String>,
        code: impl Into<String>,
        payload: Option<Payload>,
    ) -> Self {
        let err = Self {
            message: message.into(),
            code: code.into(),
            payload,
        };
        dispatch.post_error_event(&err);
        err
    }

    /// Error code supplied at construction.
    #[inline]
    pub fn error_code(&self) -> &str {
        &self.code
    }

    /// Human-readable message supplied at construction.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Notify for NotifiableError {
    fn error_code(&self) -> &str {
        &self.code
    }

    fn payload(&self) -> Option<Payload> {
        self.payload.clone()
    }
}

/// Builds the canonical payload for a bridged error: the caller payload
/// merged with `error` (kept if already present) and `message` (when
/// non-empty).
pub(crate) fn bridge_payload(err: &dyn Notify, message: &str) -> Payload {
    let mut payload = err.payload().unwrap_or_default();
    if !payload.contains_key("error") {
        payload.insert("error".to_string(), json!(err.error_code()));
    }
    if !message.is_empty() {
        payload.insert("message".to_string(), json!(message));
    }
    payload
}
