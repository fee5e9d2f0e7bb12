//! # Event value: one named occurrence with optional payload.
//!
//! [`Event`] is the immutable record handed to every subscriber. It carries:
//! - `name`: flat (possibly dot-namespaced) event name
//! - `id`: process-unique, monotonically increasing sequence number
//! - `at`: wall-clock timestamp captured at construction
//! - `payload`: optional key/value data, shared (not deep-copied)
//!
//! ## Ordering guarantees
//! Ids come from a single global counter and increase monotonically, so they
//! restore construction order even when wall-clock timestamps collide or step
//! backwards. Timestamps are for humans; ids are for ordering.
//!
//! ## Payload sharing
//! The payload is stored behind an `Arc` and is never cloned per subscriber.
//! Subscribers observe it through `&Event`, which hands out shared immutable
//! access only.
//!
//! ## Example
//! ```rust
//! use eventcast::{Event, Payload};
//! use serde_json::json;
//!
//! let payload: Payload = [("id".to_string(), json!(1))].into_iter().collect();
//! let ev = Event::new("user_added", Some(payload));
//!
//! assert_eq!(ev.name(), "user_added");
//! assert_eq!(ev.payload().unwrap()["id"], json!(1));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Value};

/// Key/value data attached to an event.
pub type Payload = serde_json::Map<String, Value>;

/// Global sequence counter for event ids.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Immutable record of one occurrence.
///
/// Constructed only through [`Event::new`]; `id` and `at` are never
/// caller-supplied. Cloning is cheap (the name and payload are shared).
#[derive(Clone, Debug)]
pub struct Event {
    name: Arc<str>,
    id: u64,
    at: SystemTime,
    payload: Option<Arc<Payload>>,
}

impl Event {
    /// Creates a new event, assigning the next id and the current timestamp.
    ///
    /// The name is taken as-is; [`Dispatch::post`](crate::Dispatch::post)
    /// rejects empty names before any event is constructed.
    pub fn new(name: impl Into<Arc<str>>, payload: Option<Payload>) -> Self {
        Self {
            name: name.into(),
            id: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            payload: payload.map(Arc::new),
        }
    }

    /// Flat event name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique sequence number, increasing in construction order.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wall-clock timestamp captured at construction.
    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.at
    }

    /// Timestamp as fractional seconds since the Unix epoch.
    ///
    /// Returns `0.0` for timestamps before the epoch (clock stepped back).
    pub fn time_secs(&self) -> f64 {
        self.at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Payload, if one was supplied at construction.
    #[inline]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_deref()
    }

    /// Projects the event into a JSON value.
    ///
    /// Shape: `{"id": u64, "time": f64, "name": str, "payload": object}`,
    /// with an empty object when no payload was supplied.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "time": self.time_secs(),
            "name": self.name.as_ref(),
            "payload": self.payload.as_deref().cloned().unwrap_or_default(),
        })
    }
}

impl Serialize for Event {
    /// Serializes with the same shape as [`Event::to_json`].
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let empty = Payload::new();

        let mut st = serializer.serialize_struct("Event", 4)?;
        st.serialize_field("id", &self.id)?;
        st.serialize_field("time", &self.time_secs())?;
        st.serialize_field("name", self.name.as_ref())?;
        st.serialize_field("payload", self.payload.as_deref().unwrap_or(&empty))?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(pairs: &[(&str, Value)]) -> Payload {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_ids_unique_and_increasing() {
        let a = Event::new("a", None);
        let b = Event::new("b", None);
        let c = Event::new("c", None);
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_accessors() {
        let ev = Event::new("user_added", Some(payload(&[("id", json!(1))])));
        assert_eq!(ev.name(), "user_added");
        assert_eq!(ev.payload().unwrap()["id"], json!(1));
        assert!(ev.time_secs() > 0.0);
    }

    #[test]
    fn test_absent_payload() {
        let ev = Event::new("bare", None);
        assert!(ev.payload().is_none());
    }

    #[test]
    fn test_to_json_shape() {
        let ev = Event::new("x", Some(payload(&[("k", json!("v"))])));
        let j = ev.to_json();
        assert_eq!(j["name"], json!("x"));
        assert_eq!(j["id"], json!(ev.id()));
        assert_eq!(j["payload"]["k"], json!("v"));
    }

    #[test]
    fn test_to_json_empty_payload_object() {
        let ev = Event::new("x", None);
        assert_eq!(ev.to_json()["payload"], json!({}));
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let ev = Event::new("x", Some(payload(&[("k", json!(1))])));
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v, ev.to_json());
    }

    #[test]
    fn test_clone_shares_payload() {
        let ev = Event::new("x", Some(payload(&[("k", json!(1))])));
        let dup = ev.clone();
        let a = ev.payload().unwrap() as *const Payload;
        let b = dup.payload().unwrap() as *const Payload;
        assert_eq!(a, b);
    }
}
