//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogSubscriber`] forwards every event it receives to `tracing` at debug
//! level, with the event name, id and payload as structured fields. Register
//! it with an empty name list to log the whole event stream.
//!
//! Not intended for production use - implement a custom [`Subscribe`] for
//! metrics or application logging.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use eventcast::{Dispatch, LogSubscriber, SubscriberRef};
//!
//! let dispatch = Dispatch::default();
//! let log: SubscriberRef = Arc::new(LogSubscriber);
//! dispatch.register(&log, &[] as &[&str]).unwrap();
//! ```

use tracing::debug;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Structured-logging subscriber.
///
/// Enabled via the `logging` feature.
pub struct LogSubscriber;

impl Subscribe for LogSubscriber {
    fn on_event(&self, event: &Event) {
        let json = event.to_json();
        debug!(
            event = event.name(),
            id = event.id(),
            payload = %json["payload"],
            "event observed"
        );
    }

    fn name(&self) -> &str {
        "log"
    }
}
