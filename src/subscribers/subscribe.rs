//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging callbacks into the
//! dispatcher. Delivery is synchronous: a subscriber runs in the posting
//! thread, and `post` does not return until every resolved subscriber has
//! been invoked.
//!
//! ## Contract
//! - `on_event` receives every event the subscriber is registered for,
//!   exactly once per post, in the posting thread.
//! - A slow subscriber blocks the poster and the rest of the resolved list
//!   for that call; there is no queue and no timeout.
//! - A panicking subscriber is caught and logged; it does not reach the
//!   poster and does not abort delivery to the remaining subscribers.
//!
//! ## Identity
//! Subscribers are tracked by `Arc` pointer identity ([`SubscriberRef`]).
//! Registering the same `Arc` clone twice for one name is idempotent;
//! two separate `Arc`s over equal closures are two distinct subscribers.
//!
//! ## Example (skeleton)
//! ```rust
//! use eventcast::{Event, Subscribe};
//!
//! struct Audit;
//!
//! impl Subscribe for Audit {
//!     fn on_event(&self, ev: &Event) {
//!         // write audit record...
//!         let _ = ev.to_json();
//!     }
//!
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called synchronously from the posting thread. Implementations that need
/// mutable state use interior mutability (`Mutex`, atomics); `&self` is all
/// the dispatcher hands out.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event this subscriber is registered for.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared subscriber handle; its pointer identity is the registration key.
pub type SubscriberRef = Arc<dyn Subscribe>;
