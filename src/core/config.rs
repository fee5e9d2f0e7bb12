//! # Dispatch configuration.
//!
//! Provides [`Config`], the settings a [`Dispatch`](crate::Dispatch) is
//! constructed with.
//!
//! Config is used in two ways:
//! 1. **Direct construction**: `Dispatch::new(config)`
//! 2. **Builder**: `Dispatch::builder(config).build()`

/// Configuration for a dispatch context.
///
/// ## Field semantics
/// - `event_log_capacity`: ring-buffer size for the recent-event log
///   (min 1; clamped). The log itself is off until
///   [`Dispatch::set_event_logging`](crate::Dispatch::set_event_logging)
///   enables it.
/// - `admin_events`: when on, a register/unregister that changed state
///   posts a `dispatch.subscriber_registered` /
///   `dispatch.subscriber_unregistered` event. Off by default so delivery
///   counts observed by subscribers are exactly the caller's posts.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the recent-event ring buffer (test/debug support).
    pub event_log_capacity: usize,

    /// Post administrative events on registration changes.
    pub admin_events: bool,
}

impl Config {
    /// Returns the event-log capacity clamped to a minimum of 1.
    #[inline]
    pub fn event_log_capacity_clamped(&self) -> usize {
        self.event_log_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `event_log_capacity = 5` (small ring; the log is a debugging aid,
    ///   not an event store)
    /// - `admin_events = false`
    fn default() -> Self {
        Self {
            event_log_capacity: 5,
            admin_events: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_clamped() {
        let cfg = Config {
            event_log_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.event_log_capacity_clamped(), 1);
    }
}
