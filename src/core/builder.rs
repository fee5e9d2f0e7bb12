//! Builder for constructing a [`Dispatch`] with initial subscriptions.

use crate::core::config::Config;
use crate::core::dispatch::Dispatch;
use crate::error::DispatchError;
use crate::events::EventName;
use crate::subscribers::SubscriberRef;

/// Builder for a dispatch context.
///
/// ## Example
/// ```rust
/// use eventcast::{Config, Dispatch, Event, SubscribeFn};
///
/// let audit = SubscribeFn::arc("audit", |_ev: &Event| {});
/// let dispatch = Dispatch::builder(Config::default())
///     .subscribe(audit.clone(), &["user_added", "user_removed"])
///     .subscribe_all(audit)
///     .build()
///     .unwrap();
/// ```
pub struct DispatchBuilder {
    config: Config,
    subscriptions: Vec<(SubscriberRef, Vec<String>)>,
}

impl DispatchBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            subscriptions: Vec::new(),
        }
    }

    /// Queues a subscription for the listed names (empty = wildcard).
    pub fn subscribe<N: EventName>(mut self, sub: SubscriberRef, names: &[N]) -> Self {
        let names = names.iter().map(|n| n.to_event_name().into_owned()).collect();
        self.subscriptions.push((sub, names));
        self
    }

    /// Queues a wildcard subscription.
    pub fn subscribe_all(self, sub: SubscriberRef) -> Self {
        self.subscribe::<&str>(sub, &[])
    }

    /// Builds the context and applies the queued subscriptions in order.
    ///
    /// # Errors
    /// [`DispatchError::InvalidName`] if any queued name is empty; the
    /// context is not returned in that case.
    pub fn build(self) -> Result<Dispatch, DispatchError> {
        let dispatch = Dispatch::new(self.config);
        for (sub, names) in &self.subscriptions {
            dispatch.register(sub, names)?;
        }
        Ok(dispatch)
    }
}
