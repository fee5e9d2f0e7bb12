//! # Subscription registry - who receives what.
//!
//! The registry maps event names to subscriber lists and keeps a separate
//! wildcard list for subscribers that receive every event. It owns
//! registration, unregistration and lookup; delivery lives in
//! [`Dispatch`](crate::Dispatch).
//!
//! ## Rules
//! - Registration is idempotent per (subscriber, name) and per
//!   (subscriber, wildcard); duplicates are silently skipped.
//! - Names need no pre-declaration; the first registration creates a bucket.
//! - `resolve` returns exact-match subscribers in registration order, then
//!   wildcard subscribers in registration order, deduplicated by pointer
//!   identity. The order is deterministic for a fixed registration sequence.
//! - Removing a subscriber that is not registered is a no-op.
//!
//! ## Locking
//! One `RwLock` guards both bucket maps. Mutations take the write lock;
//! `resolve` clones the matching lists under the read lock and returns, so
//! no lock is held while subscribers run. A callback may therefore call
//! `register`/`unregister`/`post` without deadlocking, and a post in
//! progress sees either the state before or after a concurrent mutation,
//! never a torn one.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::subscribers::{Subscribe, SubscriberRef};

/// Bucket state: per-name lists plus the wildcard list.
#[derive(Default)]
struct Buckets {
    by_name: HashMap<String, Vec<SubscriberRef>>,
    all: Vec<SubscriberRef>,
}

/// Mapping from event names to interested subscribers.
pub(crate) struct Registry {
    buckets: RwLock<Buckets>,
}

fn contains(list: &[SubscriberRef], sub: &SubscriberRef) -> bool {
    list.iter().any(|s| Arc::ptr_eq(s, sub))
}

fn remove(list: &mut Vec<SubscriberRef>, sub: &SubscriberRef) -> bool {
    let before = list.len();
    list.retain(|s| !Arc::ptr_eq(s, sub));
    list.len() != before
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            buckets: RwLock::new(Buckets::default()),
        }
    }

    /// Adds `sub` under each listed name, or to the wildcard list when
    /// `names` is empty. Returns true if any bucket changed.
    pub(crate) fn register(&self, sub: &SubscriberRef, names: &[String]) -> bool {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        let mut changed = false;

        if names.is_empty() {
            if !contains(&buckets.all, sub) {
                buckets.all.push(Arc::clone(sub));
                changed = true;
            }
            return changed;
        }

        for name in names {
            let list = buckets.by_name.entry(name.clone()).or_default();
            if !contains(list, sub) {
                list.push(Arc::clone(sub));
                changed = true;
            }
        }
        changed
    }

    /// Removes `sub` from each listed name, or - when `names` is empty -
    /// from the wildcard list and every per-name bucket (full
    /// unregistration). Returns true if any bucket changed.
    pub(crate) fn unregister(&self, sub: &SubscriberRef, names: &[String]) -> bool {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        let mut changed = false;

        if names.is_empty() {
            changed |= remove(&mut buckets.all, sub);
            for list in buckets.by_name.values_mut() {
                changed |= remove(list, sub);
            }
            buckets.by_name.retain(|_, list| !list.is_empty());
            return changed;
        }

        for name in names {
            if let Some(list) = buckets.by_name.get_mut(name) {
                changed |= remove(list, sub);
                if list.is_empty() {
                    buckets.by_name.remove(name);
                }
            }
        }
        changed
    }

    /// Returns the subscribers for one event name: exact matches first,
    /// then wildcard subscribers, each at most once.
    ///
    /// The returned snapshot is taken under a single read-lock acquisition;
    /// callers invoke subscribers with no lock held.
    pub(crate) fn resolve(&self, name: &str) -> Vec<SubscriberRef> {
        let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        let mut resolved: Vec<SubscriberRef> = buckets
            .by_name
            .get(name)
            .map(|list| list.to_vec())
            .unwrap_or_default();

        for sub in &buckets.all {
            if !contains(&resolved, sub) {
                resolved.push(Arc::clone(sub));
            }
        }
        resolved
    }

    /// Removes every subscription (test support).
    pub(crate) fn clear(&self) {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        buckets.by_name.clear();
        buckets.all.clear();
    }

    /// Snapshot of registrations as subscriber names per event name, the
    /// wildcard list under `"*"`. Diagnostic/test support only.
    pub(crate) fn snapshot(&self) -> HashMap<String, Vec<String>> {
        let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        let mut out: HashMap<String, Vec<String>> = buckets
            .by_name
            .iter()
            .map(|(name, list)| {
                (
                    name.clone(),
                    list.iter().map(|s| s.name().to_string()).collect(),
                )
            })
            .collect();
        if !buckets.all.is_empty() {
            out.insert(
                "*".to_string(),
                buckets.all.iter().map(|s| s.name().to_string()).collect(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::subscribers::SubscribeFn;

    fn sub(name: &'static str) -> SubscriberRef {
        SubscribeFn::arc(name, |_ev: &Event| {})
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_register_and_resolve() {
        let reg = Registry::new();
        let a = sub("a");
        reg.register(&a, &names(&["x"]));

        let resolved = reg.resolve("x");
        assert_eq!(resolved.len(), 1);
        assert!(Arc::ptr_eq(&resolved[0], &a));
        assert!(reg.resolve("y").is_empty());
    }

    #[test]
    fn test_register_idempotent() {
        let reg = Registry::new();
        let a = sub("a");
        assert!(reg.register(&a, &names(&["x"])));
        assert!(!reg.register(&a, &names(&["x"])));
        assert_eq!(reg.resolve("x").len(), 1);
    }

    #[test]
    fn test_wildcard_idempotent() {
        let reg = Registry::new();
        let a = sub("a");
        assert!(reg.register(&a, &[]));
        assert!(!reg.register(&a, &[]));
        assert_eq!(reg.resolve("anything").len(), 1);
    }

    #[test]
    fn test_resolve_dedups_exact_and_wildcard() {
        let reg = Registry::new();
        let a = sub("a");
        reg.register(&a, &names(&["x"]));
        reg.register(&a, &[]);
        assert_eq!(reg.resolve("x").len(), 1);
        assert_eq!(reg.resolve("other").len(), 1);
    }

    #[test]
    fn test_resolve_order_exact_then_wildcard() {
        let reg = Registry::new();
        let first = sub("first");
        let second = sub("second");
        let everything = sub("everything");
        reg.register(&everything, &[]);
        reg.register(&first, &names(&["x"]));
        reg.register(&second, &names(&["x"]));

        let resolved = reg.resolve("x");
        assert_eq!(resolved.len(), 3);
        assert!(Arc::ptr_eq(&resolved[0], &first));
        assert!(Arc::ptr_eq(&resolved[1], &second));
        assert!(Arc::ptr_eq(&resolved[2], &everything));
    }

    #[test]
    fn test_unregister_listed_names_only() {
        let reg = Registry::new();
        let a = sub("a");
        reg.register(&a, &names(&["x", "y"]));
        reg.unregister(&a, &names(&["x"]));
        assert!(reg.resolve("x").is_empty());
        assert_eq!(reg.resolve("y").len(), 1);
    }

    #[test]
    fn test_unregister_empty_removes_everywhere() {
        let reg = Registry::new();
        let a = sub("a");
        reg.register(&a, &names(&["x", "y"]));
        reg.register(&a, &[]);
        assert!(reg.unregister(&a, &[]));
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let reg = Registry::new();
        let a = sub("a");
        assert!(!reg.unregister(&a, &names(&["x"])));
        assert!(!reg.unregister(&a, &[]));
    }

    #[test]
    fn test_distinct_arcs_are_distinct_subscribers() {
        let reg = Registry::new();
        let a = sub("same");
        let b = sub("same");
        reg.register(&a, &names(&["x"]));
        reg.register(&b, &names(&["x"]));
        assert_eq!(reg.resolve("x").len(), 2);
    }

    #[test]
    fn test_snapshot_lists_names() {
        let reg = Registry::new();
        let a = sub("a");
        let b = sub("b");
        reg.register(&a, &names(&["x"]));
        reg.register(&b, &[]);

        let snap = reg.snapshot();
        assert_eq!(snap["x"], vec!["a".to_string()]);
        assert_eq!(snap["*"], vec!["b".to_string()]);
    }

    #[test]
    fn test_clear() {
        let reg = Registry::new();
        let a = sub("a");
        reg.register(&a, &names(&["x"]));
        reg.register(&a, &[]);
        reg.clear();
        assert!(reg.snapshot().is_empty());
    }
}
