//! # Event mapping - post one event once a set of events has occurred.
//!
//! A mapping watches a list of (name, payload-pattern) pairs. Each watched
//! entry is satisfied by the first posted event with that name whose payload
//! contains every key/value pair of the pattern (an empty pattern matches
//! any payload). When every entry is satisfied, the mapped event is posted,
//! the watch unregisters itself and `mapper.mapping_triggered` announces the
//! completion; the manager then drops the map and posts
//! `mapper.mapping_removed`.
//!
//! ## Lifecycle
//! ```text
//! map_events([a, b], c)
//!     ├─► key = digest(sorted watch list)
//!     ├─► EventMap registered for ["a", "b"]
//!     └─► post mapper.mapping_created
//!
//! post("a") ─► EventMap: "a" satisfied
//! post("b") ─► EventMap: all satisfied
//!     ├─► post("c", payload of c)
//!     ├─► unregister from ["a", "b"]
//!     └─► post mapper.mapping_triggered {key}
//!             └─► EventMapper: drop map, post mapper.mapping_removed
//! ```
//!
//! ## Rules
//! - One mapping per watch list: a duplicate request errors with
//!   [`DispatchError::MappingExists`], or returns the existing key when
//!   `ignore_if_exists` is set.
//! - Maps hold only `Weak` references back to the dispatch state; a map
//!   kept alive by the registry never keeps the context alive in turn.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, Weak};

use serde_json::json;
use tracing::debug;

use crate::core::dispatch::{Dispatch, DispatchInner};
use crate::error::DispatchError;
use crate::events::{Event, NamespacedName, Payload};
use crate::subscribers::{Subscribe, SubscriberRef};

/// Events posted by the mapping facility itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperEvent {
    /// A mapping was created. Payload: `events_to_map`, `event_to_post`.
    MappingCreated,

    /// A mapping completed and posted its event. Payload: `key`.
    MappingTriggered,

    /// A mapping was removed (after triggering, or explicitly).
    /// Payload: `events_to_map`, `event_to_post`.
    MappingRemoved,
}

impl NamespacedName for MapperEvent {
    fn namespace(&self) -> &str {
        "mapper"
    }

    fn value(&self) -> &str {
        match self {
            MapperEvent::MappingCreated => "mapping_created",
            MapperEvent::MappingTriggered => "mapping_triggered",
            MapperEvent::MappingRemoved => "mapping_removed",
        }
    }
}

/// Stable per-process key for a watch list: digest of the sorted
/// (name, canonical payload JSON) pairs. Keys die with the process, so a
/// cross-run-stable digest is not required.
fn build_key(events: &[Event]) -> String {
    let mut entries: Vec<(String, String)> = events
        .iter()
        .map(|ev| {
            let payload = ev.payload().cloned().unwrap_or_default();
            (
                ev.name().to_string(),
                serde_json::to_string(&payload).unwrap_or_default(),
            )
        })
        .collect();
    entries.sort();

    let mut hasher = DefaultHasher::new();
    entries.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Payload describing a mapping (ids and timestamps omitted; only name and
/// payload identify the mapping).
fn mapping_payload(events_to_map: &[Event], event_to_post: &Event) -> Payload {
    let watch: Vec<_> = events_to_map
        .iter()
        .map(|ev| {
            json!({
                "name": ev.name(),
                "payload": ev.payload().cloned().unwrap_or_default(),
            })
        })
        .collect();
    [
        ("events_to_map".to_string(), json!(watch)),
        (
            "event_to_post".to_string(),
            json!({
                "name": event_to_post.name(),
                "payload": event_to_post.payload().cloned().unwrap_or_default(),
            }),
        ),
    ]
    .into_iter()
    .collect()
}

/// One active mapping: a self-unregistering subscriber over the watched
/// names.
struct EventMap {
    key: String,
    names: Vec<String>,
    /// Remaining watch entries: name → expected payload pattern.
    watch: Mutex<HashMap<String, Payload>>,
    /// Templates kept for the removal payload.
    events_to_map: Vec<Event>,
    event_to_post: Event,
    dispatch: Weak<DispatchInner>,
    self_ref: Weak<EventMap>,
}

impl EventMap {
    fn create(
        dispatch: Weak<DispatchInner>,
        events_to_map: Vec<Event>,
        event_to_post: Event,
        key: String,
    ) -> Arc<Self> {
        let names: Vec<String> = events_to_map
            .iter()
            .map(|ev| ev.name().to_string())
            .collect();
        let watch: HashMap<String, Payload> = events_to_map
            .iter()
            .map(|ev| {
                (
                    ev.name().to_string(),
                    ev.payload().cloned().unwrap_or_default(),
                )
            })
            .collect();

        Arc::new_cyclic(|self_ref| Self {
            key,
            names,
            watch: Mutex::new(watch),
            events_to_map,
            event_to_post,
            dispatch,
            self_ref: self_ref.clone(),
        })
    }

    /// Unregisters this map from its watched names (no-op once done).
    fn unregister_watches(&self, dispatch: &Dispatch) {
        if let Some(me) = self.self_ref.upgrade() {
            let sub: SubscriberRef = me;
            let _ = dispatch.unregister(&sub, &self.names);
        }
    }

    /// All entries satisfied: post the mapped event and announce.
    fn trigger(&self, dispatch: &Dispatch) {
        let _ = dispatch.post(
            self.event_to_post.name(),
            self.event_to_post.payload().cloned(),
        );
        self.unregister_watches(dispatch);
        let payload: Payload = [("key".to_string(), json!(self.key))].into_iter().collect();
        let _ = dispatch.post(MapperEvent::MappingTriggered, Some(payload));
    }
}

impl Subscribe for EventMap {
    fn on_event(&self, event: &Event) {
        let done = {
            let mut watch = self.watch.lock().unwrap_or_else(|e| e.into_inner());
            let Some(expected) = watch.get(event.name()) else {
                // Not watched, or already satisfied.
                return;
            };
            let matches = expected
                .iter()
                .all(|(k, v)| event.payload().and_then(|p| p.get(k)) == Some(v));
            if !matches {
                return;
            }
            watch.remove(event.name());
            watch.is_empty()
        };

        if done {
            if let Some(inner) = self.dispatch.upgrade() {
                self.trigger(&Dispatch::from_inner(inner));
            }
        }
    }

    fn name(&self) -> &str {
        "event_map"
    }
}

/// Manager of active mappings; subscribes to `mapper.mapping_triggered`
/// to drop completed maps.
pub(crate) struct EventMapper {
    maps: Mutex<HashMap<String, Arc<EventMap>>>,
    dispatch: Weak<DispatchInner>,
}

impl EventMapper {
    pub(crate) fn new(dispatch: Weak<DispatchInner>) -> Self {
        Self {
            maps: Mutex::new(HashMap::new()),
            dispatch,
        }
    }

    pub(crate) fn map_events(
        &self,
        dispatch: &Dispatch,
        events_to_map: Vec<Event>,
        event_to_post: Event,
        ignore_if_exists: bool,
    ) -> Result<String, DispatchError> {
        let malformed = events_to_map.iter().any(|ev| ev.name().is_empty())
            || event_to_post.name().is_empty();
        if events_to_map.is_empty() || malformed {
            return Err(DispatchError::InvalidMapping);
        }

        let key = build_key(&events_to_map);
        let map = {
            let mut maps = self.maps.lock().unwrap_or_else(|e| e.into_inner());
            if maps.contains_key(&key) {
                if ignore_if_exists {
                    debug!(key = %key, "ignoring mapping request, mapping already exists");
                    return Ok(key);
                }
                return Err(DispatchError::MappingExists { key });
            }
            let map = EventMap::create(
                self.dispatch.clone(),
                events_to_map,
                event_to_post,
                key.clone(),
            );
            maps.insert(key.clone(), Arc::clone(&map));
            map
        };

        let names = map.names.clone();
        let sub: SubscriberRef = Arc::clone(&map) as SubscriberRef;
        dispatch.register(&sub, &names)?;

        let payload = mapping_payload(&map.events_to_map, &map.event_to_post);
        let _ = dispatch.post(MapperEvent::MappingCreated, Some(payload));
        Ok(key)
    }

    pub(crate) fn remove_by_key(
        &self,
        dispatch: &Dispatch,
        key: &str,
    ) -> Result<(), DispatchError> {
        let map = {
            let mut maps = self.maps.lock().unwrap_or_else(|e| e.into_inner());
            maps.remove(key)
        };
        let Some(map) = map else {
            return Err(DispatchError::MappingNotFound {
                key: key.to_string(),
            });
        };

        // No-op for maps that already triggered and unregistered themselves.
        map.unregister_watches(dispatch);

        let payload = mapping_payload(&map.events_to_map, &map.event_to_post);
        let _ = dispatch.post(MapperEvent::MappingRemoved, Some(payload));
        Ok(())
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let maps = self.maps.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = maps.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

impl Subscribe for EventMapper {
    fn on_event(&self, event: &Event) {
        if event.name() != MapperEvent::MappingTriggered.full_name() {
            return;
        }
        let Some(key) = event
            .payload()
            .and_then(|p| p.get("key"))
            .and_then(|v| v.as_str())
        else {
            return;
        };
        if let Some(inner) = self.dispatch.upgrade() {
            // Already-removed maps are fine; the trigger may race an
            // explicit removal.
            let _ = self.remove_by_key(&Dispatch::from_inner(inner), key);
        }
    }

    fn name(&self) -> &str {
        "event_mapper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::subscribers::SubscribeFn;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn payload(pairs: &[(&str, serde_json::Value)]) -> Payload {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn recorder(dispatch: &Dispatch, name: &'static str) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let sub: SubscriberRef = SubscribeFn::arc(name, move |ev: &Event| {
            seen_in.lock().unwrap().push(ev.clone());
        });
        dispatch.register(&sub, &[name]).unwrap();
        // Keep the subscriber alive through the registry.
        seen
    }

    #[test]
    fn test_build_key_order_independent() {
        let a = Event::new("a", Some(payload(&[("k", json!(1))])));
        let b = Event::new("b", None);
        let key1 = build_key(&[a.clone(), b.clone()]);
        let key2 = build_key(&[b, a]);
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_build_key_payload_sensitive() {
        let a1 = Event::new("a", Some(payload(&[("k", json!(1))])));
        let a2 = Event::new("a", Some(payload(&[("k", json!(2))])));
        assert_ne!(build_key(&[a1]), build_key(&[a2]));
    }

    #[test]
    fn test_mapping_triggers_once_all_seen() {
        let dispatch = Dispatch::new(Config::default());
        let seen = recorder(&dispatch, "combined");

        let key = dispatch
            .map_events(
                vec![Event::new("a", None), Event::new("b", None)],
                Event::new("combined", Some(payload(&[("done", json!(true))]))),
                false,
            )
            .unwrap();
        assert_eq!(dispatch.event_maps(), vec![key.clone()]);

        dispatch.post("a", None).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        dispatch.post("b", None).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), "combined");
        assert_eq!(seen[0].payload().unwrap()["done"], json!(true));

        // Triggered map is gone.
        assert!(dispatch.event_maps().is_empty());
    }

    #[test]
    fn test_mapping_payload_pattern_must_match() {
        let dispatch = Dispatch::new(Config::default());
        let seen = recorder(&dispatch, "combined");

        dispatch
            .map_events(
                vec![Event::new("a", Some(payload(&[("id", json!(7))])))],
                Event::new("combined", None),
                false,
            )
            .unwrap();

        // Wrong value: not satisfied.
        dispatch
            .post("a", Some(payload(&[("id", json!(8))])))
            .unwrap();
        assert!(seen.lock().unwrap().is_empty());

        // Extra keys are fine as long as the pattern subset matches.
        dispatch
            .post("a", Some(payload(&[("id", json!(7)), ("extra", json!("x"))])))
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_repeat_of_same_event_does_not_count_twice() {
        let dispatch = Dispatch::new(Config::default());
        let seen = recorder(&dispatch, "combined");

        dispatch
            .map_events(
                vec![Event::new("a", None), Event::new("b", None)],
                Event::new("combined", None),
                false,
            )
            .unwrap();

        dispatch.post("a", None).unwrap();
        dispatch.post("a", None).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        dispatch.post("b", None).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_mapping_rejected() {
        let dispatch = Dispatch::new(Config::default());
        let watch = vec![Event::new("a", None)];

        let key = dispatch
            .map_events(watch.clone(), Event::new("c", None), false)
            .unwrap();
        let err = dispatch
            .map_events(watch.clone(), Event::new("c", None), false)
            .unwrap_err();
        assert_eq!(err, DispatchError::MappingExists { key: key.clone() });

        // ignore_if_exists returns the existing key instead.
        let again = dispatch
            .map_events(watch, Event::new("c", None), true)
            .unwrap();
        assert_eq!(again, key);
    }

    #[test]
    fn test_empty_watch_list_rejected() {
        let dispatch = Dispatch::new(Config::default());
        let err = dispatch
            .map_events(vec![], Event::new("c", None), false)
            .unwrap_err();
        assert_eq!(err, DispatchError::InvalidMapping);
    }

    #[test]
    fn test_remove_event_map() {
        let dispatch = Dispatch::new(Config::default());
        let removed = recorder(&dispatch, "mapper.mapping_removed");
        let seen = recorder(&dispatch, "combined");

        let key = dispatch
            .map_events(vec![Event::new("a", None)], Event::new("combined", None), false)
            .unwrap();
        dispatch.remove_event_map(&key).unwrap();

        assert_eq!(removed.lock().unwrap().len(), 1);
        assert!(dispatch.event_maps().is_empty());

        // The watch is gone with the map.
        dispatch.post("a", None).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        let err = dispatch.remove_event_map(&key).unwrap_err();
        assert_eq!(err, DispatchError::MappingNotFound { key });
    }

    #[test]
    fn test_lifecycle_events_posted() {
        let dispatch = Dispatch::new(Config::default());
        let created = recorder(&dispatch, "mapper.mapping_created");
        let triggered = recorder(&dispatch, "mapper.mapping_triggered");
        let removed = recorder(&dispatch, "mapper.mapping_removed");

        let key = dispatch
            .map_events(vec![Event::new("a", None)], Event::new("c", None), false)
            .unwrap();
        dispatch.post("a", None).unwrap();

        assert_eq!(created.lock().unwrap().len(), 1);
        let triggered = triggered.lock().unwrap();
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].payload().unwrap()["key"], json!(key));
        assert_eq!(removed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_mapping_count_concurrent_posts() {
        let dispatch = Dispatch::new(Config::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in = Arc::clone(&hits);
        let sub: SubscriberRef = SubscribeFn::arc("combined_counter", move |_ev: &Event| {
            hits_in.fetch_add(1, Ordering::SeqCst);
        });
        dispatch.register(&sub, &["combined"]).unwrap();

        dispatch
            .map_events(
                vec![Event::new("a", None), Event::new("b", None)],
                Event::new("combined", None),
                false,
            )
            .unwrap();

        let threads: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|name| {
                let d = dispatch.clone();
                std::thread::spawn(move || {
                    d.post(name, None).unwrap();
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        // Whatever the interleaving, the combined event fires exactly once.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
