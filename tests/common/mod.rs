#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use eventcast::{Event, Payload, Subscribe};
use serde_json::Value;

/// Subscriber that records every event it receives.
pub struct Recorder {
    label: &'static str,
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn arc(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &str {
        self.label
    }
}

/// Builds a payload from literal pairs.
pub fn payload(pairs: &[(&str, Value)]) -> Payload {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}
