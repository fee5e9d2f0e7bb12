//! # Global property store.
//!
//! [`Properties`] is a thread-safe named-value store with three set modes:
//! immutable (the default), skip-if-exists, and explicitly mutable. It is a
//! collaborator of the dispatch core, not part of it: values are plain
//! JSON, nothing here posts events.
//!
//! ## Rules
//! - The first `set` of a key stores the value and fixes its mutability.
//! - Re-setting an immutable key, or any existing key with
//!   `skip_if_exists`, is a silent no-op (`set` returns `false`).
//! - `get` of a key that was never set fails with
//!   [`PropertyError::NotSet`].
//!
//! ## Example
//! ```rust
//! use eventcast::{Properties, SetOptions};
//! use serde_json::json;
//!
//! let props = Properties::new();
//! assert!(props.set("app.name", json!("demo")));
//! assert!(!props.set("app.name", json!("other"))); // immutable, no-op
//! assert_eq!(props.get("app.name").unwrap(), json!("demo"));
//!
//! let mutable = SetOptions { mutable: true, ..SetOptions::default() };
//! props.set_with("app.debug", json!(false), mutable);
//! assert!(props.set("app.debug", json!(true)));
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{json, Value};
use thiserror::Error;

use crate::error::Notify;
use crate::events::Payload;

/// Errors produced by the property store.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The property was read before ever being set.
    #[error("property '{name}' has not been set")]
    NotSet {
        /// Name of the missing property.
        name: String,
    },
}

impl PropertyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PropertyError::NotSet { .. } => "property_not_set",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

impl Notify for PropertyError {
    fn error_code(&self) -> &str {
        self.as_label()
    }

    fn payload(&self) -> Option<Payload> {
        match self {
            PropertyError::NotSet { name } => Some(
                [("property".to_string(), json!(name))].into_iter().collect(),
            ),
        }
    }
}

/// Modes for [`Properties::set_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SetOptions {
    /// Allow later overwrites of this key.
    pub mutable: bool,
    /// Do nothing if the key already exists.
    pub skip_if_exists: bool,
}

struct Property {
    value: Value,
    mutable: bool,
}

/// Thread-safe named-value store.
///
/// Construct instances freely, or use the process-wide
/// [`properties`] accessor.
#[derive(Default)]
pub struct Properties {
    entries: RwLock<HashMap<String, Property>>,
}

impl Properties {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an immutable property. Equivalent to
    /// `set_with(name, value, SetOptions::default())`.
    ///
    /// Returns `true` when the value was stored.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        self.set_with(name, value, SetOptions::default())
    }

    /// Sets a property with explicit options.
    ///
    /// - First set: stores the value, fixes mutability from
    ///   [`SetOptions::mutable`].
    /// - Existing key with [`SetOptions::skip_if_exists`]: no-op.
    /// - Existing immutable key: no-op.
    /// - Existing mutable key: value updated in place (mutability kept).
    ///
    /// Returns `true` when the value was stored or updated.
    pub fn set_with(
        &self,
        name: impl Into<String>,
        value: impl Into<Value>,
        opts: SetOptions,
    ) -> bool {
        let name = name.into();
        let value = value.into();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(&name) {
            Some(existing) => {
                if opts.skip_if_exists || !existing.mutable {
                    return false;
                }
                existing.value = value;
                true
            }
            None => {
                entries.insert(
                    name,
                    Property {
                        value,
                        mutable: opts.mutable,
                    },
                );
                true
            }
        }
    }

    /// Returns the property value.
    ///
    /// # Errors
    /// [`PropertyError::NotSet`] when the key was never set.
    pub fn get(&self, name: &str) -> Result<Value, PropertyError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(name)
            .map(|p| p.value.clone())
            .ok_or_else(|| PropertyError::NotSet {
                name: name.to_string(),
            })
    }

    /// True when the property has been set.
    pub fn has(&self, name: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(name)
    }

    /// Sorted list of all set property names.
    pub fn list(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Removes every property (test support).
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}

/// The process-wide property store, created on first use.
pub fn properties() -> &'static Properties {
    use std::sync::OnceLock;

    static GLOBAL: OnceLock<Properties> = OnceLock::new();
    GLOBAL.get_or_init(Properties::new)
}
