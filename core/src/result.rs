//! Name-keyed view over a decoded API result.
//!
//! # Design
//! `ResultView` is an ordered key/value container over `serde_json` values.
//! Nested objects are not converted up front: `view` wraps them on every
//! read, so a view never aliases or mutates its parent. Keys are stored
//! trimmed so `" id"` and `"id"` address the same entry.

use std::ops::Index;

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultView {
    fields: Map<String, Value>,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(normalize(key))
    }

    /// The object stored under `key`, wrapped in a new view. `None` when the
    /// key is missing or does not hold an object.
    pub fn view(&self, key: &str) -> Option<ResultView> {
        match self.get(key)? {
            Value::Object(map) => Some(ResultView::from(map.clone())),
            _ => None,
        }
    }

    /// Store `value` under `key`, replacing any previous value. Returns the
    /// previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(normalize(key).to_string(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(normalize(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(normalize(key))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn normalize(key: &str) -> &str {
    key.trim()
}

impl From<Map<String, Value>> for ResultView {
    fn from(map: Map<String, Value>) -> Self {
        let mut view = ResultView::new();
        for (key, value) in map {
            view.set(&key, value);
        }
        view
    }
}

impl TryFrom<Value> for ResultView {
    type Error = Value;

    /// Only objects convert; anything else is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(ResultView::from(map)),
            other => Err(other),
        }
    }
}

impl Index<&str> for ResultView {
    type Output = Value;

    /// Bracket access; missing keys read as `Null`.
    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.get(key).unwrap_or(&NULL)
    }
}
