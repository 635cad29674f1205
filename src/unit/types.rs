//! Event types recorded into log units.
//!
//! An [`EventKind`] describes a category of event once (its name, the names of
//! its fields and its privacy predicates). Each recorded [`Event`] points at a
//! shared kind and carries the caller's values and timestamp.

use crate::unit::payload::{Completion, KeyInfo, MotionSample};
use crate::unit::CandidateList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Descriptor for one category of logged event.
///
/// Privacy flags are fixed when the kind is declared and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventKind {
    /// Name written as `_ty` in the event frame
    pub name: String,
    /// Field names, matched positionally with an event's values
    pub keys: Vec<String>,
    /// Dropped unless the publisher allows private data
    pub is_potentially_private: bool,
    /// Dropped whenever the owning unit is part of a mega-unit
    pub is_potentially_revealing: bool,
}

impl EventKind {
    pub fn new<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            is_potentially_private: false,
            is_potentially_revealing: false,
        }
    }

    /// Mark the kind as potentially private.
    pub fn private(mut self) -> Self {
        self.is_potentially_private = true;
        self
    }

    /// Mark the kind as potentially revealing.
    pub fn revealing(mut self) -> Self {
        self.is_potentially_revealing = true;
        self
    }

    /// Wrap the kind for sharing between events.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// A value attached to an event field.
///
/// The set of variants is closed; every variant has exactly one serialization
/// rule in [`LogValue::to_json`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Candidate words shown to the user
    Candidates(Arc<CandidateList>),
    /// Keyboard layout keys
    Keys(Vec<KeyInfo>),
    /// A touch motion sample
    Motion(MotionSample),
    /// Completions offered by the application
    Completions(Vec<Completion>),
    /// A snapshot of preference settings
    Preferences(BTreeMap<String, String>),
    /// A value whose type has no serialization rule; carries the type name
    Unsupported(String),
}

impl LogValue {
    /// Convert the value into its JSON form.
    ///
    /// Values that cannot be represented are written as null with a warning.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            LogValue::Null => Value::Null,
            LogValue::Bool(b) => Value::Bool(*b),
            LogValue::Int(i) => Value::from(*i),
            LogValue::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => Value::Number(n),
                None => {
                    tracing::warn!(value = %f, "Non-finite number cannot be logged; writing null");
                    Value::Null
                }
            },
            LogValue::Text(s) => Value::String(s.clone()),
            LogValue::Candidates(list) => Value::Array(
                list.words()
                    .iter()
                    .map(|w| Value::String(w.clone()))
                    .collect(),
            ),
            LogValue::Keys(keys) => payload_to_json(keys),
            LogValue::Motion(motion) => payload_to_json(motion),
            LogValue::Completions(completions) => payload_to_json(completions),
            LogValue::Preferences(prefs) => payload_to_json(prefs),
            LogValue::Unsupported(type_name) => {
                tracing::warn!(type_name = %type_name, "Unrecognized type to be logged; writing null");
                Value::Null
            }
        }
    }
}

fn payload_to_json<T: Serialize>(payload: &T) -> serde_json::Value {
    serde_json::to_value(payload).unwrap_or_else(|e| {
        tracing::warn!("Could not serialize payload: {e}");
        serde_json::Value::Null
    })
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        LogValue::Bool(value)
    }
}

impl From<i32> for LogValue {
    fn from(value: i32) -> Self {
        LogValue::Int(value.into())
    }
}

impl From<i64> for LogValue {
    fn from(value: i64) -> Self {
        LogValue::Int(value)
    }
}

impl From<u32> for LogValue {
    fn from(value: u32) -> Self {
        LogValue::Int(value.into())
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        LogValue::Float(value)
    }
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        LogValue::Text(value.to_string())
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        LogValue::Text(value)
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(LogValue::Null, Into::into)
    }
}

impl From<Arc<CandidateList>> for LogValue {
    fn from(value: Arc<CandidateList>) -> Self {
        LogValue::Candidates(value)
    }
}

impl From<MotionSample> for LogValue {
    fn from(value: MotionSample) -> Self {
        LogValue::Motion(value)
    }
}

impl From<serde_json::Value> for LogValue {
    /// Scalar JSON values map onto their scalar variants; arrays and objects
    /// have no variant and become [`LogValue::Unsupported`].
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => LogValue::Null,
            Value::Bool(b) => LogValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => LogValue::Int(i),
                None => LogValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => LogValue::Text(s),
            Value::Array(_) => LogValue::Unsupported("array".to_string()),
            Value::Object(_) => LogValue::Unsupported("object".to_string()),
        }
    }
}

/// One recorded occurrence inside a log unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: Arc<EventKind>,
    values: Vec<LogValue>,
    timestamp: u64,
}

impl Event {
    pub fn new(kind: Arc<EventKind>, timestamp: u64, values: Vec<LogValue>) -> Self {
        Self {
            kind,
            values,
            timestamp,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn values(&self) -> &[LogValue] {
        &self.values
    }

    /// Uptime in milliseconds when the event happened.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Whether the declared keys and supplied values line up.
    pub fn is_well_formed(&self) -> bool {
        self.kind.keys.len() == self.values.len()
    }

    /// Pair each declared key with its value, stopping at the shorter list.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &LogValue)> {
        self.kind
            .keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
