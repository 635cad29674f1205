//! Frames written to an event sink.
//!
//! Every frame is one JSON object. A published unit is a `logUnitStart` frame,
//! one frame per surviving event, then a `logUnitEnd` frame.

use crate::unit::{CorrectionType, Event};
use chrono::Utc;
use serde_json::{Map, Value};

pub const CURRENT_TIME_KEY: &str = "_ct";
pub const UPTIME_KEY: &str = "_ut";
pub const EVENT_TYPE_KEY: &str = "_ty";
pub const WORD_KEY: &str = "_wo";
pub const CORRECTION_TYPE_KEY: &str = "_corType";
pub const LOG_UNIT_BEGIN_KEY: &str = "logUnitStart";
pub const LOG_UNIT_END_KEY: &str = "logUnitEnd";

/// Wall-clock milliseconds since the Unix epoch.
pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A single JSON object destined for a sink. Keys keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(Map<String, Value>);

impl Frame {
    fn stamped() -> Self {
        let mut map = Map::new();
        map.insert(CURRENT_TIME_KEY.to_string(), current_time_millis().into());
        Self(map)
    }

    /// Opening frame without any word information.
    pub fn unit_start() -> Self {
        let mut frame = Self::stamped();
        frame.insert(EVENT_TYPE_KEY, LOG_UNIT_BEGIN_KEY.into());
        frame
    }

    /// Opening frame carrying the unit's word and correction type.
    pub fn unit_start_with_word(word: Option<&str>, correction_type: CorrectionType) -> Self {
        let mut frame = Self::stamped();
        frame.insert(WORD_KEY, word.map_or(Value::Null, Value::from));
        frame.insert(CORRECTION_TYPE_KEY, correction_type.ordinal().into());
        frame.insert(EVENT_TYPE_KEY, LOG_UNIT_BEGIN_KEY.into());
        frame
    }

    /// Frame for one event and its fields.
    pub fn event(event: &Event) -> Self {
        let kind = event.kind();
        if !event.is_well_formed() {
            tracing::debug!(
                kind = %kind.name,
                keys = kind.keys.len(),
                values = event.values().len(),
                "Key and value list sizes do not match"
            );
        }

        let mut frame = Self::stamped();
        frame.insert(UPTIME_KEY, event.timestamp().into());
        frame.insert(EVENT_TYPE_KEY, kind.name.as_str().into());
        for (key, value) in event.fields() {
            if frame.get(key).is_some() {
                tracing::debug!(
                    kind = %kind.name,
                    key,
                    "Field key collides with an earlier key; keeping the later value"
                );
            }
            frame.insert(key, value.to_json());
        }
        frame
    }

    pub fn unit_end() -> Self {
        let mut frame = Self::stamped();
        frame.insert(EVENT_TYPE_KEY, LOG_UNIT_END_KEY.into());
        frame
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `_ty` of the frame.
    pub fn event_type(&self) -> Option<&str> {
        self.get(EVENT_TYPE_KEY).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
