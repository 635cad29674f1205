//! Structured payloads attached to event fields.
//!
//! Each payload serializes to a fixed JSON shape through serde.

use serde::{Deserialize, Serialize};

/// One key of the on-screen keyboard layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Touch action carried by a motion sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single pointer position within a motion sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// Uptime in milliseconds
    pub time: u64,
}

/// A touch motion event, possibly with batched historical pointer samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub action: MotionAction,
    /// Uptime in milliseconds when the gesture started
    pub down_time: u64,
    pub pointers: Vec<PointerSample>,
}

impl MotionSample {
    pub fn new(action: MotionAction, down_time: u64) -> Self {
        Self {
            action,
            down_time,
            pointers: Vec::new(),
        }
    }

    pub fn with_pointer(mut self, pointer: PointerSample) -> Self {
        self.pointers.push(pointer);
        self
    }
}

/// A completion offered by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub position: i32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
