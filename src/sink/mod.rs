//! Destinations for published log units.
//!
//! A sink accepts one [`Frame`] at a time. Sinks are shared between producers
//! through [`SharedSink`], which serializes access so that the frames of one
//! unit are never interleaved with another's.

pub mod file;
pub mod frame;

pub use file::{FileSink, JsonLinesSink};
pub use frame::{current_time_millis, Frame};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Errors raised while writing frames.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Sink rejected frame: {0}")]
    Rejected(String),
}

/// Something that persists frames.
pub trait EventSink: Send {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Thread-safe handle to a sink shared by many producers.
#[derive(Clone)]
pub struct SharedSink {
    inner: Arc<Mutex<Box<dyn EventSink>>>,
}

impl SharedSink {
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Take exclusive access to the sink.
    ///
    /// A lock poisoned by a panicking writer is recovered; the sink itself
    /// holds no invariant a half-written unit could break.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn EventSink>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSink").finish_non_exhaustive()
    }
}

/// In-memory sink. Clones share the same frame buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every frame written so far.
    pub fn frames(&self) -> Vec<serde_json::Value> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for MemorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.to_value());
        Ok(())
    }
}

/// Mirrors each frame to the debug log before handing it on.
#[derive(Debug)]
pub struct EchoSink<S> {
    inner: S,
}

impl<S: EventSink> EchoSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: EventSink> EventSink for EchoSink<S> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        tracing::debug!(frame = %frame.to_value(), "Writing frame");
        self.inner.write_frame(frame)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }
}
