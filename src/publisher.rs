//! Publishing log units to a shared sink.
//!
//! [`UnitPublisher`] publishes on the caller's thread. [`BackgroundPublisher`]
//! hands units by value to a single worker thread so the producer never waits
//! on the sink.

use crate::sink::SharedSink;
use crate::transparency::SharedTransparencyLog;
use crate::unit::{LogUnit, PublishReport};
use crossbeam_channel::{bounded, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Publishes units to a sink and records the outcome.
#[derive(Debug, Clone)]
pub struct UnitPublisher {
    sink: SharedSink,
    transparency: SharedTransparencyLog,
}

impl UnitPublisher {
    pub fn new(sink: SharedSink, transparency: SharedTransparencyLog) -> Self {
        Self { sink, transparency }
    }

    /// Publish one unit. Never fails; sink problems show up in the report.
    pub fn publish(&self, unit: &LogUnit, include_private_data: bool) -> PublishReport {
        let report = unit.publish_to(&self.sink, include_private_data);
        self.transparency.record_publish(&report);
        if report.frames_failed > 0 {
            tracing::warn!(
                failed = report.frames_failed,
                written = report.frames_written,
                "Log unit published with dropped frames"
            );
        }
        report
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    pub fn transparency(&self) -> &SharedTransparencyLog {
        &self.transparency
    }
}

/// Errors from the background publisher.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Publisher has been shut down")]
    Stopped,
}

struct PublishJob {
    unit: LogUnit,
    include_private_data: bool,
}

/// Publishes units on a dedicated worker thread.
pub struct BackgroundPublisher {
    sender: Option<Sender<PublishJob>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl BackgroundPublisher {
    /// Start the worker. `capacity` bounds the number of queued units.
    pub fn start(publisher: UnitPublisher, capacity: usize) -> Self {
        // Bounded so a stalled sink applies backpressure instead of growing memory
        let (sender, receiver) = bounded::<PublishJob>(capacity.max(1));

        let handle = thread::spawn(move || {
            for job in receiver {
                publisher.publish(&job.unit, job.include_private_data);
            }
            tracing::debug!("Background publisher drained");
        });

        Self {
            sender: Some(sender),
            thread_handle: Some(handle),
        }
    }

    /// Queue a unit for publishing. Blocks while the queue is full.
    pub fn submit(&self, unit: LogUnit, include_private_data: bool) -> Result<(), PublisherError> {
        let sender = self.sender.as_ref().ok_or(PublisherError::Stopped)?;
        sender
            .send(PublishJob {
                unit,
                include_private_data,
            })
            .map_err(|_| PublisherError::Stopped)
    }

    /// Publish everything already queued, then stop the worker.
    pub fn shutdown(&mut self) {
        // Dropping the sender ends the worker loop once the queue is empty
        self.sender.take();
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("Background publisher thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }
}

impl Drop for BackgroundPublisher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
