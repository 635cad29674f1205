//! Privacy-preserving transparency log.
//!
//! This module counts what the publisher wrote and what the privacy filter
//! held back, without storing any of the logged content itself.

use crate::unit::PublishReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Publishing statistics for the current session.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Units that wrote at least one event
    units_published: AtomicU64,
    /// Units whose events were all filtered out
    units_suppressed: AtomicU64,
    /// Frames accepted by the sink
    frames_written: AtomicU64,
    /// Frames the sink rejected
    frame_failures: AtomicU64,
    /// Events dropped because private data was not allowed
    events_filtered_private: AtomicU64,
    /// Events dropped because their unit was part of a mega-unit
    events_filtered_revealing: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl TransparencyLog {
    /// Create a new transparency log.
    pub fn new() -> Self {
        Self {
            units_published: AtomicU64::new(0),
            units_suppressed: AtomicU64::new(0),
            frames_written: AtomicU64::new(0),
            frame_failures: AtomicU64::new(0),
            events_filtered_private: AtomicU64::new(0),
            events_filtered_revealing: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a transparency log with persistence.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("Could not load previous transparency stats: {e}");
        }

        log
    }

    /// Record the outcome of publishing one unit.
    pub fn record_publish(&self, report: &PublishReport) {
        if report.is_suppressed() {
            self.units_suppressed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.units_published.fetch_add(1, Ordering::Relaxed);
        }
        self.frames_written
            .fetch_add(report.frames_written as u64, Ordering::Relaxed);
        self.frame_failures
            .fetch_add(report.frames_failed as u64, Ordering::Relaxed);
        self.events_filtered_private
            .fetch_add(report.filtered_private as u64, Ordering::Relaxed);
        self.events_filtered_revealing
            .fetch_add(report.filtered_revealing as u64, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            units_published: self.units_published.load(Ordering::Relaxed),
            units_suppressed: self.units_suppressed.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            frame_failures: self.frame_failures.load(Ordering::Relaxed),
            events_filtered_private: self.events_filtered_private.load(Ordering::Relaxed),
            events_filtered_revealing: self.events_filtered_revealing.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Log units published: {}\n\
             - Log units fully withheld: {}\n\
             - Frames written: {}\n\
             - Frames dropped by sink errors: {}\n\
             - Private events withheld: {}\n\
             - Revealing events withheld: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - Private events only written with explicit permission\n\
             - Words only written with explicit permission\n\
             - Revealing events never written from split units",
            stats.units_published,
            stats.units_suppressed,
            stats.frames_written,
            stats.frame_failures,
            stats.events_filtered_private,
            stats.events_filtered_revealing,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                units_published: stats.units_published,
                units_suppressed: stats.units_suppressed,
                frames_written: stats.frames_written,
                frame_failures: stats.frame_failures,
                events_filtered_private: stats.events_filtered_private,
                events_filtered_revealing: stats.events_filtered_revealing,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.units_published
                    .store(persisted.units_published, Ordering::Relaxed);
                self.units_suppressed
                    .store(persisted.units_suppressed, Ordering::Relaxed);
                self.frames_written
                    .store(persisted.frames_written, Ordering::Relaxed);
                self.frame_failures
                    .store(persisted.frame_failures, Ordering::Relaxed);
                self.events_filtered_private
                    .store(persisted.events_filtered_private, Ordering::Relaxed);
                self.events_filtered_revealing
                    .store(persisted.events_filtered_revealing, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.units_published.store(0, Ordering::Relaxed);
        self.units_suppressed.store(0, Ordering::Relaxed);
        self.frames_written.store(0, Ordering::Relaxed);
        self.frame_failures.store(0, Ordering::Relaxed);
        self.events_filtered_private.store(0, Ordering::Relaxed);
        self.events_filtered_revealing.store(0, Ordering::Relaxed);
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub units_published: u64,
    pub units_suppressed: u64,
    pub frames_written: u64,
    pub frame_failures: u64,
    pub events_filtered_private: u64,
    pub events_filtered_revealing: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    units_published: u64,
    units_suppressed: u64,
    frames_written: u64,
    frame_failures: u64,
    events_filtered_private: u64,
    events_filtered_revealing: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared transparency log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

/// Create a new shared transparency log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedTransparencyLog {
    Arc::new(TransparencyLog::with_persistence(path))
}
