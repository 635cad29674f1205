//! Transparency module for the research log.
//!
//! This module tracks what the publisher wrote and withheld, supporting user
//! trust and review of collected data.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SharedTransparencyLog, TransparencyLog,
    TransparencyStats,
};
