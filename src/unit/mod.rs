//! Log units and the events they group.
//!
//! This module contains:
//! - Event kinds, events and their field values
//! - Structured payloads carried by field values
//! - Candidate lists used to classify word corrections
//! - The [`LogUnit`] buffer itself

pub mod candidates;
pub mod correction;
pub mod log_unit;
pub mod payload;
pub mod types;

// Re-export commonly used types
pub use candidates::{CandidateList, CandidateProvider};
pub use correction::CorrectionType;
pub use log_unit::{LogUnit, PublishReport};
pub use payload::{Completion, KeyInfo, MotionAction, MotionSample, PointerSample};
pub use types::{Event, EventKind, LogValue};
