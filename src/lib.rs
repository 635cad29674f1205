//! Synheart Research Log - privacy-filtered log units for typing research.
//!
//! This library groups the events produced while a word is typed into a single
//! [`LogUnit`], tracks what the unit produced (the word, whether it was
//! corrected, whether it may contain digits) and publishes it as a stream of
//! JSON frames under a privacy filter chosen at publish time.
//!
//! # Privacy Guarantees
//!
//! - **Private events withheld by default**: events marked potentially private
//!   are only written when the publisher explicitly allows it
//! - **Words withheld by default**: the unit's word and correction type are
//!   only written alongside private data
//! - **Split units are stricter**: potentially revealing events are never
//!   written from a unit that was split
//! - **Nothing or everything framed**: a unit whose events are all withheld
//!   leaves no trace in the log
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Synheart Research Log                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────────┐      │
//! │  │   Session   │──▶│   LogUnit   │──▶│ Privacy filter  │      │
//! │  │  (events)   │   │ split/merge │   │   + framing     │      │
//! │  └─────────────┘   └─────────────┘   └─────────────────┘      │
//! │                                               │               │
//! │                                               ▼               │
//! │  ┌─────────────┐                     ┌─────────────────┐      │
//! │  │Transparency │◀────────────────────│   SharedSink    │      │
//! │  │    Log      │                     │  (JSON lines)   │      │
//! │  └─────────────┘                     └─────────────────┘      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use synheart_research_log::{EventKind, LogUnit, LogValue, MemorySink, SharedSink};
//!
//! let key = EventKind::new("onCodeInput", ["code"]).private().shared();
//! let mut unit = LogUnit::new();
//! unit.append_event(&key, 100, vec![LogValue::from(99)]);
//! unit.set_word("cat");
//!
//! let memory = MemorySink::new();
//! let report = unit.publish_to(&SharedSink::new(memory.clone()), false);
//!
//! // The only event is private, so nothing was written
//! assert!(report.is_suppressed());
//! assert!(memory.frames().is_empty());
//! ```

pub mod config;
pub mod publisher;
pub mod replay;
pub mod sink;
pub mod transparency;
pub mod unit;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use publisher::{BackgroundPublisher, PublisherError, UnitPublisher};
pub use replay::{ReplayError, ReplaySummary, Replayer, ScriptOp};
pub use sink::{EchoSink, EventSink, FileSink, Frame, JsonLinesSink, MemorySink, SharedSink, SinkError};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};
pub use unit::{
    CandidateList, CandidateProvider, CorrectionType, Event, EventKind, LogUnit, LogValue,
    PublishReport,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║           SYNHEART RESEARCH LOG - PRIVACY DECLARATION            ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This log records how words are typed and corrected.             ║
║                                                                  ║
║  ✓ WHAT WE RECORD:                                               ║
║    • When typing events happen (timing)                          ║
║    • Events marked safe to publish                               ║
║    • Whether a word was corrected (only with permission)         ║
║                                                                  ║
║  ✗ WHAT WE NEVER RECORD WITHOUT PERMISSION:                      ║
║    • The words you type                                          ║
║    • Events that may reveal what you typed                       ║
║    • Anything from a unit that was split mid-word                ║
║      and could reveal its contents                               ║
║                                                                  ║
║  You can view publishing statistics anytime with:                ║
║    synheart-research-log status                                  ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_declaration_contents() {
        assert!(PRIVACY_DECLARATION.contains("PRIVACY"));
        assert!(PRIVACY_DECLARATION.contains("NEVER RECORD"));
        assert!(PRIVACY_DECLARATION.contains("words you type"));
    }
}
