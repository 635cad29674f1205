//! Replaying recorded input sessions into log units.
//!
//! A replay script is a JSON-lines file, one operation per line, as recorded by
//! an input session. Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"op":"kind","name":"onCodeInput","keys":["code"],"private":true}
//! {"op":"candidates","words":["cat","hat"]}
//! {"op":"event","kind":"onCodeInput","ut":100,"values":[99]}
//! {"op":"word","word":"cat"}
//! {"op":"publish"}
//! ```

use crate::publisher::UnitPublisher;
use crate::unit::{CandidateList, EventKind, LogUnit, LogValue, PublishReport};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use thiserror::Error;

/// One line of a replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    /// Declare an event kind
    Kind {
        name: String,
        #[serde(default)]
        keys: Vec<String>,
        #[serde(default)]
        private: bool,
        #[serde(default)]
        revealing: bool,
    },
    /// Record an event into the current unit
    Event {
        kind: String,
        ut: u64,
        #[serde(default)]
        values: Vec<serde_json::Value>,
    },
    Word {
        word: String,
    },
    Candidates {
        words: Vec<String>,
    },
    Digit,
    Correction,
    /// Split the current unit; the earlier part waits for a merge or publish
    Split {
        cutoff: u64,
    },
    /// Merge the current unit back onto the most recent split-off head
    Merge,
    /// Publish every pending unit, then the current one
    Publish {
        #[serde(default)]
        include_private: Option<bool>,
    },
}

/// Errors that stop a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid operation: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: unknown event kind '{kind}'")]
    UnknownKind { line: usize, kind: String },
    #[error("line {line}: no split unit to merge into")]
    NothingToMerge { line: usize },
}

/// Totals over a whole replay.
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub operations: usize,
    pub reports: Vec<PublishReport>,
}

impl ReplaySummary {
    pub fn units_published(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_suppressed()).count()
    }

    pub fn frames_written(&self) -> usize {
        self.reports.iter().map(|r| r.frames_written).sum()
    }
}

/// Drives log units from a replay script.
pub struct Replayer {
    publisher: UnitPublisher,
    include_private_data: bool,
    kinds: HashMap<String, Arc<EventKind>>,
    current: LogUnit,
    /// Earlier halves of splits, oldest first
    pending: Vec<LogUnit>,
    summary: ReplaySummary,
}

impl Replayer {
    pub fn new(publisher: UnitPublisher, include_private_data: bool) -> Self {
        Self {
            publisher,
            include_private_data,
            kinds: HashMap::new(),
            current: LogUnit::new(),
            pending: Vec::new(),
            summary: ReplaySummary::default(),
        }
    }

    /// Replay every operation in `reader`, then publish whatever is left.
    pub fn run<R: BufRead>(mut self, reader: R) -> Result<ReplaySummary, ReplayError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let op: ScriptOp = serde_json::from_str(trimmed).map_err(|source| {
                ReplayError::Parse {
                    line: index + 1,
                    source,
                }
            })?;
            self.apply(index + 1, op)?;
        }
        Ok(self.finish())
    }

    /// Apply a single operation. `line` is only used for error reporting.
    pub fn apply(&mut self, line: usize, op: ScriptOp) -> Result<(), ReplayError> {
        self.summary.operations += 1;
        match op {
            ScriptOp::Kind {
                name,
                keys,
                private,
                revealing,
            } => {
                let mut kind = EventKind::new(name.clone(), keys);
                kind.is_potentially_private = private;
                kind.is_potentially_revealing = revealing;
                self.kinds.insert(name, kind.shared());
            }
            ScriptOp::Event { kind, ut, values } => {
                let Some(event_kind) = self.kinds.get(&kind) else {
                    return Err(ReplayError::UnknownKind { line, kind });
                };
                let values = values.into_iter().map(LogValue::from).collect();
                self.current.append_event(event_kind, ut, values);
            }
            ScriptOp::Word { word } => self.current.set_word(word),
            ScriptOp::Candidates { words } => self
                .current
                .initialize_candidates(CandidateList::new(words).shared()),
            ScriptOp::Digit => self.current.set_may_contain_digit(),
            ScriptOp::Correction => self.current.set_contains_correction(),
            ScriptOp::Split { cutoff } => {
                let later = self.current.split_by_time(cutoff);
                if !later.is_empty() {
                    let earlier = std::mem::replace(&mut self.current, later);
                    self.pending.push(earlier);
                }
            }
            ScriptOp::Merge => {
                let Some(mut earlier) = self.pending.pop() else {
                    return Err(ReplayError::NothingToMerge { line });
                };
                earlier.append(std::mem::take(&mut self.current));
                self.current = earlier;
            }
            ScriptOp::Publish { include_private } => {
                self.publish_all(include_private.unwrap_or(self.include_private_data));
            }
        }
        Ok(())
    }

    fn publish_all(&mut self, include_private_data: bool) {
        let current = std::mem::take(&mut self.current);
        for unit in self.pending.drain(..).chain(std::iter::once(current)) {
            if unit.is_empty() {
                continue;
            }
            let report = self.publisher.publish(&unit, include_private_data);
            self.summary.reports.push(report);
        }
    }

    /// Publish any remaining units and return the totals.
    pub fn finish(mut self) -> ReplaySummary {
        self.publish_all(self.include_private_data);
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, SharedSink};
    use crate::transparency::create_shared_log;

    fn replayer(memory: &MemorySink, include_private: bool) -> Replayer {
        let publisher = UnitPublisher::new(SharedSink::new(memory.clone()), create_shared_log());
        Replayer::new(publisher, include_private)
    }

    #[test]
    fn test_parse_operations() {
        let op: ScriptOp = serde_json::from_str(r#"{"op":"split","cutoff":10}"#).unwrap();
        assert!(matches!(op, ScriptOp::Split { cutoff: 10 }));

        let op: ScriptOp = serde_json::from_str(r#"{"op":"publish"}"#).unwrap();
        assert!(matches!(
            op,
            ScriptOp::Publish {
                include_private: None
            }
        ));
    }

    #[test]
    fn test_replay_publishes_word() {
        let script = r#"
# one typed word
{"op":"kind","name":"key","keys":["code"]}
{"op":"event","kind":"key","ut":1,"values":[99]}
{"op":"word","word":"cat"}
{"op":"publish"}
"#;
        let memory = MemorySink::new();
        let summary = replayer(&memory, true).run(script.as_bytes()).unwrap();

        assert_eq!(summary.units_published(), 1);
        let frames = memory.frames();
        assert_eq!(frames[0]["_wo"], "cat");
        assert_eq!(frames[1]["code"], 99);
    }

    #[test]
    fn test_unknown_kind_reports_line() {
        let script = "{\"op\":\"event\",\"kind\":\"nope\",\"ut\":1}\n";
        let memory = MemorySink::new();
        let err = replayer(&memory, false).run(script.as_bytes()).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownKind { line: 1, .. }));
    }

    #[test]
    fn test_merge_without_split_fails() {
        let memory = MemorySink::new();
        let err = replayer(&memory, false)
            .run("{\"op\":\"merge\"}".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ReplayError::NothingToMerge { line: 1 }));
    }

    #[test]
    fn test_split_units_publish_in_time_order() {
        let script = r#"
{"op":"kind","name":"key","keys":["code"]}
{"op":"event","kind":"key","ut":1,"values":[1]}
{"op":"event","kind":"key","ut":2,"values":[2]}
{"op":"event","kind":"key","ut":3,"values":[3]}
{"op":"split","cutoff":1}
"#;
        let memory = MemorySink::new();
        let summary = replayer(&memory, false).run(script.as_bytes()).unwrap();

        assert_eq!(summary.units_published(), 2);
        let uptimes: Vec<_> = memory
            .frames()
            .iter()
            .filter_map(|f| f.get("_ut").and_then(|v| v.as_u64()))
            .collect();
        assert_eq!(uptimes, vec![1, 2, 3]);
    }
}
