//! A group of related events that is published as one unit.
//!
//! A log unit holds every event recorded while one word was being composed
//! (or the events between two words). Individual events may be marked as
//! potentially private; those are only written when the publisher has decided
//! that publishing the whole unit cannot compromise the user's privacy.

use crate::sink::{Frame, SharedSink};
use crate::unit::types::{Event, EventKind, LogValue};
use crate::unit::{CandidateList, CandidateProvider, CorrectionType};
use std::sync::Arc;

/// A time-ordered batch of events with the word they produced.
#[derive(Debug, Clone, Default)]
pub struct LogUnit {
    /// Sorted by timestamp; callers append in non-decreasing order
    events: Vec<Event>,
    /// Word this unit generates. Separators alone do not make a word.
    word: Option<String>,
    correction_type: CorrectionType,
    may_contain_digit: bool,
    contains_correction: bool,
    is_part_of_mega_unit: bool,
    /// Frozen at first initialization
    candidates: Option<Arc<CandidateList>>,
}

/// What happened to a unit's events during one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Events that passed the privacy filter
    pub events_emitted: usize,
    /// Frames (begin, event and end) the sink accepted
    pub frames_written: usize,
    /// Frames the sink rejected
    pub frames_failed: usize,
    pub filtered_private: usize,
    pub filtered_revealing: usize,
}

impl PublishReport {
    /// True when every event was filtered and nothing reached the sink.
    pub fn is_suppressed(&self) -> bool {
        self.events_emitted == 0
    }

    fn record(&mut self, frame: &Frame, result: Result<(), crate::sink::SinkError>) {
        match result {
            Ok(()) => self.frames_written += 1,
            Err(e) => {
                self.frames_failed += 1;
                tracing::warn!(
                    frame = frame.event_type().unwrap_or("<unknown>"),
                    "Error in sink; dropping frame: {e}"
                );
            }
        }
    }
}

impl LogUnit {
    pub fn new() -> Self {
        Self::default()
    }

    fn fragment(events: Vec<Event>) -> Self {
        Self {
            events,
            is_part_of_mega_unit: true,
            ..Self::default()
        }
    }

    /// Record an event.
    ///
    /// Timestamps of successive calls must not decrease, or [`split_by_time`]
    /// will cut in the wrong place. Out-of-order events are still accepted.
    ///
    /// [`split_by_time`]: LogUnit::split_by_time
    pub fn append_event(&mut self, kind: &Arc<EventKind>, timestamp: u64, values: Vec<LogValue>) {
        if let Some(last) = self.events.last() {
            if timestamp < last.timestamp() {
                tracing::debug!(
                    kind = %kind.name,
                    timestamp,
                    previous = last.timestamp(),
                    "Event appended out of time order"
                );
            }
        }
        self.events.push(Event::new(Arc::clone(kind), timestamp, values));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Mark this unit as generating `word`.
    ///
    /// If a word was already set, the change is classified: with no candidate
    /// list it is a generic correction; if the new word was among the original
    /// candidates it is a typo fix; otherwise the user picked a different word.
    pub fn set_word(&mut self, word: impl Into<String>) {
        let word = word.into();
        if self.has_word() {
            self.correction_type = match &self.candidates {
                Some(candidates) if candidates.contains(&word) => CorrectionType::Typo,
                Some(_) => CorrectionType::DifferentWord,
                None => CorrectionType::Correction,
            };
        }
        self.word = Some(word);
    }

    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    pub fn has_word(&self) -> bool {
        self.word.as_deref().is_some_and(|w| !w.trim().is_empty())
    }

    pub fn set_may_contain_digit(&mut self) {
        self.may_contain_digit = true;
    }

    pub fn may_contain_digit(&self) -> bool {
        self.may_contain_digit
    }

    pub fn set_contains_correction(&mut self) {
        self.contains_correction = true;
    }

    pub fn contains_correction(&self) -> bool {
        self.contains_correction
    }

    pub fn set_correction_type(&mut self, correction_type: CorrectionType) {
        self.correction_type = correction_type;
    }

    pub fn correction_type(&self) -> CorrectionType {
        self.correction_type
    }

    pub fn is_part_of_mega_unit(&self) -> bool {
        self.is_part_of_mega_unit
    }

    /// Capture the candidates offered for the first attempt at the word.
    ///
    /// Only the first call has an effect, so later re-rankings never change
    /// what counts as a typo. The provider is not queried once a list is held.
    pub fn initialize_candidates(&mut self, provider: impl CandidateProvider) {
        if self.candidates.is_none() {
            self.candidates = Some(provider.candidates());
        }
    }

    pub fn candidates(&self) -> Option<&Arc<CandidateList>> {
        self.candidates.as_ref()
    }

    /// Split this unit at `max_time`.
    ///
    /// Events at or before `max_time` stay here; events after it move into the
    /// returned unit. When no event is later than `max_time` an empty unit is
    /// returned and this one is left untouched.
    pub fn split_by_time(&mut self, max_time: u64) -> LogUnit {
        let Some(index) = self.events.iter().position(|e| e.timestamp() > max_time) else {
            return LogUnit::new();
        };

        let mut later = LogUnit::fragment(self.events.split_off(index));
        later.may_contain_digit = self.may_contain_digit;
        later.contains_correction = self.contains_correction;

        self.is_part_of_mega_unit = true;
        later
    }

    /// Merge `other`, which must come later in time, onto the end of this unit.
    ///
    /// The current word is dropped before adopting `other`'s, so a merge never
    /// classifies a correction against the word held before the merge.
    pub fn append(&mut self, other: LogUnit) {
        self.events.extend(other.events);
        self.word = None;
        if let Some(word) = other.word {
            self.set_word(word);
        }
        self.may_contain_digit |= other.may_contain_digit;
        self.contains_correction |= other.contains_correction;
        self.is_part_of_mega_unit = false;
    }

    /// Write every event that passes the privacy filter to `sink`.
    ///
    /// The sink is locked when the first surviving event is found and held
    /// until the closing frame, so units published concurrently never
    /// interleave. A unit whose events are all filtered writes nothing.
    /// Sink failures are logged and counted, never returned.
    pub fn publish_to(&self, sink: &SharedSink, include_private_data: bool) -> PublishReport {
        let mut report = PublishReport::default();
        let mut writer = None;

        for event in &self.events {
            let kind = event.kind();
            if !include_private_data && kind.is_potentially_private {
                report.filtered_private += 1;
                continue;
            }
            if self.is_part_of_mega_unit && kind.is_potentially_revealing {
                report.filtered_revealing += 1;
                continue;
            }

            if writer.is_none() {
                let mut guard = sink.lock();
                let start = self.start_frame(include_private_data);
                report.record(&start, guard.write_frame(&start));
                writer = Some(guard);
            }

            if let Some(guard) = writer.as_mut() {
                let frame = Frame::event(event);
                report.record(&frame, guard.write_frame(&frame));
                report.events_emitted += 1;
            }
        }

        if let Some(mut guard) = writer {
            let end = Frame::unit_end();
            report.record(&end, guard.write_frame(&end));
            if let Err(e) = guard.flush() {
                tracing::warn!("Could not flush sink after log unit: {e}");
            }
        }

        report
    }

    fn start_frame(&self, include_private_data: bool) -> Frame {
        if include_private_data {
            Frame::unit_start_with_word(self.word(), self.correction_type)
        } else {
            Frame::unit_start()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn kind(name: &str) -> Arc<EventKind> {
        EventKind::new(name, ["value"]).shared()
    }

    fn unit_with_times(times: &[u64]) -> LogUnit {
        let kind = kind("tick");
        let mut unit = LogUnit::new();
        for &t in times {
            unit.append_event(&kind, t, vec![LogValue::from(t as i64)]);
        }
        unit
    }

    fn times(unit: &LogUnit) -> Vec<u64> {
        unit.events().iter().map(Event::timestamp).collect()
    }

    #[test]
    fn test_split_partitions_by_cutoff() {
        let mut unit = unit_with_times(&[10, 20, 30, 40]);
        unit.set_word("cat");
        unit.set_may_contain_digit();

        let later = unit.split_by_time(20);

        assert_eq!(times(&unit), vec![10, 20]);
        assert_eq!(times(&later), vec![30, 40]);
        assert!(unit.is_part_of_mega_unit());
        assert!(later.is_part_of_mega_unit());
        assert!(later.may_contain_digit());
        assert!(!later.contains_correction());
        assert_eq!(later.word(), None);
        assert_eq!(unit.word(), Some("cat"));
    }

    #[test]
    fn test_split_with_nothing_later_is_noop() {
        let mut unit = unit_with_times(&[10, 20]);
        let later = unit.split_by_time(20);

        assert!(later.is_empty());
        assert!(!later.is_part_of_mega_unit());
        assert_eq!(times(&unit), vec![10, 20]);
        assert!(!unit.is_part_of_mega_unit());
    }

    #[test]
    fn test_split_everything_later() {
        let mut unit = unit_with_times(&[10, 20]);
        let later = unit.split_by_time(5);
        assert!(unit.is_empty());
        assert_eq!(times(&later), vec![10, 20]);
    }

    #[test]
    fn test_merge_concatenates_and_ors_flags() {
        let mut first = unit_with_times(&[1, 2]);
        first.set_contains_correction();
        let mut second = unit_with_times(&[3, 4]);
        second.set_may_contain_digit();

        let _ = first.split_by_time(1);
        first.append(second);

        assert_eq!(times(&first), vec![1, 3, 4]);
        assert!(first.may_contain_digit());
        assert!(first.contains_correction());
        assert!(!first.is_part_of_mega_unit());
    }

    #[test]
    fn test_split_then_merge_restores_order() {
        let mut unit = unit_with_times(&[1, 2, 3, 4, 5]);
        let later = unit.split_by_time(3);
        unit.append(later);
        assert_eq!(times(&unit), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_merge_adopts_other_word_without_classifying() {
        // The held word is cleared before the other unit's word is set, so no
        // correction is recorded even though the words differ.
        let mut first = LogUnit::new();
        first.initialize_candidates(CandidateList::new(["cat", "hat"]).shared());
        first.set_word("cat");
        let mut second = LogUnit::new();
        second.set_word("dog");

        first.append(second);

        assert_eq!(first.word(), Some("dog"));
        assert_eq!(first.correction_type(), CorrectionType::None);
    }

    #[test]
    fn test_merge_without_other_word_clears_word() {
        let mut first = LogUnit::new();
        first.set_word("cat");
        first.append(LogUnit::new());
        assert_eq!(first.word(), None);
        assert!(!first.has_word());
    }

    #[test]
    fn test_repeated_word_without_candidates_is_correction() {
        let mut unit = LogUnit::new();
        unit.set_word("cat");
        assert_eq!(unit.correction_type(), CorrectionType::None);
        unit.set_word("cat");
        assert_eq!(unit.correction_type(), CorrectionType::Correction);
    }

    #[test]
    fn test_candidate_word_is_typo() {
        let mut unit = LogUnit::new();
        unit.initialize_candidates(CandidateList::new(["cat", "hat"]).shared());
        unit.set_word("cat");
        unit.set_word("cat");
        assert_eq!(unit.correction_type(), CorrectionType::Typo);
    }

    #[test]
    fn test_non_candidate_word_is_different_word() {
        let mut unit = LogUnit::new();
        unit.initialize_candidates(CandidateList::new(["cat", "hat"]).shared());
        unit.set_word("cat");
        unit.set_word("dog");
        assert_eq!(unit.correction_type(), CorrectionType::DifferentWord);
        assert_eq!(unit.word(), Some("dog"));
    }

    #[test]
    fn test_candidates_are_first_writer_wins() {
        let mut unit = LogUnit::new();
        unit.initialize_candidates(CandidateList::new(["cat"]).shared());
        unit.initialize_candidates(CandidateList::new(["dog"]).shared());

        unit.set_word("cat");
        unit.set_word("dog");
        assert_eq!(unit.correction_type(), CorrectionType::DifferentWord);
        assert_eq!(unit.candidates().map(|c| c.words().len()), Some(1));
    }

    struct CountingProvider<'a>(&'a std::cell::Cell<usize>);

    impl CandidateProvider for CountingProvider<'_> {
        fn candidates(&self) -> Arc<CandidateList> {
            self.0.set(self.0.get() + 1);
            CandidateList::new(["cat"]).shared()
        }
    }

    #[test]
    fn test_provider_queried_at_most_once() {
        let calls = std::cell::Cell::new(0);
        let mut unit = LogUnit::new();
        unit.initialize_candidates(CountingProvider(&calls));
        unit.initialize_candidates(CountingProvider(&calls));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_whitespace_word_is_not_a_word() {
        let mut unit = LogUnit::new();
        unit.set_word("   ");
        assert!(!unit.has_word());

        // A later word is not a correction of a blank one
        unit.set_word("cat");
        assert_eq!(unit.correction_type(), CorrectionType::None);
    }

    #[test]
    fn test_out_of_order_events_are_kept() {
        let unit = unit_with_times(&[10, 5]);
        assert_eq!(times(&unit), vec![10, 5]);
    }

    #[test]
    fn test_publish_filters_private_events() {
        let private = EventKind::new("secret", ["code"]).private().shared();
        let public = EventKind::new("public", ["code"]).shared();
        let mut unit = LogUnit::new();
        unit.append_event(&private, 1, vec![LogValue::from(1)]);
        unit.append_event(&public, 2, vec![LogValue::from(2)]);

        let memory = MemorySink::new();
        let sink = SharedSink::new(memory.clone());
        let report = unit.publish_to(&sink, false);

        let frames = memory.frames();
        let types: Vec<_> = frames.iter().map(|f| f["_ty"].as_str().unwrap()).collect();
        assert_eq!(types, vec!["logUnitStart", "public", "logUnitEnd"]);
        assert_eq!(report.filtered_private, 1);
        assert_eq!(report.frames_written, 3);
    }

    #[test]
    fn test_publish_all_filtered_writes_nothing() {
        let private = EventKind::new("secret", ["code"]).private().shared();
        let mut unit = LogUnit::new();
        unit.append_event(&private, 1, vec![LogValue::from(1)]);

        let memory = MemorySink::new();
        let report = unit.publish_to(&SharedSink::new(memory.clone()), false);

        assert!(memory.frames().is_empty());
        assert!(report.is_suppressed());
    }

    #[test]
    fn test_publish_drops_revealing_events_in_mega_unit() {
        let revealing = EventKind::new("commit", ["text"]).revealing().shared();
        let mut unit = LogUnit::new();
        unit.append_event(&revealing, 1, vec![LogValue::from("a")]);
        unit.append_event(&revealing, 5, vec![LogValue::from("b")]);

        let memory = MemorySink::new();
        let sink = SharedSink::new(memory.clone());

        // Not part of a mega-unit yet: revealing events are written
        unit.publish_to(&sink, true);
        assert_eq!(memory.frames().len(), 4);

        let later = unit.split_by_time(1);
        memory.clear();
        let report = later.publish_to(&sink, true);
        assert!(memory.frames().is_empty());
        assert_eq!(report.filtered_revealing, 1);
    }

    #[test]
    fn test_start_frame_carries_word_only_with_private_data() {
        let kind = kind("tick");
        let mut unit = LogUnit::new();
        unit.append_event(&kind, 1, vec![LogValue::from(1)]);
        unit.set_word("cat");
        unit.set_word("hat");

        let memory = MemorySink::new();
        let sink = SharedSink::new(memory.clone());

        unit.publish_to(&sink, true);
        let start = &memory.frames()[0];
        assert_eq!(start["_wo"], "hat");
        assert_eq!(start["_corType"], 1);

        memory.clear();
        unit.publish_to(&sink, false);
        let start = &memory.frames()[0];
        assert!(start.get("_wo").is_none());
        assert!(start.get("_corType").is_none());
    }
}
