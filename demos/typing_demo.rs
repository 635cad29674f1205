//! Demonstration of log units for a typed, corrected word.
//!
//! This example shows how to:
//! 1. Declare event kinds with privacy flags
//! 2. Record a word and a correction into a log unit
//! 3. Split the unit at a word boundary
//! 4. Publish both halves through a background publisher
//!
//! Run with: cargo run --example typing_demo

use std::sync::Arc;

use synheart_research_log::{
    transparency::create_shared_log,
    unit::{MotionAction, MotionSample, PointerSample},
    BackgroundPublisher, CandidateList, EventKind, LogUnit, LogValue, MemorySink, SharedSink,
    UnitPublisher, PRIVACY_DECLARATION,
};

fn main() {
    println!("Synheart Research Log - Typing Demo");
    println!("===================================");
    println!();
    println!("{PRIVACY_DECLARATION}");

    let touch = EventKind::new("onTouch", ["motion"]).private().shared();
    let code = EventKind::new("onCodeInput", ["code"]).private().shared();
    let pick = EventKind::new("pickSuggestion", ["index", "suggestion"])
        .revealing()
        .shared();
    let space = EventKind::new("onSeparator", ["isSpace"]).shared();

    let mut unit = LogUnit::new();
    record_tap(&mut unit, &touch, &code, 100, 'h');
    record_tap(&mut unit, &touch, &code, 180, 't');
    unit.initialize_candidates(CandidateList::new(["ht", "hat", "hit"]).shared());
    unit.set_word("ht");

    unit.append_event(&pick, 260, vec![LogValue::from(1), LogValue::from("hat")]);
    unit.set_word("hat");
    unit.append_event(&space, 300, vec![LogValue::from(true)]);

    println!(
        "Recorded {} events, word {:?} ({})",
        unit.len(),
        unit.word(),
        unit.correction_type()
    );

    // Everything after the suggestion pick belongs to the next word
    let next = unit.split_by_time(260);
    println!("Split into {} + {} events", unit.len(), next.len());

    let memory = MemorySink::new();
    let transparency = create_shared_log();
    let publisher = UnitPublisher::new(SharedSink::new(memory.clone()), transparency.clone());
    let mut background = BackgroundPublisher::start(publisher, 16);

    for part in [unit, next] {
        if let Err(e) = background.submit(part, false) {
            eprintln!("Could not queue unit: {e}");
        }
    }
    background.shutdown();

    println!();
    println!("Published frames:");
    for frame in memory.frames() {
        println!("  {frame}");
    }
    println!();
    println!("{}", transparency.summary());
}

fn record_tap(
    unit: &mut LogUnit,
    touch: &Arc<EventKind>,
    code: &Arc<EventKind>,
    time: u64,
    key: char,
) {
    let motion = MotionSample::new(MotionAction::Down, time).with_pointer(PointerSample {
        id: 0,
        x: 40.0,
        y: 120.0,
        time,
    });
    unit.append_event(touch, time, vec![LogValue::from(motion)]);
    unit.append_event(code, time + 20, vec![LogValue::from(key as i64)]);
    if key.is_ascii_digit() {
        unit.set_may_contain_digit();
    }
}
