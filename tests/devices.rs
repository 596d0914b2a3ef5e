//! Device admission: contention on single-slot classes, parallelism and
//! slot labeling on multi-slot classes.

use procsim::{Config, TimeUs};

mod common;

/// Slot index parsed from a device event line (`... on HDD 1`).
fn slot_of(message: &str) -> usize {
    message
        .rsplit(' ')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("no slot index in {message:?}"))
}

/// Two processes contending for one hard drive serialize on it.
#[test]
fn test_hard_drive_contention_serializes() {
    common::setup_test();
    let cfg = Config {
        quantum: 100,
        hd_count: 1,
        hard_drive_ms: 5,
        ..Config::default()
    };
    let sim = common::run_workload(
        cfg,
        "Code: S(start)0; \
         A(start)0; I(hard drive)2; A(end)0; \
         A(start)0; I(hard drive)2; A(end)0; S(end)0.",
    );
    let journal = sim.journal();

    let p1_start = journal.micros_of("Process 1 start hard drive input").unwrap();
    let p1_end = journal.micros_of("Process 1 end hard drive input").unwrap();
    let p2_start = journal.micros_of("Process 2 start hard drive input").unwrap();

    // Both operations name the only slot.
    let messages = journal.messages();
    for index in common::positions(&messages, "hard drive input") {
        assert_eq!(slot_of(&messages[index]), 0);
    }

    // The second operation holds off until the first releases.
    assert!(p1_start < p1_end);
    assert!(
        p2_start >= p1_end,
        "second transfer started at {p2_start}us before the first ended at {p1_end}us"
    );
    // Each transfer occupies the drive for 2 cycles of 5ms.
    assert!(p1_end - p1_start >= 10_000 - common::SLACK_US);
}

/// Three printer jobs against two printers: the first two run in
/// parallel on distinct slots, the third waits for a free slot.
#[test]
fn test_parallel_printers_bounded_by_quantity() {
    common::setup_test();
    let cfg = Config {
        quantum: 100,
        printer_count: 2,
        printer_ms: 10,
        ..Config::default()
    };
    let sim = common::run_workload(
        cfg,
        "Code: S(start)0; \
         A(start)0; O(printer)1; A(end)0; \
         A(start)0; O(printer)1; A(end)0; \
         A(start)0; O(printer)1; A(end)0; S(end)0.",
    );
    let journal = sim.journal();
    let messages = journal.messages();

    let starts = common::positions(&messages, "start printer output");
    let ends = common::positions(&messages, "end printer output");
    assert_eq!(starts.len(), 3);
    assert_eq!(ends.len(), 3);

    // The first two jobs overlap on distinct slots.
    let first_slot = slot_of(&messages[starts[0]]);
    let second_slot = slot_of(&messages[starts[1]]);
    assert_ne!(first_slot, second_slot, "concurrent jobs shared a slot");

    // The third job starts only after one of the first two has ended,
    // and takes over whichever slot freed.
    let entries = sim.journal().entries();
    let micros_at = |index: usize| entries[index].micros.unwrap();
    let earliest_end: TimeUs = ends[..2].iter().map(|&i| micros_at(i)).min().unwrap();
    assert!(
        micros_at(starts[2]) >= earliest_end,
        "third job started before a printer freed"
    );
    assert!([first_slot, second_slot].contains(&slot_of(&messages[starts[2]])));

    // At no point do in-flight jobs exceed the printer quantity.
    let mut in_flight = 0usize;
    let mut peak = 0usize;
    for message in &messages {
        if message.contains("start printer output") {
            in_flight += 1;
            peak = peak.max(in_flight);
        } else if message.contains("end printer output") {
            in_flight -= 1;
        }
    }
    assert!(peak <= 2, "printer multiplicity exceeded: {peak} in flight");
}

/// Keyboard and monitor are direction-fixed and carry no slot label.
#[test]
fn test_keyboard_and_monitor_events() {
    common::setup_test();
    let cfg = Config {
        quantum: 100,
        ..Config::default()
    };
    let sim = common::run_workload(
        cfg,
        "Code: S(start)0; A(start)0; I(keyboard)1; O(monitor)1; A(end)0; S(end)0.",
    );
    let messages = sim.journal().messages();

    assert!(messages.contains(&"Process 1 start keyboard input".to_string()));
    assert!(messages.contains(&"Process 1 end keyboard input".to_string()));
    assert!(messages.contains(&"Process 1 start monitor output".to_string()));
    assert!(messages.contains(&"Process 1 end monitor output".to_string()));
}

/// Hard drives serve both directions; the opcode letter picks one.
#[test]
fn test_hard_drive_serves_both_directions() {
    common::setup_test();
    let cfg = Config {
        quantum: 100,
        hd_count: 2,
        ..Config::default()
    };
    let sim = common::run_workload(
        cfg,
        "Code: S(start)0; A(start)0; I(hard drive)1; O(hard drive)1; A(end)0; S(end)0.",
    );
    let journal = sim.journal();

    assert_eq!(journal.count_matching("start hard drive input on HDD"), 1);
    assert_eq!(journal.count_matching("start hard drive output on HDD"), 1);
}
