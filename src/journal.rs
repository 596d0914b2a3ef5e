//! Serialized event journal.
//!
//! Every observable transition in the simulation is appended here as a
//! `(timestamp, message)` entry. A single writer lock is held across both
//! timestamp sampling and the append, so buffer order and timestamp order
//! agree: rendered timestamps are monotonically non-decreasing.
//!
//! The journal is owned state, not a global stream; the simulation hands
//! out shared references and delivers the rendered buffer to a file, the
//! terminal, or both once the run completes.

use std::fs;
use std::io;
use std::sync::Mutex;

use crate::clock::SimClock;
use crate::types::{LogTarget, TimeUs};

/// A single journal entry. Diagnostics emitted before the simulation
/// clock is meaningful (missing input files) carry no timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub micros: Option<TimeUs>,
    pub message: String,
}

impl Entry {
    /// Render as a log line: `<seconds.micro> - <message>` with exactly
    /// six fractional digits, or the bare message for diagnostics.
    pub fn render(&self) -> String {
        match self.micros {
            Some(us) => format!("{:.6} - {}", us as f64 * 1e-6, self.message),
            None => self.message.clone(),
        }
    }
}

/// Append-only, totally ordered event log.
pub struct Journal {
    clock: SimClock,
    entries: Mutex<Vec<Entry>>,
}

impl Journal {
    /// Create an empty journal and establish the simulation clock.
    pub fn new() -> Self {
        Journal {
            clock: SimClock::start(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append one timestamped line. The timestamp is sampled after the
    /// writer lock is acquired.
    pub fn line(&self, message: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(Entry {
            micros: Some(self.clock.elapsed_micros()),
            message: message.into(),
        });
    }

    /// Append several timestamped lines under one lock acquisition, so no
    /// other writer can interleave between them. Each line still gets its
    /// own timestamp.
    pub fn lines<I, S>(&self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = self.entries.lock().unwrap();
        for message in messages {
            entries.push(Entry {
                micros: Some(self.clock.elapsed_micros()),
                message: message.into(),
            });
        }
    }

    /// Append an untimestamped diagnostic line.
    pub fn note(&self, message: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(Entry {
            micros: None,
            message: message.into(),
        });
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    /// Snapshot of all messages, without timestamps.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    /// Number of entries whose message contains `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.message.contains(needle))
            .count()
    }

    /// Timestamp of the first entry whose message contains `needle`.
    pub fn micros_of(&self, needle: &str) -> Option<TimeUs> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.message.contains(needle))
            .and_then(|e| e.micros)
    }

    /// Render the whole journal, one line per entry.
    pub fn render(&self) -> String {
        let entries = self.entries.lock().unwrap();
        let mut out = String::new();
        for entry in entries.iter() {
            out.push_str(&entry.render());
            out.push('\n');
        }
        out
    }

    /// Deliver the rendered journal to the configured destination.
    pub fn deliver(&self, target: LogTarget, path: &str) -> io::Result<()> {
        let rendered = self.render();
        if matches!(target, LogTarget::Monitor | LogTarget::Both) {
            print!("{rendered}");
        }
        if matches!(target, LogTarget::File | LogTarget::Both) {
            fs::write(path, &rendered)?;
        }
        Ok(())
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_render_six_digits() {
        let entry = Entry {
            micros: Some(1_500_000),
            message: "Simulator program starting".into(),
        };
        assert_eq!(entry.render(), "1.500000 - Simulator program starting");

        let entry = Entry {
            micros: Some(123),
            message: "x".into(),
        };
        assert_eq!(entry.render(), "0.000123 - x");
    }

    #[test]
    fn test_note_has_no_timestamp() {
        let journal = Journal::new();
        journal.note("No configuration file found.");
        let entries = journal.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].micros, None);
        assert_eq!(entries[0].render(), "No configuration file found.");
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let journal = Journal::new();
        for i in 0..100 {
            journal.line(format!("event {i}"));
        }
        let entries = journal.entries();
        for pair in entries.windows(2) {
            assert!(pair[0].micros <= pair[1].micros);
        }
    }

    #[test]
    fn test_lines_keep_pair_adjacent() {
        let journal = Journal::new();
        journal.lines(["OS: preparing process 1", "OS: starting process 1"]);
        let messages = journal.messages();
        assert_eq!(
            messages,
            vec!["OS: preparing process 1", "OS: starting process 1"]
        );
    }

    #[test]
    fn test_deliver_to_file() {
        let journal = Journal::new();
        journal.line("Simulator program starting");
        journal.line("Simulator program ending");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.lgf");
        journal
            .deliver(LogTarget::File, path.to_str().unwrap())
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, journal.render());
        assert!(written.ends_with("Simulator program ending\n"));
    }
}
