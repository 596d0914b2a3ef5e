//! Type aliases and enums for domain concepts.
//!
//! Quantities (microseconds, cycle counts) are plain aliases for
//! self-documenting signatures; closed vocabularies (process states,
//! scheduling policies, device classes) are enums so that dispatch is
//! exhaustive and string comparison stays confined to the parsers.

use std::fmt;

/// Elapsed time in microseconds since simulation start.
pub type TimeUs = u64;

/// A count of simulated work cycles.
pub type Cycles = u32;

/// Lifecycle state of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    /// Created but not yet touched by the scheduler.
    New,
    /// Admitted by the simulator (`S/start` consumed).
    Ready,
    /// Selected and executing opcodes.
    Running,
    /// Blocked on an I/O worker handoff.
    Waiting,
    /// Terminal; reached by consuming `A/end` (or `S/end`).
    Exit,
}

/// Scheduling policy selector.
///
/// `Srtf` and `Sjf` share the same selection rule: both scan live
/// `time_remaining`, so the classical initial-burst/remaining-burst
/// distinction collapses. Both variants are kept so a workload file can
/// name either without the choice being silently rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedPolicy {
    RoundRobin,
    Srtf,
    Sjf,
}

/// Where the accumulated journal is delivered on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Monitor,
    Both,
}

/// Direction of an I/O operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    Input,
    Output,
}

impl IoDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            IoDirection::Input => "input",
            IoDirection::Output => "output",
        }
    }
}

/// One of the four simulated device classes.
///
/// Keyboard and monitor are direction-fixed single-unit devices; hard
/// drives and printers come in configurable quantities and label each
/// unit with a slot index in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    HardDrive,
    Keyboard,
    Monitor,
    Printer,
}

impl DeviceClass {
    /// The descriptor used for this class in metadata workloads.
    pub fn descriptor(self) -> &'static str {
        match self {
            DeviceClass::HardDrive => "hard drive",
            DeviceClass::Keyboard => "keyboard",
            DeviceClass::Monitor => "monitor",
            DeviceClass::Printer => "printer",
        }
    }

    /// The slot label printed in start/end events, if this class has one.
    pub fn slot_label(self) -> Option<&'static str> {
        match self {
            DeviceClass::HardDrive => Some("HDD"),
            DeviceClass::Printer => Some("PRNTR"),
            DeviceClass::Keyboard | DeviceClass::Monitor => None,
        }
    }

    /// The direction this class always serves, or `None` for hard drives
    /// which take their direction from the opcode.
    pub fn fixed_direction(self) -> Option<IoDirection> {
        match self {
            DeviceClass::Keyboard => Some(IoDirection::Input),
            DeviceClass::Monitor | DeviceClass::Printer => Some(IoDirection::Output),
            DeviceClass::HardDrive => None,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}
