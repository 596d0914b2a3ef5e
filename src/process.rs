//! Process model: metadata opcodes and the process control block.
//!
//! An opcode is one declarative unit of simulated work. Opcodes are a
//! tagged variant — descriptors are resolved once at parse time, and the
//! runner dispatches on the variant, not on strings.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::types::{Cycles, DeviceClass, IoDirection, ProcState};

/// The operation an opcode performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// `S(start)` — simulator lifecycle marker; admits the process.
    SimStart,
    /// `S(end)` — simulator lifecycle marker.
    SimEnd,
    /// `A(start)` — process lifecycle marker; begins execution.
    AppStart,
    /// `A(end)` — process lifecycle marker; terminal.
    AppEnd,
    /// `P(run)` — CPU-bound work.
    Processing,
    /// `M(allocate)` — memory allocation.
    MemAllocate,
    /// `M(cache)` — memory caching; completed caches discount later
    /// `P(run)` opcodes.
    MemCache,
    /// `I(...)`/`O(...)` — device I/O, handed off to a worker.
    Io {
        class: DeviceClass,
        direction: IoDirection,
    },
}

/// One unit of simulated work with its remaining cycle count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub kind: OpKind,
    /// Remaining cycles; decremented as the opcode executes.
    pub cycles: Cycles,
    /// Latched on first execution so the "start" line is emitted exactly
    /// once even when the opcode is preempted mid-way.
    pub started: bool,
}

impl Opcode {
    pub fn new(kind: OpKind, cycles: Cycles) -> Self {
        Opcode {
            kind,
            cycles,
            started: false,
        }
    }

    /// Whether this opcode is dispatched to an I/O worker.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, OpKind::Io { .. })
    }
}

/// A simulated process: control state plus its opcode workload.
#[derive(Debug)]
pub struct Process {
    pub state: ProcState,
    /// 1-based process number, assigned in metadata order.
    pub number: u32,
    /// Completed `M(cache)` operations; biases later `P(run)` durations.
    pub cache_count: u32,
    /// Opcodes not yet begun, consumed head-first.
    pub queue: VecDeque<Opcode>,
    /// The partially executed opcode, if any.
    pub current: Option<Opcode>,
    /// Summed remaining cycles across queued + current opcodes. Drives
    /// SJF/SRTF selection.
    pub time_remaining: i64,
    /// Whether the completion event has been emitted.
    pub completed: bool,
    /// In-flight I/O workers dispatched for this process. Shared with the
    /// workers themselves, which decrement it on exit.
    pub live_io: Arc<AtomicUsize>,
}

impl Process {
    pub fn new(number: u32) -> Self {
        Process {
            state: ProcState::New,
            number,
            cache_count: 0,
            queue: VecDeque::new(),
            current: None,
            time_remaining: 0,
            completed: false,
            live_io: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Append an opcode to the workload, accounting its cycles toward
    /// `time_remaining`.
    pub fn push_op(&mut self, op: Opcode) {
        self.time_remaining += op.cycles as i64;
        self.queue.push_back(op);
    }

    /// Number of I/O workers this process has in flight.
    pub fn live_io(&self) -> usize {
        self.live_io.load(Ordering::SeqCst)
    }

    pub fn is_exited(&self) -> bool {
        self.state == ProcState::Exit
    }
}
