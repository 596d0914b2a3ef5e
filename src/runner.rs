//! Quantum-bounded process runner.
//!
//! The runner advances one process by up to `quantum` CPU/memory cycles
//! per invocation, interpreting opcodes head-first. CPU and memory
//! opcodes are executed cycle by cycle with a busy-wait per cycle and may
//! be preempted at the quantum boundary; I/O opcodes are handed off to a
//! worker thread and count as consumed once the worker has begun.
//!
//! Preemption granularity: the quantum bound is checked at cycle
//! `quantum - 1`, so the "interrupt" line for a preempted opcode is
//! emitted on the final cycle of the window, and an opcode whose last
//! cycle lands exactly there emits "end" instead.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam::channel::bounded;
use tracing::debug;

use crate::clock::Stopwatch;
use crate::config::Config;
use crate::engine::SimContext;
use crate::process::{OpKind, Process};
use crate::types::{Cycles, DeviceClass, IoDirection, ProcState};
use crate::workers::{self, IoRequest};

/// Runs processes against one configuration and simulation context.
pub struct Runner<'a> {
    cfg: &'a Config,
    ctx: &'a Arc<SimContext>,
}

impl<'a> Runner<'a> {
    pub fn new(cfg: &'a Config, ctx: &'a Arc<SimContext>) -> Self {
        Runner { cfg, ctx }
    }

    /// Advance `process` by up to `quantum` cycles or until it exits,
    /// whichever comes first. Mutates the process in place; may dispatch
    /// I/O workers.
    pub fn run(&self, process: &mut Process) {
        let mut cycles_run: Cycles = 0;

        while cycles_run < self.cfg.quantum && !process.is_exited() {
            let needs_dequeue = process
                .current
                .as_ref()
                .map_or(true, |op| op.cycles == 0 || op.is_io());
            if needs_dequeue && !self.dequeue(process) {
                // Workload exhausted without an A(end); stop rather than
                // spin on an empty queue.
                debug!(process = process.number, "opcode queue exhausted");
                break;
            }

            cycles_run = self.execute(process, cycles_run);
        }

        process.time_remaining = (process.time_remaining - cycles_run as i64).max(0);
        debug!(
            process = process.number,
            cycles_run,
            time_remaining = process.time_remaining,
            "turn over"
        );
    }

    /// Pull the next opcode into the current slot. A freshly dequeued
    /// `P(run)` is discounted by two cycles per completed cache
    /// operation (floor 1), with the saved cycles deducted from
    /// `time_remaining` immediately.
    fn dequeue(&self, process: &mut Process) -> bool {
        let Some(mut op) = process.queue.pop_front() else {
            return false;
        };

        if op.kind == OpKind::Processing && process.cache_count > 0 {
            let discounted = op.cycles.saturating_sub(2 * process.cache_count).max(1);
            process.time_remaining -= op.cycles as i64 - discounted as i64;
            op.cycles = discounted;
        }

        process.current = Some(op);
        true
    }

    /// Execute the current opcode until it completes, the quantum is
    /// exhausted, or an I/O worker is dispatched. Takes and returns the
    /// running cycle counter for this turn.
    fn execute(&self, process: &mut Process, mut cycle: Cycles) -> Cycles {
        let quantum = self.cfg.quantum;
        let journal = &self.ctx.journal;
        let Process {
            state,
            number,
            cache_count,
            current,
            live_io,
            ..
        } = process;
        let number = *number;
        let Some(op) = current.as_mut() else {
            return cycle;
        };

        // Lifecycle markers transition state; no time, no log line.
        match op.kind {
            OpKind::SimStart => *state = ProcState::Ready,
            OpKind::AppStart => *state = ProcState::Running,
            OpKind::SimEnd | OpKind::AppEnd => *state = ProcState::Exit,
            _ => {}
        }

        let mut dispatched = false;
        while op.cycles > 0 && cycle < quantum && !dispatched {
            match op.kind {
                OpKind::Processing => {
                    if !op.started {
                        journal.line(format!("Process {number} start processing action"));
                        op.started = true;
                    }
                    Stopwatch::start().busy_wait_micros(self.cfg.processor_ms as u64 * 1000);
                    op.cycles -= 1;

                    if op.cycles == 0 {
                        journal.line(format!("Process {number} end processing action"));
                    } else if cycle + 1 == quantum {
                        journal.line(format!("Process {number} interrupt processing action"));
                    }
                }
                OpKind::MemAllocate => {
                    if !op.started {
                        journal.line(format!("Process {number} allocating memory"));
                        op.started = true;
                    }
                    Stopwatch::start().busy_wait_micros(self.cfg.memory_ms as u64 * 1000);
                    op.cycles -= 1;

                    if op.cycles == 0 {
                        let address = self
                            .ctx
                            .memory
                            .lock()
                            .unwrap()
                            .allocate(self.cfg.system_memory_kb, self.cfg.block_size_kb);
                        journal
                            .line(format!("Process {number} memory allocated at 0x{address:08x}"));
                    } else if cycle + 1 == quantum {
                        journal.line(format!("Process {number} interrupt memory allocation"));
                    }
                }
                OpKind::MemCache => {
                    if !op.started {
                        journal.line(format!("Process {number} start memory caching"));
                        op.started = true;
                    }
                    Stopwatch::start().busy_wait_micros(self.cfg.memory_ms as u64 * 1000);
                    op.cycles -= 1;

                    if op.cycles == 0 {
                        journal.line(format!("Process {number} end memory caching"));
                        *cache_count += 1;
                    } else if cycle + 1 == quantum {
                        journal.line(format!("Process {number} interrupt memory caching"));
                    }
                }
                OpKind::Io { class, direction } => {
                    *state = ProcState::Waiting;
                    self.dispatch_io(number, class, direction, op.cycles, Arc::clone(live_io));
                    *state = ProcState::Running;
                    dispatched = true;
                    // The opcode is consumed from the runner's view; jump
                    // the counter to end the turn for it.
                    cycle = op.cycles;
                }
                OpKind::SimStart | OpKind::SimEnd | OpKind::AppStart | OpKind::AppEnd => break,
            }
            cycle += 1;
        }

        cycle
    }

    /// Hand an I/O opcode to a worker thread and wait until the worker
    /// has recorded its start event.
    fn dispatch_io(
        &self,
        number: u32,
        class: DeviceClass,
        direction: IoDirection,
        cycles: Cycles,
        process_io: Arc<std::sync::atomic::AtomicUsize>,
    ) {
        process_io.fetch_add(1, Ordering::SeqCst);
        debug!(process = number, class = %class, cycles, "dispatching I/O");

        let (ready_tx, ready_rx) = bounded(1);
        let request = IoRequest {
            process_number: number,
            class,
            direction,
            cycles,
            device_ms: self.cfg.device_ms(class),
            process_io,
            ready: ready_tx,
        };

        let ctx = Arc::clone(self.ctx);
        self.ctx
            .workers
            .spawn(format!("io-p{number}"), move || workers::run_io(&ctx, request));

        ready_rx
            .recv()
            .expect("I/O worker exited before signaling readiness");
    }
}
