//! Scheduler loop: top-level control of the simulation.
//!
//! The engine is logically single-CPU. One scheduler thread selects the
//! next runnable process by the configured policy, gives it to the runner
//! for one quantum, and sweeps completion events after every turn. I/O
//! workers run concurrently and are deterministically joined at shutdown
//! before the closing event is recorded.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::Config;
use crate::devices::DeviceArbiter;
use crate::journal::Journal;
use crate::memory::MemoryTracker;
use crate::process::Process;
use crate::runner::Runner;
use crate::types::SchedPolicy;
use crate::workers::WorkerSet;

/// State shared between the scheduler thread and I/O workers.
pub struct SimContext {
    pub journal: Journal,
    pub devices: DeviceArbiter,
    pub workers: WorkerSet,
    /// Last allocated address. Only the scheduler thread allocates, but
    /// the tracker lives with the rest of the shared state and keeps the
    /// same locking discipline.
    pub memory: Mutex<MemoryTracker>,
}

impl SimContext {
    pub fn new(cfg: &Config, journal: Journal) -> Self {
        SimContext {
            journal,
            devices: DeviceArbiter::new(cfg),
            workers: WorkerSet::new(),
            memory: Mutex::new(MemoryTracker::new()),
        }
    }
}

/// The simulation engine: owns the process table for its lifetime.
pub struct Simulator {
    cfg: Config,
    processes: Vec<Process>,
    ctx: Arc<SimContext>,
}

impl Simulator {
    pub fn new(cfg: Config, processes: Vec<Process>, journal: Journal) -> Self {
        let ctx = Arc::new(SimContext::new(&cfg, journal));
        Simulator {
            cfg,
            processes,
            ctx,
        }
    }

    /// The event journal, including everything recorded so far.
    pub fn journal(&self) -> &Journal {
        &self.ctx.journal
    }

    /// Run the simulation to completion.
    pub fn run(&mut self) {
        info!(
            processes = self.processes.len(),
            policy = ?self.cfg.policy,
            quantum = self.cfg.quantum,
            "simulation starting"
        );
        self.ctx.journal.line("Simulator program starting");

        let mut prev: Option<usize> = None;
        while !self.all_exited() {
            let next = self.select_next(prev);
            prev = Some(next);

            let number = self.processes[next].number;
            debug!(process = number, "selected");
            self.ctx.journal.lines([
                format!("OS: preparing process {number}"),
                format!("OS: starting process {number}"),
            ]);

            Runner::new(&self.cfg, &self.ctx).run(&mut self.processes[next]);

            self.sweep_completed();
        }

        // All processes have exited; join outstanding I/O workers so
        // every end event is recorded, then sweep the stragglers.
        self.ctx.workers.join_all();
        self.sweep_completed();

        self.ctx.journal.line("Simulator program ending");
        info!("simulation complete");
    }

    fn all_exited(&self) -> bool {
        self.processes.iter().all(|p| p.is_exited())
    }

    /// Pick the next process index per the configured policy.
    fn select_next(&self, prev: Option<usize>) -> usize {
        match self.cfg.policy {
            SchedPolicy::RoundRobin => self.round_robin(prev),
            // Both policies select on live remaining cycles, so they
            // coincide; see `SchedPolicy`.
            SchedPolicy::Srtf | SchedPolicy::Sjf => self.shortest_remaining(),
        }
    }

    fn round_robin(&self, prev: Option<usize>) -> usize {
        let count = self.processes.len();
        let mut index = prev.map_or(0, |p| (p + 1) % count);
        while self.processes[index].is_exited() {
            index = (index + 1) % count;
        }
        index
    }

    fn shortest_remaining(&self) -> usize {
        self.processes
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_exited())
            .min_by_key(|(index, p)| (p.time_remaining, *index))
            .map(|(index, _)| index)
            .expect("scheduler selected with no runnable process")
    }

    /// Emit the completion event for every exited process whose I/O has
    /// fully drained. Completion strictly follows all of the process's
    /// I/O end events.
    fn sweep_completed(&mut self) {
        for process in &mut self.processes {
            if process.is_exited() && !process.completed && process.live_io() == 0 {
                self.ctx
                    .journal
                    .line(format!("OS: process {} completed", process.number));
                process.completed = true;
            }
        }
    }
}
