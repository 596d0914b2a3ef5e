//! I/O worker tasks.
//!
//! Each dispatched I/O opcode runs on its own worker thread, concurrent
//! with the scheduler and with other workers up to the device class
//! multiplicity. The `WorkerSet` owns every spawned handle so shutdown
//! can deterministically join drained workers instead of polling a
//! counter. Workers are never cancelled; quantum expiry preempts the
//! runner, not them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam::channel::Sender;
use tracing::debug;

use crate::clock::Stopwatch;
use crate::engine::SimContext;
use crate::types::{Cycles, DeviceClass, IoDirection};

/// Live worker threads, joined at shutdown.
pub struct WorkerSet {
    handles: Mutex<Vec<JoinHandle<()>>>,
    live: AtomicUsize,
}

impl WorkerSet {
    pub fn new() -> Self {
        WorkerSet {
            handles: Mutex::new(Vec::new()),
            live: AtomicUsize::new(0),
        }
    }

    /// Number of workers that have been spawned and not yet retired.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Spawn a named worker thread. Spawn failure is fatal: the runner
    /// cannot make progress if it cannot hand off I/O.
    pub fn spawn<F>(&self, name: String, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.live.fetch_add(1, Ordering::SeqCst);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(work)
            .unwrap_or_else(|e| panic!("failed to spawn I/O worker thread: {e}"));
        self.handles.lock().unwrap().push(handle);
    }

    pub(crate) fn retire(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    /// Join every worker spawned so far. Only the scheduler thread spawns
    /// workers, so once it calls this the set cannot grow.
    pub fn join_all(&self) {
        let drained: Vec<_> = std::mem::take(&mut *self.handles.lock().unwrap());
        for handle in drained {
            let _ = handle.join();
        }
    }
}

impl Default for WorkerSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a worker needs to service one dispatched I/O opcode.
pub struct IoRequest {
    pub process_number: u32,
    pub class: DeviceClass,
    pub direction: IoDirection,
    pub cycles: Cycles,
    /// Per-cycle device time, milliseconds.
    pub device_ms: u32,
    /// The dispatching process's in-flight counter; decremented on exit.
    pub process_io: Arc<AtomicUsize>,
    /// Readiness handoff back to the runner, signaled once the start
    /// event has been recorded.
    pub ready: Sender<()>,
}

/// Service one I/O operation: acquire a device slot, record the start
/// event, signal readiness, busy-wait out the transfer, record the end
/// event, then release everything.
pub fn run_io(ctx: &SimContext, req: IoRequest) {
    let pool = ctx.devices.pool(req.class);
    let slot = pool.acquire();

    // Reference point captured before the start event is recorded.
    let timer = Stopwatch::start();
    ctx.journal.line(event_message(&req, "start", slot.index()));
    let _ = req.ready.send(());

    timer.busy_wait_micros(req.device_ms as u64 * req.cycles as u64 * 1000);

    ctx.journal.line(event_message(&req, "end", slot.index()));
    drop(slot);

    req.process_io.fetch_sub(1, Ordering::SeqCst);
    ctx.workers.retire();
    debug!(
        process = req.process_number,
        class = %req.class,
        "I/O worker finished"
    );
}

/// Start/end event text for one operation. The slot index is printed only
/// for classes that label their units.
fn event_message(req: &IoRequest, phase: &str, slot: usize) -> String {
    let base = format!(
        "Process {} {} {} {}",
        req.process_number,
        phase,
        req.class,
        req.direction.as_str()
    );
    match req.class.slot_label() {
        Some(label) => format!("{base} on {label} {slot}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::bounded;

    use super::*;

    fn request(class: DeviceClass, direction: IoDirection) -> IoRequest {
        let (ready, _recv) = bounded(1);
        IoRequest {
            process_number: 3,
            class,
            direction,
            cycles: 2,
            device_ms: 1,
            process_io: Arc::new(AtomicUsize::new(1)),
            ready,
        }
    }

    #[test]
    fn test_event_text_per_class() {
        let hd = request(DeviceClass::HardDrive, IoDirection::Input);
        assert_eq!(
            event_message(&hd, "start", 1),
            "Process 3 start hard drive input on HDD 1"
        );

        let printer = request(DeviceClass::Printer, IoDirection::Output);
        assert_eq!(
            event_message(&printer, "end", 0),
            "Process 3 end printer output on PRNTR 0"
        );

        let keyboard = request(DeviceClass::Keyboard, IoDirection::Input);
        assert_eq!(
            event_message(&keyboard, "start", 0),
            "Process 3 start keyboard input"
        );

        let monitor = request(DeviceClass::Monitor, IoDirection::Output);
        assert_eq!(
            event_message(&monitor, "end", 0),
            "Process 3 end monitor output"
        );
    }
}
