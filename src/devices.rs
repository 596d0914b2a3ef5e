//! Device arbiter: bounded-parallelism admission per device class.
//!
//! Each class owns a pool of slots equal to its multiplicity. Acquiring a
//! slot blocks until one is free, then marks the first free slot and
//! returns an RAII guard; dropping the guard clears the slot and wakes one
//! waiter. The scan-and-mark happens under the class lock: concurrent
//! acquirers can never pick the same slot, and at most `multiplicity`
//! operations are admitted per class at any instant.

use std::sync::{Condvar, Mutex};

use tracing::debug;

use crate::config::Config;
use crate::types::DeviceClass;

/// Slot pool for one device class.
pub struct DevicePool {
    class: DeviceClass,
    slots: Mutex<Vec<bool>>,
    freed: Condvar,
}

impl DevicePool {
    fn new(class: DeviceClass, multiplicity: usize) -> Self {
        DevicePool {
            class,
            slots: Mutex::new(vec![false; multiplicity]),
            freed: Condvar::new(),
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Number of operations this class admits concurrently.
    pub fn multiplicity(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    /// Block until a slot is free, mark it busy, and return its guard.
    pub fn acquire(&self) -> SlotGuard<'_> {
        let mut slots = self.slots.lock().unwrap();
        loop {
            if let Some(index) = slots.iter().position(|busy| !busy) {
                slots[index] = true;
                debug!(class = %self.class, slot = index, "slot acquired");
                return SlotGuard { pool: self, index };
            }
            slots = self.freed.wait(slots).unwrap();
        }
    }
}

/// Exclusive hold on one device slot. Cleared on drop.
pub struct SlotGuard<'a> {
    pool: &'a DevicePool,
    index: usize,
}

impl SlotGuard<'_> {
    /// Stable slot index for event-log labels (`HDD 0`, `PRNTR 1`).
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.pool.slots.lock().unwrap();
        slots[self.index] = false;
        debug!(class = %self.pool.class, slot = self.index, "slot released");
        self.pool.freed.notify_one();
    }
}

/// The four per-class pools.
pub struct DeviceArbiter {
    hard_drive: DevicePool,
    keyboard: DevicePool,
    monitor: DevicePool,
    printer: DevicePool,
}

impl DeviceArbiter {
    pub fn new(cfg: &Config) -> Self {
        DeviceArbiter {
            hard_drive: DevicePool::new(DeviceClass::HardDrive, cfg.hd_count),
            keyboard: DevicePool::new(DeviceClass::Keyboard, 1),
            monitor: DevicePool::new(DeviceClass::Monitor, 1),
            printer: DevicePool::new(DeviceClass::Printer, cfg.printer_count),
        }
    }

    pub fn pool(&self, class: DeviceClass) -> &DevicePool {
        match class {
            DeviceClass::HardDrive => &self.hard_drive,
            DeviceClass::Keyboard => &self.keyboard,
            DeviceClass::Monitor => &self.monitor,
            DeviceClass::Printer => &self.printer,
        }
    }
}
