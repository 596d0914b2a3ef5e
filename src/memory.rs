//! Address-stepping memory allocator.
//!
//! The allocator is a trivial oracle: addresses advance by one block per
//! allocation and wrap to zero when two more blocks would not fit in
//! system memory. The engine treats the address arithmetic as opaque.

/// Compute the next block address.
///
/// `None` for `last` means memory is uninitialized and the first block
/// lands at 0. Units are kilobytes throughout.
pub fn next_block(total_kb: u64, block_kb: u32, last: Option<u32>) -> u32 {
    match last {
        None => 0,
        Some(last) if last as u64 + 2 * (block_kb as u64) < total_kb => last + block_kb,
        Some(_) => 0,
    }
}

/// Tracks the last allocated address across the whole simulation.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    last: Option<u32>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next block and remember it.
    pub fn allocate(&mut self, total_kb: u64, block_kb: u32) -> u32 {
        let address = next_block(total_kb, block_kb, self.last);
        self.last = Some(address);
        address
    }
}
