//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit tests.

use crate::platform::{
    error::{FlashError, PlatformError},
    traits::flash::BLOCK_SIZE,
    traits::FlashInterface,
    Result,
};

/// Mock flash capacity (64 KiB is plenty for record-log tests)
const FLASH_CAPACITY: u32 = 64 * 1024;

const BLOCK_COUNT: usize = (FLASH_CAPACITY / BLOCK_SIZE) as usize;

/// Mock Flash implementation
///
/// Simulates a byte-addressed flash region in memory. Supports:
/// - Read/write/erase with the same alignment rules as hardware
/// - Corruption injection for testing error recovery
/// - Erase count tracking per block
/// - Write failure injection
#[derive(Debug)]
pub struct MockFlash {
    /// Storage, initialized to 0xFF (erased state)
    storage: [u8; FLASH_CAPACITY as usize],
    /// Erase count per block
    erase_counts: [u32; BLOCK_COUNT],
    /// Injected write failures remaining
    failing_writes: u32,
}

impl MockFlash {
    /// Create a new, fully erased mock flash
    pub fn new() -> Self {
        Self {
            storage: [0xFF; FLASH_CAPACITY as usize],
            erase_counts: [0; BLOCK_COUNT],
            failing_writes: 0,
        }
    }

    /// Get flash contents (for test verification)
    pub fn contents(&self, address: u32, len: usize) -> &[u8] {
        &self.storage[address as usize..address as usize + len]
    }

    /// Overwrite bytes with a corrupt pattern (for testing error recovery)
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        for b in &mut self.storage[address as usize..address as usize + len] {
            *b = 0xAA;
        }
    }

    /// Make the next `n` writes fail with `FlashError::WriteFailed`
    pub fn fail_next_writes(&mut self, n: u32) {
        self.failing_writes = n;
    }

    /// Get erase count for the block containing `address`
    pub fn erase_count(&self, address: u32) -> u32 {
        self.erase_counts[(address / BLOCK_SIZE) as usize]
    }

    fn check_range(&self, address: u32, len: u32) -> Result<()> {
        if address.checked_add(len).is_none() || address + len > FLASH_CAPACITY {
            return Err(PlatformError::Flash(FlashError::OutOfBounds));
        }
        Ok(())
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.check_range(address, buf.len() as u32)?;
        buf.copy_from_slice(&self.storage[address as usize..address as usize + buf.len()]);
        Ok(())
    }

    fn erase(&mut self, address: u32, len: u32) -> Result<()> {
        if address % BLOCK_SIZE != 0 || len % BLOCK_SIZE != 0 {
            return Err(PlatformError::Flash(FlashError::Unaligned));
        }
        self.check_range(address, len)?;
        for b in &mut self.storage[address as usize..(address + len) as usize] {
            *b = 0xFF;
        }
        let first = (address / BLOCK_SIZE) as usize;
        let count = (len / BLOCK_SIZE) as usize;
        for c in &mut self.erase_counts[first..first + count] {
            *c += 1;
        }
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(PlatformError::Flash(FlashError::WriteFailed));
        }
        self.check_range(address, data.len() as u32)?;
        // NOR semantics: programming can only clear bits
        for (slot, byte) in self.storage[address as usize..address as usize + data.len()]
            .iter_mut()
            .zip(data)
        {
            *slot &= *byte;
        }
        Ok(())
    }
}
