//! Flash interface trait
//!
//! This module defines the Flash access interface used by the record log.
//! Addresses are byte offsets into the device's flash address space; erase
//! granularity is [`BLOCK_SIZE`] and erased bytes read back as `0xFF`.

use crate::platform::Result;

/// Flash erase block size (4 KiB)
pub const BLOCK_SIZE: u32 = 4096;

/// Flash access interface
///
/// Platform implementations must provide blocking read/erase/write over a
/// byte-addressed flash region.
///
/// # Safety Invariants
///
/// - `erase` must be called with a block-aligned address and length
/// - `write` may only program bytes inside previously erased blocks
/// - The implementation must reject addresses outside its writable region
pub trait FlashInterface {
    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Erase `len` bytes starting at `address`
    ///
    /// Both `address` and `len` must be multiples of [`BLOCK_SIZE`].
    fn erase(&mut self, address: u32, len: u32) -> Result<()>;

    /// Write `data` starting at `address`
    ///
    /// The target range must have been erased since the last write.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;
}

impl<F: FlashInterface + ?Sized> FlashInterface for &mut F {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read(address, buf)
    }

    fn erase(&mut self, address: u32, len: u32) -> Result<()> {
        (**self).erase(address, len)
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        (**self).write(address, data)
    }
}
