//! RP2350 Flash implementation
//!
//! Wraps the embassy-rp blocking flash driver behind [`FlashInterface`].
//! Addresses given to this wrapper are offsets from the start of flash, the
//! same address space the record log's configuration uses.

use crate::platform::{
    error::{FlashError, PlatformError},
    traits::FlashInterface,
    Result,
};
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;

/// Total flash size on the Pico 2 W (4 MiB)
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// RP2350 flash wrapper
pub struct Rp2350Flash {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl Rp2350Flash {
    /// Wrap the flash peripheral
    pub fn new(flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }
}

impl FlashInterface for Rp2350Flash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.flash
            .blocking_read(address, buf)
            .map_err(|_| PlatformError::Flash(FlashError::ReadFailed))
    }

    fn erase(&mut self, address: u32, len: u32) -> Result<()> {
        self.flash
            .blocking_erase(address, address + len)
            .map_err(|_| PlatformError::Flash(FlashError::EraseFailed))
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.flash
            .blocking_write(address, data)
            .map_err(|_| PlatformError::Flash(FlashError::WriteFailed))
    }
}
