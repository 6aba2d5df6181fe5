//! Interval sample records and persistence sinks
//!
//! One [`IntervalSample`] is produced per completed, boundary-aligned
//! interval and handed to a [`PersistenceSink`]. After the hand-off the core
//! forgets the sample; durability is the sink's problem. Inserts are
//! fire-and-forget: a failed insert loses exactly that interval's record and
//! must never corrupt later ones.

pub mod flash_log;
pub mod mock;

pub use flash_log::FlashRecordLog;

use crate::platform::traits::DateTime;
use crate::platform::PlatformError;
use core::fmt;
use crc::{Crc, CRC_32_ISO_HDLC};

/// Encoded size of one record in the flash log
pub const RECORD_LEN: usize = 16;

const RECORD_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Storage-level errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying flash operation failed
    Io(PlatformError),
    /// Record failed its CRC check
    CorruptRecord,
    /// Log region configuration is unusable (too few blocks, misaligned base)
    InvalidGeometry,
    /// `insert` called before `ensure_schema`
    NotMounted,
}

impl From<PlatformError> for StorageError {
    fn from(e: PlatformError) -> Self {
        StorageError::Io(e)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {}", e),
            StorageError::CorruptRecord => write!(f, "corrupt record"),
            StorageError::InvalidGeometry => write!(f, "invalid log geometry"),
            StorageError::NotMounted => write!(f, "log not mounted"),
        }
    }
}

/// Accumulated pulse count for one aligned wall-clock interval.
///
/// Immutable once constructed. The timestamp fields identify the interval's
/// end boundary (the wake time that closed it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalSample {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    /// Pulses counted during the interval
    pub blinks: u32,
}

impl IntervalSample {
    /// Snapshot a drained count at the given wake time.
    pub fn new(at: &DateTime, blinks: u32) -> Self {
        Self {
            year: at.year,
            month: at.month,
            day: at.day,
            hour: at.hour,
            minute: at.minute,
            blinks,
        }
    }

    /// Encode to the fixed on-flash record layout.
    ///
    /// Little-endian fields, two reserved bytes, trailing CRC32 over the
    /// first twelve bytes.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..2].copy_from_slice(&self.year.to_le_bytes());
        buf[2] = self.month;
        buf[3] = self.day;
        buf[4] = self.hour;
        buf[5] = self.minute;
        // buf[6..8] reserved
        buf[8..12].copy_from_slice(&self.blinks.to_le_bytes());
        let crc = RECORD_CRC.checksum(&buf[0..12]);
        buf[12..16].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Decode a record, verifying its CRC.
    pub fn decode(buf: &[u8; RECORD_LEN]) -> Result<Self, StorageError> {
        let stored = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        if RECORD_CRC.checksum(&buf[0..12]) != stored {
            return Err(StorageError::CorruptRecord);
        }
        Ok(Self {
            year: u16::from_le_bytes([buf[0], buf[1]]),
            month: buf[2],
            day: buf[3],
            hour: buf[4],
            minute: buf[5],
            blinks: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }
}

/// Durable destination for interval samples.
pub trait PersistenceSink {
    /// Prepare the storage for records. Idempotent: existing valid storage
    /// is left untouched.
    fn ensure_schema(&mut self) -> Result<(), StorageError>;

    /// Append one sample. Not retried by the caller.
    fn insert(&mut self, sample: &IntervalSample) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IntervalSample {
        IntervalSample {
            year: 2026,
            month: 8,
            day: 5,
            hour: 14,
            minute: 35,
            blinks: 123,
        }
    }

    #[test]
    fn encode_decode_preserves_fields() {
        let s = sample();
        let decoded = IntervalSample::decode(&s.encode()).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn decode_rejects_corruption() {
        let mut buf = sample().encode();
        buf[8] ^= 0xFF;
        assert_eq!(IntervalSample::decode(&buf), Err(StorageError::CorruptRecord));
    }

    #[test]
    fn decode_rejects_erased_slot() {
        let buf = [0xFFu8; RECORD_LEN];
        assert!(IntervalSample::decode(&buf).is_err());
    }
}
