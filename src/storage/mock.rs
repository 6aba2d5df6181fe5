//! Mock persistence sink for testing

#![cfg(any(test, feature = "mock"))]

use crate::storage::{IntervalSample, PersistenceSink, StorageError};
use crate::platform::{error::FlashError, PlatformError};

/// In-memory sink that records inserted samples and supports scripted
/// failures for exercising the recorder's error paths.
#[derive(Debug, Default)]
pub struct MockSink {
    samples: heapless::Vec<IntervalSample, 64>,
    schema_calls: u32,
    fail_schema: bool,
    failing_inserts: u32,
}

impl MockSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples inserted so far
    pub fn samples(&self) -> &[IntervalSample] {
        &self.samples
    }

    /// Number of `ensure_schema` calls observed
    pub fn schema_calls(&self) -> u32 {
        self.schema_calls
    }

    /// Make `ensure_schema` fail
    pub fn fail_schema(&mut self, fail: bool) {
        self.fail_schema = fail;
    }

    /// Make the next `n` inserts fail
    pub fn fail_next_inserts(&mut self, n: u32) {
        self.failing_inserts = n;
    }
}

impl PersistenceSink for MockSink {
    fn ensure_schema(&mut self) -> Result<(), StorageError> {
        self.schema_calls += 1;
        if self.fail_schema {
            return Err(StorageError::Io(PlatformError::InitializationFailed));
        }
        Ok(())
    }

    fn insert(&mut self, sample: &IntervalSample) -> Result<(), StorageError> {
        if self.failing_inserts > 0 {
            self.failing_inserts -= 1;
            return Err(StorageError::Io(PlatformError::Flash(
                FlashError::WriteFailed,
            )));
        }
        self.samples
            .push(*sample)
            .map_err(|_| StorageError::Io(PlatformError::ResourceUnavailable))
    }
}
