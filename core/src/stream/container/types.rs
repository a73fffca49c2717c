use thiserror::Error;

pub const RECORD_HEADER_LEN: usize = 4 + 4;

/// Fixed-size prefix of every container record. Little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub index: u32,
    pub payload_len: u32,
}

impl RecordHeader {
    pub const LEN: usize = RECORD_HEADER_LEN;

    pub fn new(index: u32, payload_len: u32) -> Self {
        Self { index, payload_len }
    }

    /// Full encoded length of the record this header introduces.
    pub fn record_len(&self) -> usize {
        Self::LEN + self.payload_len as usize
    }
}

/// Borrowed view of one decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordView<'a> {
    pub header: RecordHeader,
    pub payload: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("truncated record header at offset {offset}: {actual} of {} bytes", RECORD_HEADER_LEN)]
    TruncatedHeader { offset: u64, actual: usize },

    #[error("truncated payload for block {index}: declared {expected} bytes, got {actual}")]
    TruncatedPayload { index: u32, expected: usize, actual: usize },

    #[error("record for block {index} declares {len} bytes, limit is {max}")]
    RecordTooLarge { index: u32, len: u32, max: u32 },

    #[error("record length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
