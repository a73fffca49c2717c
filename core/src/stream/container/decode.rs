use byteorder::{ByteOrder, LittleEndian};

use super::types::{ContainerError, RecordHeader, RecordView};
use crate::constants::MAX_RECORD_LEN;

/// Parse the fixed record header at the start of `wire`.
#[inline]
pub fn parse_record_header(wire: &[u8]) -> Result<RecordHeader, ContainerError> {
    if wire.len() < RecordHeader::LEN {
        return Err(ContainerError::TruncatedHeader { offset: 0, actual: wire.len() });
    }

    let index = LittleEndian::read_u32(&wire[0..4]);
    let payload_len = LittleEndian::read_u32(&wire[4..8]);

    if payload_len > MAX_RECORD_LEN {
        return Err(ContainerError::RecordTooLarge { index, len: payload_len, max: MAX_RECORD_LEN });
    }

    Ok(RecordHeader { index, payload_len })
}

/// Decode exactly one record from `wire`.
///
/// Caller guarantees the slice holds the whole record and nothing else.
pub fn decode_record(wire: &[u8]) -> Result<RecordView<'_>, ContainerError> {
    let header = parse_record_header(wire)?;

    let expected = header.record_len();
    if wire.len() < expected {
        return Err(ContainerError::TruncatedPayload {
            index: header.index,
            expected: header.payload_len as usize,
            actual: wire.len() - RecordHeader::LEN,
        });
    }
    if wire.len() != expected {
        return Err(ContainerError::LengthMismatch { expected, actual: wire.len() });
    }

    Ok(RecordView {
        header,
        payload: &wire[RecordHeader::LEN..],
    })
}
