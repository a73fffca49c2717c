use byteorder::{ByteOrder, LittleEndian};

use super::types::{ContainerError, RecordHeader};
use crate::constants::MAX_RECORD_LEN;

#[inline]
pub fn encode_record_header(header: &RecordHeader) -> [u8; RecordHeader::LEN] {
    let mut buf = [0u8; RecordHeader::LEN];
    LittleEndian::write_u32(&mut buf[0..4], header.index);
    LittleEndian::write_u32(&mut buf[4..8], header.payload_len);
    buf
}

/// Encode a complete record (header + payload) into a fresh buffer.
pub fn encode_record(index: u32, payload: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let header = header_for(index, payload)?;
    let mut out = Vec::with_capacity(header.record_len());
    out.extend_from_slice(&encode_record_header(&header));
    out.extend_from_slice(payload);
    Ok(out)
}

/// Build the header for `payload`, enforcing the record size limit.
pub fn header_for(index: u32, payload: &[u8]) -> Result<RecordHeader, ContainerError> {
    match u32::try_from(payload.len()) {
        Ok(len) if len <= MAX_RECORD_LEN => Ok(RecordHeader::new(index, len)),
        _ => Err(ContainerError::RecordTooLarge {
            index,
            len: u32::try_from(payload.len()).unwrap_or(u32::MAX),
            max: MAX_RECORD_LEN,
        }),
    }
}
