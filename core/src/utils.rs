use std::io::{self, Read};

use crate::compression::CompressionError;

pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn verify_checksum(expected: u32, actual: u32, codec: &str) -> Result<(), CompressionError> {
    if expected != actual {
        return Err(CompressionError::ChecksumMismatch {
            codec: codec.into(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Read until `buf` is full or EOF; returns the number of bytes read.
///
/// Unlike `read_exact`, a short read is reported rather than turned into an error,
/// so callers can tell a clean EOF (0) from a truncated record.
pub fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(off)
}

/// Parse a byte size with an optional binary suffix: `4096`, `64K`, `1M`, `2G`.
pub fn parse_size(raw: &str) -> Result<usize, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("empty size".into());
    }
    let (digits, mult) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => {
            let mult = match c.to_ascii_uppercase() {
                'K' => 1024,
                'M' => 1024 * 1024,
                'G' => 1024 * 1024 * 1024,
                other => return Err(format!("unknown size suffix '{other}' in {raw:?}")),
            };
            (&s[..i], mult)
        }
        _ => (s, 1),
    };
    let value: usize = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid size {raw:?}"))?;
    value
        .checked_mul(mult)
        .ok_or_else(|| format!("size {raw:?} overflows"))
}
