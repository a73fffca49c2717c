use bytes::Bytes;

/// One unit of work: the `index`-th chunk of the original byte stream.
///
/// Transforms never mutate a block; they produce a new one carrying the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub index: u32,
    pub payload: Bytes,
}

impl Block {
    pub fn new(index: u32, payload: impl Into<Bytes>) -> Self {
        Self { index, payload: payload.into() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// New block with the same index and a replaced payload.
    pub fn with_payload(&self, payload: impl Into<Bytes>) -> Self {
        Self { index: self.index, payload: payload.into() }
    }
}
