//! stream/io.rs
//! Normalized I/O plus the source-reader and target-writer collaborators.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::stream::block::Block;
use crate::stream::container::{
    encode_record_header, header_for, parse_record_header, ContainerError, RecordHeader,
};
use crate::stream::worker::{SourceReader, TargetWriter};
use crate::types::Fault;
use crate::utils::read_full;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// A writer produced by `open_output`, plus what the caller needs afterwards.
pub struct OpenedOutput {
    pub writer: Box<dyn Write + Send>,
    /// Captured bytes for `OutputSink::Memory`.
    pub buffer: Option<Arc<Mutex<Vec<u8>>>>,
    /// File created by this run, removed again if the run fails.
    pub created_file: Option<PathBuf>,
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> io::Result<Box<dyn Read + Send>> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(File::open(p)?),
        InputSource::Memory(b) => Box::new(io::Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize output sink into a boxed writer.
///
/// Files are created exclusively unless `overwrite` is set.
pub fn open_output(sink: OutputSink, overwrite: bool) -> io::Result<OpenedOutput> {
    match sink {
        OutputSink::Writer(writer) => Ok(OpenedOutput { writer, buffer: None, created_file: None }),
        OutputSink::File(path) => {
            let mut opts = OpenOptions::new();
            opts.write(true);
            if overwrite {
                opts.create(true).truncate(true);
            } else {
                opts.create_new(true);
            }
            let file = opts.open(&path)?;
            Ok(OpenedOutput {
                writer: Box::new(BufWriter::new(file)),
                buffer: None,
                created_file: Some(path),
            })
        }
        OutputSink::Memory => {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBufferWriter { buf: buf.clone() };
            Ok(OpenedOutput { writer: Box::new(writer), buffer: Some(buf), created_file: None })
        }
    }
}

/// Reject a file-to-file run whose target is the source itself.
pub fn check_distinct(input: &InputSource, output: &OutputSink) -> Result<(), Fault> {
    if let (InputSource::File(src), OutputSink::File(dst)) = (input, output) {
        // A target that does not exist yet cannot alias the source.
        if let (Ok(a), Ok(b)) = (fs::canonicalize(src), fs::canonicalize(dst)) {
            if a == b {
                return Err(Fault::Configuration(format!(
                    "source and target are the same file: {}",
                    a.display()
                )));
            }
        }
    }
    Ok(())
}

pub struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBufferWriter {
    pub fn new(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        Self { buf }
    }
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ================= Source readers =================

/// Splits a byte stream into consecutive `block_size` chunks, the last possibly shorter.
pub struct BlockFileReader<R: Read> {
    inner: R,
    block_size: usize,
    next_index: u64,
    done: bool,
}

impl<R: Read> BlockFileReader<R> {
    pub fn new(inner: R, block_size: usize) -> Self {
        Self { inner, block_size, next_index: 0, done: false }
    }
}

impl<R: Read + Send> SourceReader for BlockFileReader<R> {
    fn try_read_block(&mut self) -> Result<Option<Block>, Fault> {
        if self.done {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.block_size];
        let n = read_full(&mut self.inner, &mut buf)?;
        if n == 0 {
            self.done = true;
            return Ok(None);
        }

        let index = u32::try_from(self.next_index)
            .map_err(|_| Fault::IndexOverflow { max: u64::from(u32::MAX) + 1 })?;
        buf.truncate(n);
        self.next_index += 1;
        debug!("[READER] block {index} ({n} bytes)");
        Ok(Some(Block::new(index, buf)))
    }
}

/// Reads container records back as blocks, in file order.
pub struct ContainerReader<R: Read> {
    inner: R,
    offset: u64,
}

impl<R: Read> ContainerReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }
}

impl<R: Read + Send> SourceReader for ContainerReader<R> {
    fn try_read_block(&mut self) -> Result<Option<Block>, Fault> {
        let mut hdr = [0u8; RecordHeader::LEN];
        let n = read_full(&mut self.inner, &mut hdr)?;
        if n == 0 {
            return Ok(None);
        }
        if n < RecordHeader::LEN {
            return Err(ContainerError::TruncatedHeader { offset: self.offset, actual: n }.into());
        }

        let header = parse_record_header(&hdr)?;
        let expected = header.payload_len as usize;

        // Grow with the data actually present instead of trusting the declared length.
        let mut payload = Vec::with_capacity(expected.min(1 << 20));
        self.inner.by_ref().take(expected as u64).read_to_end(&mut payload)?;
        if payload.len() < expected {
            return Err(ContainerError::TruncatedPayload {
                index: header.index,
                expected,
                actual: payload.len(),
            }
            .into());
        }

        self.offset += header.record_len() as u64;
        debug!("[READER] record {} ({} bytes)", header.index, expected);
        Ok(Some(Block::new(header.index, payload)))
    }
}

// ================= Target writers =================

/// Writes one container record per block, in arrival order.
pub struct ContainerWriter<W: Write> {
    out: W,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TargetWriter for ContainerWriter<W> {
    fn write_block(&mut self, block: Block) -> Result<(), Fault> {
        let header = header_for(block.index, &block.payload)?;
        self.out.write_all(&encode_record_header(&header))?;
        self.out.write_all(&block.payload)?;
        debug!("[WRITER] record {} ({} bytes)", block.index, block.len());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Fault> {
        self.out.flush()?;
        Ok(())
    }
}

/// Restores block order: buffers out-of-order blocks and flushes each one as
/// soon as every lower index has been written.
pub struct OrderedBlockWriter<W: Write> {
    out: W,
    next: u64,
    pending: BTreeMap<u32, Block>,
}

impl<W: Write> OrderedBlockWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, next: 0, pending: BTreeMap::new() }
    }

    pub fn next_expected(&self) -> u64 {
        self.next
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn push(&mut self, block: Block) -> Result<(), Fault> {
        if u64::from(block.index) < self.next || self.pending.contains_key(&block.index) {
            return Err(Fault::DuplicateBlock { index: block.index, next_expected: self.next });
        }
        self.pending.insert(block.index, block);
        self.flush_ready()
    }

    fn flush_ready(&mut self) -> Result<(), Fault> {
        while let Some(block) = u32::try_from(self.next).ok().and_then(|i| self.pending.remove(&i)) {
            self.out.write_all(&block.payload)?;
            debug!("[WRITER] flushed block {}", block.index);
            self.next += 1;
        }
        Ok(())
    }

    /// Fails if any block is still waiting for a lower index.
    pub fn finish(&mut self) -> Result<(), Fault> {
        self.flush_ready()?;
        if let Some((&lowest, _)) = self.pending.iter().next() {
            return Err(Fault::ReassemblyGap {
                next_expected: self.next,
                pending: self.pending.len(),
                lowest,
            });
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> TargetWriter for OrderedBlockWriter<W> {
    fn write_block(&mut self, block: Block) -> Result<(), Fault> {
        self.push(block)
    }

    fn finish(&mut self) -> Result<(), Fault> {
        OrderedBlockWriter::finish(self)
    }
}
