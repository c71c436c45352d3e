//! Seekable byte stream over the sample data of an in-memory WAV file.
//!
//! The reader hides the fixed 44-byte canonical header from every positional
//! operation: a fresh reader starts at the first sample byte, and
//! `SeekFrom::Start(0)` lands there too. Positions returned by `seek` are
//! still absolute offsets into the whole file.
//!
//! No header fields are inspected. Callers must hand over 16-bit stereo PCM
//! with a canonical header (no `LIST` or padding chunks before `data`);
//! anything else streams misaligned samples without any error.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// Size of a canonical WAV header (RIFF descriptor + `fmt ` + `data` header).
pub const DATA_START_OFFSET: u64 = 44;

#[derive(Debug, Clone)]
pub struct WavStreamReader {
    buffer: Arc<[u8]>,
    cursor: u64,
}

impl WavStreamReader {
    pub fn new(buffer: impl Into<Arc<[u8]>>) -> Self {
        Self {
            buffer: buffer.into(),
            cursor: DATA_START_OFFSET,
        }
    }

    /// Reads a whole WAV file into memory and positions at its sample data.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        log::info!("{}: loaded {} bytes", path.display(), bytes.len());
        Ok(Self::new(bytes))
    }

    /// Absolute byte offset of the next read.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Number of sample-data bytes after the header.
    pub fn data_len(&self) -> u64 {
        (self.buffer.len() as u64).saturating_sub(DATA_START_OFFSET)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_empty()
    }

    fn remaining(&self) -> &[u8] {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|cursor| self.buffer.get(cursor..))
            .unwrap_or(&[])
    }
}

impl Read for WavStreamReader {
    /// Returns `Ok(0)` once the cursor is at or past the end of the buffer.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        let count = buf.len().min(remaining.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.cursor += count as u64;
        Ok(count)
    }
}

impl Seek for WavStreamReader {
    /// `Start` is relative to the sample data, `End` to the end of the file.
    /// Any target before the sample data fails with `InvalidInput` and
    /// leaves the cursor where it was. Targets past the end are allowed.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => DATA_START_OFFSET.checked_add(offset),
            SeekFrom::Current(offset) => self.cursor.checked_add_signed(offset),
            SeekFrom::End(offset) => (self.buffer.len() as u64).checked_add_signed(offset),
        };

        match target {
            Some(target) if target >= DATA_START_OFFSET => {
                self.cursor = target;
                Ok(target)
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("attempt to seek before the start of sample data ({pos:?})"),
            )),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.cursor)
    }
}
