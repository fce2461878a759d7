//! Buffered track scalar writer.
//!
//! Scalars are encoded into a fixed-capacity write-back buffer and only
//! committed to disk when the buffer is full or the writer is closed.
//! This keeps the number of seek/write calls low, which matters on
//! network filesystems, and reduces fragmentation when several processes
//! write scalar files to the same volume.
//!
//! Each commit reopens the file, writes the buffered values at the
//! current body offset and then rewrites the header counts, so the
//! `count` field never runs ahead of the data on disk.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use super::format::*;
use super::header::{update_counts, write_header};
use crate::core::{Properties, WriterConfig};
use crate::util::{Error, Result, ScalarType, ScalarValue};

/// Fixed-capacity buffer of encoded values.
///
/// Storage is allocated once at construction and never resized.
#[derive(Debug)]
pub struct ScalarBuffer {
    data: Box<[u8]>,
    datatype: ScalarType,
    capacity: usize,
    fill: usize,
}

impl ScalarBuffer {
    /// Create a buffer holding up to `capacity` values (at least one).
    pub fn new(datatype: ScalarType, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: vec![0u8; capacity * datatype.num_bytes()].into_boxed_slice(),
            datatype,
            capacity,
            fill: 0,
        }
    }

    /// Capacity in values.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered values.
    #[inline]
    pub fn len(&self) -> usize {
        self.fill
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fill == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.fill == self.capacity
    }

    /// Whether `n` more values fit without a commit.
    #[inline]
    pub fn fits(&self, n: usize) -> bool {
        n <= self.capacity - self.fill
    }

    /// Encode one value. Returns `false` without writing if the buffer is full.
    pub fn push(&mut self, value: f64) -> bool {
        if self.is_full() {
            return false;
        }
        let width = self.datatype.num_bytes();
        let start = self.fill * width;
        self.datatype.encode_into(&mut self.data[start..start + width], value);
        self.fill += 1;
        true
    }

    /// Encoded bytes of the buffered values.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.fill * self.datatype.num_bytes()]
    }

    pub fn clear(&mut self) {
        self.fill = 0;
    }
}

/// Writer appending per-streamline scalars to a track scalar file.
///
/// The properties passed at creation must carry the timestamp of the
/// track file being annotated (see [`Properties::paired_with`]); the
/// writer never generates one.
///
/// Call [`close`](Self::close) to observe errors from the final commit.
/// Dropping an open writer commits too, logging any failure.
pub struct ScalarWriter<T: ScalarValue = f32> {
    path: PathBuf,
    buffer: ScalarBuffer,
    count_offset: u64,
    current_offset: u64,
    count: u64,
    total_count: u64,
    commits: u64,
    closed: bool,
    failed: bool,
    _value: PhantomData<T>,
}

impl<T: ScalarValue> ScalarWriter<T> {
    /// Create (or truncate) a track scalar file and write its header.
    pub fn create(path: impl AsRef<Path>, properties: &Properties, config: WriterConfig) -> Result<Self> {
        let path = path.as_ref();
        if properties.timestamp().is_none() {
            return Err(Error::MissingTimestamp);
        }
        properties.validate()?;
        config.validate()?;

        let mut header_props = properties.clone();
        header_props.set_count(0);
        header_props.set_total_count(0);

        let mut out = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let layout = write_header(&mut out, FileKind::TrackScalars, &header_props, config.datatype)?;
        out.flush()?;

        let buffer = ScalarBuffer::new(config.datatype, config.capacity_values());
        debug!(
            path = %path.display(),
            datatype = %config.datatype,
            capacity = buffer.capacity(),
            "created track scalar file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            buffer,
            count_offset: layout.count_offset,
            current_offset: layout.data_offset,
            count: 0,
            total_count: 0,
            commits: 0,
            closed: false,
            failed: false,
            _value: PhantomData,
        })
    }

    /// Append one streamline's scalars.
    ///
    /// Empty sequences write nothing but are still counted in
    /// [`total_count`](Self::total_count). Returning `Ok` does not mean the
    /// data is on disk: commit failures surface from whichever call
    /// triggers the commit.
    pub fn append(&mut self, scalars: &[T]) -> Result<bool> {
        self.ensure_writable()?;

        if !scalars.is_empty() {
            if !self.buffer.fits(scalars.len() + 1) {
                self.commit()?;
            }
            for &value in scalars {
                self.push(value.to_f64())?;
            }
            self.push(DELIMITER)?;
            self.count += 1;
        }
        self.total_count += 1;
        Ok(true)
    }

    fn push(&mut self, value: f64) -> Result<()> {
        if self.buffer.is_full() {
            // Only reached by a sequence longer than the whole buffer.
            self.commit()?;
        }
        self.buffer.push(value);
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if self.failed {
            return Err(Error::WriteFailed(format!(
                "{}: a previous commit failed",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Commit buffered values to disk now.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_writable()?;
        self.commit()
    }

    fn commit(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        match self.write_buffer() {
            Ok(()) => {
                self.commits += 1;
                debug!(
                    path = %self.path.display(),
                    values = self.buffer.len(),
                    count = self.count,
                    total_count = self.total_count,
                    offset = self.current_offset,
                    "committed scalar buffer"
                );
                self.buffer.clear();
                Ok(())
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn write_buffer(&mut self) -> Result<()> {
        let mut out: File = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| Error::write_failed("reopening for commit", e))?;

        out.seek(SeekFrom::Start(self.current_offset))
            .map_err(|e| Error::write_failed("seeking to body offset", e))?;
        out.write_all(self.buffer.as_bytes())
            .map_err(|e| Error::write_failed("writing scalar data", e))?;
        let offset = out
            .stream_position()
            .map_err(|e| Error::write_failed("querying body offset", e))?;

        update_counts(&mut out, self.count_offset, self.count, self.total_count).map_err(|e| match e {
            Error::Io(io) => Error::write_failed("updating header counts", io),
            other => other,
        })?;
        out.flush()
            .map_err(|e| Error::write_failed("flushing commit", e))?;

        self.current_offset = offset;
        Ok(())
    }

    /// Commit remaining data and close the writer.
    pub fn close(mut self) -> Result<()> {
        self.ensure_writable()?;
        let result = self.commit();
        self.closed = true;
        result
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn datatype(&self) -> ScalarType {
        self.buffer.datatype
    }

    /// Number of non-empty sequences appended.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of `append` calls, including empty sequences.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of commits performed so far.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Values currently held in the buffer.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer capacity in values.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}

impl<T: ScalarValue> Drop for ScalarWriter<T> {
    fn drop(&mut self) {
        if self.closed || self.failed {
            return;
        }
        if let Err(e) = self.commit() {
            error!(path = %self.path.display(), "final commit of track scalars failed: {e}");
        }
    }
}
