//! Sequential track scalar reader.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::marker::PhantomData;
use std::path::Path;

use tracing::debug;

use super::format::*;
use super::header::{open_existing, read_header, Header};
use crate::core::Properties;
use crate::util::{Error, Result, ScalarType, ScalarValue};

/// Forward-only reader yielding one streamline's scalars per call.
///
/// The input handle is closed as soon as an end-of-stream sentinel or
/// end of file is reached; further calls return `false`. A body that
/// ends without a sentinel is treated as cleanly terminated.
pub struct ScalarReader<T: ScalarValue = f32> {
    input: Option<BufReader<File>>,
    header: Header,
    _value: PhantomData<T>,
}

impl<T: ScalarValue> ScalarReader<T> {
    /// Open a track scalar file and decode its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut input = BufReader::new(open_existing(path)?);
        let header = read_header(&mut input)?;
        if header.kind != FileKind::TrackScalars {
            return Err(Error::header(format!(
                "{} is a {} file, expected {}",
                path.display(),
                header.kind,
                FileKind::TrackScalars,
            )));
        }
        debug!(path = %path.display(), datatype = %header.datatype, "opened track scalars");
        Ok(Self {
            input: Some(input),
            header,
            _value: PhantomData,
        })
    }

    /// Properties decoded from the header.
    pub fn properties(&self) -> &Properties {
        &self.header.properties
    }

    /// On-disk value encoding.
    pub fn datatype(&self) -> ScalarType {
        self.header.datatype
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Whether the input handle is still open.
    pub fn is_open(&self) -> bool {
        self.input.is_some()
    }

    /// Read the next streamline's scalars into `out`.
    ///
    /// Returns `true` with `out` holding the sequence (possibly empty), or
    /// `false` once the body is exhausted, leaving `out` empty.
    pub fn next_into(&mut self, out: &mut Vec<T>) -> Result<bool> {
        out.clear();
        let datatype = self.header.datatype;
        let Some(input) = self.input.as_mut() else {
            return Ok(false);
        };

        loop {
            let value = match datatype.read_value(input) {
                Ok(v) => v,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    if !out.is_empty() {
                        debug!(pending = out.len(), "body truncated inside a streamline");
                    }
                    break;
                }
                Err(e) => {
                    self.input = None;
                    return Err(Error::Io(e));
                }
            };
            if is_end_of_stream(value) {
                break;
            }
            if is_delimiter(value) {
                return Ok(true);
            }
            out.push(T::from_f64(value));
        }

        self.input = None;
        out.clear();
        Ok(false)
    }
}

impl<T: ScalarValue> Iterator for ScalarReader<T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut out = Vec::new();
        match self.next_into(&mut out) {
            Ok(true) => Some(Ok(out)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
