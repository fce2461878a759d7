//! Header codec shared by track and track scalar files.
//!
//! The header is plain text terminated by `END`; the body starts at the
//! offset recorded in its `file: . <offset>` line. The `count` and
//! `total_count` fields are zero-padded to a fixed width so they can be
//! rewritten in place while the body grows.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use super::format::*;
use crate::core::Properties;
use crate::util::{Error, Result, ScalarType};

const COUNT_PREFIX: &str = "count: ";
const TOTAL_COUNT_PREFIX: &str = "total_count: ";

/// Positions recorded while writing a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderLayout {
    /// First byte of the body.
    pub data_offset: u64,
    /// First digit of the `count` field.
    pub count_offset: u64,
}

/// Decoded header of a track or track scalar file.
#[derive(Clone, Debug)]
pub struct Header {
    pub kind: FileKind,
    pub datatype: ScalarType,
    pub properties: Properties,
    pub layout: HeaderLayout,
}

impl Header {
    /// Read the header of the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut input = BufReader::new(open_existing(path.as_ref())?);
        read_header(&mut input)
    }
}

impl Properties {
    /// Load the properties of an existing track or track scalar file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Header::load(path).map(|h| h.properties)
    }
}

/// Open a file for reading, mapping a missing file to [`Error::FileNotFound`].
pub(crate) fn open_existing(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })
}

fn format_count(value: u64) -> Result<String> {
    if value > MAX_COUNT {
        return Err(Error::header(format!("count {value} exceeds header field width")));
    }
    Ok(format!("{value:0width$}", width = COUNT_WIDTH))
}

/// Write a header at the current position of `out`.
///
/// Counts are taken from `properties`, which must pass
/// [`Properties::validate`]. The stream is left positioned at the start
/// of the body.
pub fn write_header<W: Write + Seek>(
    out: &mut W,
    kind: FileKind,
    properties: &Properties,
    datatype: ScalarType,
) -> Result<HeaderLayout> {
    let timestamp = properties.timestamp().ok_or(Error::MissingTimestamp)?;
    properties.validate()?;
    let start = out.stream_position()?;

    let mut text = String::new();
    text.push_str(kind.magic());
    text.push('\n');
    for (key, value) in properties.iter() {
        text.push_str(&format!("{key}: {value}\n"));
    }
    for comment in properties.comments() {
        text.push_str(&format!("comment: {comment}\n"));
    }
    text.push_str(&format!("timestamp: {timestamp}\n"));
    text.push_str(&format!("datatype: {}\n", datatype.name()));

    let tail = format!(
        "{COUNT_PREFIX}{}\n{TOTAL_COUNT_PREFIX}{}\n{END_LINE}\n",
        format_count(properties.count())?,
        format_count(properties.total_count())?,
    );

    // The offset is written into its own line, so its digit count feeds back into it.
    let fixed = start + (text.len() + "file: . \n".len() + tail.len()) as u64;
    let mut digits = 1;
    let data_offset = loop {
        let candidate = fixed + digits as u64;
        if candidate.to_string().len() == digits {
            break candidate;
        }
        digits += 1;
    };
    text.push_str(&format!("file: . {data_offset}\n"));
    let count_offset = start + (text.len() + COUNT_PREFIX.len()) as u64;
    text.push_str(&tail);

    debug_assert_eq!(start + text.len() as u64, data_offset);
    out.write_all(text.as_bytes())?;

    debug!(kind = %kind, data_offset, count_offset, "wrote header");
    Ok(HeaderLayout { data_offset, count_offset })
}

/// Rewrite the `count` and `total_count` fields in place.
///
/// The stream position is left after the rewritten fields.
pub fn update_counts<W: Write + Seek>(
    out: &mut W,
    count_offset: u64,
    count: u64,
    total_count: u64,
) -> Result<()> {
    let fields = format!(
        "{}\n{TOTAL_COUNT_PREFIX}{}\n",
        format_count(count)?,
        format_count(total_count)?,
    );
    out.seek(SeekFrom::Start(count_offset))?;
    out.write_all(fields.as_bytes())?;
    Ok(())
}

/// Read one header line (without its terminator), bounded by the header limit.
fn read_line<R: BufRead>(input: &mut R, consumed: u64, buf: &mut Vec<u8>) -> Result<Option<usize>> {
    buf.clear();
    let remaining = MAX_HEADER_BYTES.saturating_sub(consumed);
    let n = input.by_ref().take(remaining).read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') {
        if consumed + n as u64 >= MAX_HEADER_BYTES {
            return Err(Error::header("header exceeds maximum size"));
        }
        return Err(Error::header("unexpected end of file in header"));
    }
    Ok(Some(n))
}

fn parse_count(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::header(format!("invalid {key} field: {value:?}")))
}

/// Decode a header and position `input` at the start of the body.
pub fn read_header<R: BufRead + Seek>(input: &mut R) -> Result<Header> {
    let start = input.stream_position()?;
    let mut buf = Vec::new();
    let mut consumed = 0u64;

    let kind = match read_line(input, consumed, &mut buf) {
        Ok(Some(n)) => {
            consumed += n as u64;
            std::str::from_utf8(&buf)
                .ok()
                .and_then(FileKind::from_magic)
                .ok_or(Error::InvalidMagic)?
        }
        _ => return Err(Error::InvalidMagic),
    };

    let mut properties = Properties::default();
    let mut datatype = None;
    let mut data_offset = None;
    let mut count_offset = None;
    let mut count = None;
    let mut total_count = None;
    let mut timestamp = None;
    let mut terminated = false;

    while let Some(n) = read_line(input, consumed, &mut buf)? {
        let line_start = start + consumed;
        consumed += n as u64;

        let line = std::str::from_utf8(&buf)
            .map_err(|_| Error::header("header line is not valid UTF-8"))?
            .trim_end_matches(['\n', '\r']);

        if line.trim() == END_LINE {
            terminated = true;
            break;
        }
        let Some((key, raw_value)) = line.split_once(':') else {
            return Err(Error::header(format!("malformed header line: {line:?}")));
        };
        let key = key.trim();
        let value = raw_value.trim();

        match key {
            "timestamp" => timestamp = Some(value.to_string()),
            "datatype" => {
                datatype = Some(ScalarType::from_name(value).ok_or_else(|| {
                    Error::header(format!("unsupported datatype: {value}"))
                })?)
            }
            "file" => {
                let mut parts = value.split_whitespace();
                if parts.next() != Some(".") {
                    return Err(Error::header(format!("external data files are not supported: {value}")));
                }
                let offset = parts
                    .next()
                    .ok_or_else(|| Error::header("missing data offset in file field"))?;
                data_offset = Some(parse_count("file", offset)?);
            }
            "count" => {
                let value_pos = line.len() - raw_value.trim_start().len();
                count_offset = Some(line_start + value_pos as u64);
                count = Some(parse_count(key, value)?);
            }
            "total_count" => total_count = Some(parse_count(key, value)?),
            "comment" => properties.comments_mut().push(value.to_string()),
            _ => properties.push_entry(key.to_string(), value.to_string()),
        }
    }

    if !terminated {
        return Err(Error::header("missing END line"));
    }
    let datatype = datatype.ok_or_else(|| Error::header("missing datatype field"))?;
    let data_offset = data_offset.ok_or_else(|| Error::header("missing file field"))?;
    let count_offset = count_offset.ok_or_else(|| Error::header("missing count field"))?;
    let timestamp = timestamp.ok_or_else(|| Error::header("missing timestamp field"))?;

    if data_offset < start + consumed {
        return Err(Error::header(format!("data offset {data_offset} lies inside the header")));
    }

    let count = count.unwrap_or(0);
    properties.set_timestamp(timestamp);
    properties.set_count(count);
    properties.set_total_count(total_count.unwrap_or(count));

    input.seek(SeekFrom::Start(data_offset))?;
    debug!(kind = %kind, %datatype, data_offset, count, "read header");

    Ok(Header {
        kind,
        datatype,
        properties,
        layout: HeaderLayout { data_offset, count_offset },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_properties() -> Properties {
        let mut props = Properties::with_timestamp("1700000000.000000001");
        props.set("step_size", "0.625").unwrap();
        props.set("source", "wm.mif").unwrap();
        props.add_comment("unit test").unwrap();
        props
    }

    #[test]
    fn test_write_then_read() -> Result<()> {
        let props = sample_properties();
        let mut cur = Cursor::new(Vec::new());
        let layout = write_header(&mut cur, FileKind::TrackScalars, &props, ScalarType::Float64BE)?;
        assert_eq!(cur.get_ref().len() as u64, layout.data_offset);

        let text = String::from_utf8(cur.get_ref().clone()).unwrap();
        assert!(text.starts_with("mrtrix track scalars\nstep_size: 0.625\n"));
        assert!(text.ends_with("count: 0000000000\ntotal_count: 0000000000\nEND\n"));
        assert_eq!(&text[layout.count_offset as usize..][..COUNT_WIDTH], "0000000000");

        cur.set_position(0);
        let header = read_header(&mut cur)?;
        assert_eq!(header.kind, FileKind::TrackScalars);
        assert_eq!(header.datatype, ScalarType::Float64BE);
        assert_eq!(header.layout, layout);
        assert_eq!(header.properties.timestamp(), props.timestamp());
        assert_eq!(header.properties.get("source"), Some("wm.mif"));
        assert_eq!(header.properties.comments(), ["unit test".to_string()]);
        assert_eq!(cur.position(), layout.data_offset);
        Ok(())
    }

    #[test]
    fn test_update_counts_in_place() -> Result<()> {
        let props = sample_properties();
        let mut cur = Cursor::new(Vec::new());
        let layout = write_header(&mut cur, FileKind::TrackScalars, &props, ScalarType::Float32LE)?;
        let len = cur.get_ref().len();

        update_counts(&mut cur, layout.count_offset, 12, 17)?;
        assert_eq!(cur.get_ref().len(), len);

        cur.set_position(0);
        let header = read_header(&mut cur)?;
        assert_eq!(header.properties.count(), 12);
        assert_eq!(header.properties.total_count(), 17);
        Ok(())
    }

    #[test]
    fn test_missing_timestamp() {
        let mut cur = Cursor::new(Vec::new());
        let err = write_header(&mut cur, FileKind::TrackScalars, &Properties::default(), ScalarType::Float32LE);
        assert!(matches!(err, Err(Error::MissingTimestamp)));
    }

    #[test]
    fn test_injected_lines_rejected() {
        let mut props = sample_properties();
        props.set_timestamp("1\ndatatype: Float64BE");
        let mut cur = Cursor::new(Vec::new());
        let err = write_header(&mut cur, FileKind::TrackScalars, &props, ScalarType::Float32LE);
        assert!(matches!(err, Err(Error::InvalidHeader(_))));
        assert!(cur.get_ref().is_empty());
    }

    #[test]
    fn test_count_overflow() {
        let mut cur = Cursor::new(Vec::new());
        assert!(update_counts(&mut cur, 0, MAX_COUNT + 1, 0).is_err());
    }

    #[test]
    fn test_bad_magic() {
        let mut cur = Cursor::new(b"mrtrix image\nEND\n".to_vec());
        assert!(matches!(read_header(&mut cur), Err(Error::InvalidMagic)));

        let mut cur = Cursor::new(vec![0xffu8, 0xfe, 0x00, b'\n']);
        assert!(matches!(read_header(&mut cur), Err(Error::InvalidMagic)));
    }

    #[test]
    fn test_truncated_header() {
        let mut cur = Cursor::new(b"mrtrix tracks\ntimestamp: 1\ndatatype: Float32LE\n".to_vec());
        assert!(matches!(read_header(&mut cur), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_unsupported_fields() {
        let text = "mrtrix tracks\ntimestamp: 1\ndatatype: Int16LE\nfile: . 80\ncount: 0\nEND\n";
        let mut cur = Cursor::new(text.as_bytes().to_vec());
        assert!(read_header(&mut cur).is_err());

        let text = "mrtrix tracks\ntimestamp: 1\ndatatype: Float32LE\nfile: other.dat 0\ncount: 0\nEND\n";
        let mut cur = Cursor::new(text.as_bytes().to_vec());
        assert!(read_header(&mut cur).is_err());
    }

    #[test]
    fn test_tracks_header_accepted() -> Result<()> {
        let props = sample_properties();
        let mut cur = Cursor::new(Vec::new());
        write_header(&mut cur, FileKind::Tracks, &props, ScalarType::Float32LE)?;
        cur.set_position(0);
        let header = read_header(&mut cur)?;
        assert_eq!(header.kind, FileKind::Tracks);
        Ok(())
    }
}
