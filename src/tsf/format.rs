//! Track scalar format constants.
//!
//! ## File Structure
//!
//! ```text
//! +---------------------------+
//! | "mrtrix track scalars\n"  |  magic line
//! | key: value\n ...          |  properties, comments, timestamp
//! | datatype: Float32LE\n     |
//! | file: . <offset>\n        |  body offset
//! | count: 0000000000\n       |  rewritten in place on every commit
//! | total_count: 0000000000\n |
//! | END\n                     |
//! +---------------------------+
//! | v v v NaN | NaN | v NaN   |  body: scalars, one NaN per streamline
//! | [+Inf]                    |  optional end-of-stream sentinel
//! +---------------------------+
//! ```

use std::fmt;

/// Magic line of a track scalar file.
pub const SCALARS_MAGIC: &str = "mrtrix track scalars";

/// Magic line of a track (geometry) file.
pub const TRACKS_MAGIC: &str = "mrtrix tracks";

/// Line terminating the header block.
pub const END_LINE: &str = "END";

/// Width of the zero-padded count fields.
pub const COUNT_WIDTH: usize = 10;

/// Largest value representable in a count field.
pub const MAX_COUNT: u64 = 9_999_999_999;

/// Upper bound on header size, guarding against reading non-track files.
pub const MAX_HEADER_BYTES: u64 = 1 << 20;

/// Delimiter closing one streamline's scalars.
pub const DELIMITER: f64 = f64::NAN;

/// End-of-stream sentinel.
pub const END_OF_STREAM: f64 = f64::INFINITY;

#[inline]
pub fn is_delimiter(v: f64) -> bool {
    v.is_nan()
}

/// Any infinity terminates the body.
#[inline]
pub fn is_end_of_stream(v: f64) -> bool {
    v.is_infinite()
}

/// Kind of file a header describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Streamline geometry (`.tck`)
    Tracks,
    /// Per-point scalars (`.tsf`)
    TrackScalars,
}

impl FileKind {
    pub const fn magic(self) -> &'static str {
        match self {
            Self::Tracks => TRACKS_MAGIC,
            Self::TrackScalars => SCALARS_MAGIC,
        }
    }

    pub fn from_magic(line: &str) -> Option<Self> {
        match line.trim_end() {
            TRACKS_MAGIC => Some(Self::Tracks),
            SCALARS_MAGIC => Some(Self::TrackScalars),
            _ => None,
        }
    }

    /// Human-readable description used in messages.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Tracks => "tracks",
            Self::TrackScalars => "track scalars",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(FileKind::from_magic("mrtrix track scalars\n"), Some(FileKind::TrackScalars));
        assert_eq!(FileKind::from_magic("mrtrix tracks"), Some(FileKind::Tracks));
        assert_eq!(FileKind::from_magic("mrtrix image"), None);
    }

    #[test]
    fn test_sentinels() {
        assert!(is_delimiter(DELIMITER));
        assert!(!is_delimiter(END_OF_STREAM));
        assert!(is_end_of_stream(END_OF_STREAM));
        assert!(!is_end_of_stream(1.0));
        assert_eq!(MAX_COUNT.to_string().len(), COUNT_WIDTH);
    }
}
