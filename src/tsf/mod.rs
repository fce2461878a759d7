//! Track scalar file (`.tsf`) format.
//!
//! A track scalar file attaches one floating-point value per point to the
//! streamlines of a separate track file. It shares the track file's text
//! header and is bound to it through the header timestamp.
//!
//! - [`header`] - Header codec shared with track files
//! - [`ScalarReader`] - Sequential reader
//! - [`ScalarWriter`] - Buffered writer
//! - [`check_properties_match`] - Pairing checks

mod format;
pub mod header;
mod reader;
mod writer;
mod check;

pub use format::*;
pub use header::{Header, HeaderLayout, read_header, write_header, update_counts};
pub use reader::ScalarReader;
pub use writer::{ScalarBuffer, ScalarWriter};
pub use check::{
    check_counts, check_properties_match, check_timestamps,
    PAIRED_SCALAR_FILES, TRACK_SCALARS,
};
