//! # Track Scalars
//!
//! Reader and writer for track scalar files (`.tsf`): one floating-point
//! value per streamline point, stored alongside a separate track (`.tck`)
//! file that holds the streamline geometry.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (ScalarType, errors)
//! - [`core`] - Properties and configuration
//! - [`tsf`] - Binary format: header codec, reader, writer, pairing checks
//!
//! ## Example
//!
//! ```ignore
//! use track_scalars::prelude::*;
//!
//! let tracks = Properties::load("fibres.tck")?;
//! let props = Properties::paired_with(&tracks);
//!
//! let mut writer = ScalarWriter::<f32>::create("fa.tsf", &props, WriterConfig::default())?;
//! writer.append(&[0.41, 0.52, 0.48])?;
//! writer.close()?;
//!
//! let reader = ScalarReader::<f32>::open("fa.tsf")?;
//! check_properties_match(&tracks, reader.properties(), TRACK_SCALARS, false)?;
//! for scalars in reader {
//!     println!("{:?}", scalars?);
//! }
//! ```

pub mod util;
pub mod core;
pub mod tsf;

// Re-export commonly used types
pub use util::{Error, Result, ScalarType, ScalarValue};
pub use crate::core::{Properties, WriterConfig};
pub use tsf::{ScalarReader, ScalarWriter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, ScalarType, ScalarValue};
    pub use crate::core::{Config, Properties, WriterConfig};
    pub use crate::tsf::{
        check_properties_match, FileKind, Header, ScalarReader, ScalarWriter,
        PAIRED_SCALAR_FILES, TRACK_SCALARS,
    };
}
