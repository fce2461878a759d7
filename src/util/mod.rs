//! Utility types shared by the whole crate.
//!
//! - [`ScalarType`] - On-disk value encoding
//! - [`ScalarValue`] - In-memory value type (`f32` / `f64`)
//! - [`Error`] / [`Result`] - Error handling

mod data_type;
mod error;

pub use data_type::*;
pub use error::*;
