//! Core layer - metadata and configuration.
//!
//! This module provides:
//! - [`Properties`] - Ordered metadata, provenance timestamp and counts
//! - [`Config`] - Key/value configuration lookup
//! - [`WriterConfig`] - Creation parameters for scalar writers

mod config;
mod properties;

pub use config::{
    Config, WriterConfig,
    BUFFER_SIZE_KEY, BUFFER_SIZE_ENV, CONFIG_ENV, DEFAULT_BUFFER_BYTES, MAX_BUFFER_BYTES,
};
pub use properties::{Properties, RESERVED_KEYS, is_reserved_key};
