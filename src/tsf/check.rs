//! Consistency checks between paired track and track scalar files.
//!
//! A scalar file is only meaningful alongside the track file it was
//! generated for. The pairing is recorded in the timestamp field, which a
//! scalar file copies from its track file. Two scalar files may also be
//! compared; they must then derive from the same track file.

use tracing::warn;

use crate::core::Properties;
use crate::util::{Error, Result};

/// Description used when comparing a track file with its scalars.
pub const TRACK_SCALARS: &str = "track scalars";

/// Description used when comparing two scalar files.
pub const PAIRED_SCALAR_FILES: &str = "paired scalar files";

/// Fail unless both properties carry the same timestamp.
pub fn check_timestamps(a: &Properties, b: &Properties, kind: &str) -> Result<()> {
    let left = a.timestamp().ok_or(Error::MissingTimestamp)?;
    let right = b.timestamp().ok_or(Error::MissingTimestamp)?;
    if left != right {
        return Err(Error::ProvenanceMismatch {
            kind: kind.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        });
    }
    Ok(())
}

/// Compare declared streamline counts.
///
/// A mismatch is an error when `abort_on_mismatch` is set, otherwise a
/// warning is logged and `Ok` returned.
pub fn check_counts(a: &Properties, b: &Properties, kind: &str, abort_on_mismatch: bool) -> Result<()> {
    if a.count() == b.count() {
        return Ok(());
    }
    if abort_on_mismatch {
        return Err(Error::CountMismatch {
            kind: kind.to_string(),
            left: a.count(),
            right: b.count(),
        });
    }
    warn!(
        kind,
        left = a.count(),
        right = b.count(),
        "streamline count mismatch between {kind}; continuing"
    );
    Ok(())
}

/// Verify that two files' properties can be processed together.
///
/// The timestamp must always match. Counts must match when
/// `abort_on_count_mismatch` is set, and only produce a warning otherwise.
pub fn check_properties_match(
    a: &Properties,
    b: &Properties,
    kind: &str,
    abort_on_count_mismatch: bool,
) -> Result<()> {
    check_timestamps(a, b, kind)?;
    check_counts(a, b, kind, abort_on_count_mismatch)
}
