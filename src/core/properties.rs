//! Properties shared by a track file and the scalar files annotating it.
//!
//! Properties are an ordered list of string key/value pairs plus the
//! fields the header codec manages itself: the provenance timestamp and
//! the streamline counts.

use smallvec::SmallVec;
use std::fmt;

use crate::util::{Error, Result};

/// Header keys owned by the header codec.
pub const RESERVED_KEYS: [&str; 6] = ["timestamp", "datatype", "file", "count", "total_count", "comment"];

/// Check whether a key is managed by the header codec.
#[inline]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Metadata block of a track or track scalar file.
#[derive(Clone, Default, PartialEq)]
pub struct Properties {
    entries: SmallVec<[(String, String); 8]>,
    comments: Vec<String>,
    timestamp: Option<String>,
    count: u64,
    total_count: u64,
}

impl Properties {
    /// Create properties for a new geometry generation event.
    ///
    /// A fresh timestamp is generated. Scalar files must never be created
    /// this way; use [`Properties::paired_with`] instead.
    pub fn new() -> Self {
        Self {
            timestamp: Some(current_timestamp()),
            ..Self::default()
        }
    }

    /// Create properties carrying an explicit provenance token.
    pub fn with_timestamp(token: impl Into<String>) -> Self {
        Self {
            timestamp: Some(token.into()),
            ..Self::default()
        }
    }

    /// Derive properties for a scalar file annotating `tracks`.
    ///
    /// Entries, comments and the timestamp are copied verbatim; counts
    /// start at zero and are maintained by the writer.
    pub fn paired_with(tracks: &Properties) -> Self {
        Self {
            entries: tracks.entries.clone(),
            comments: tracks.comments.clone(),
            timestamp: tracks.timestamp.clone(),
            count: 0,
            total_count: 0,
        }
    }

    /// Set a metadata value, replacing an existing one with the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        check_entry(&key, &value)?;

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return Ok(());
            }
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Insert an entry decoded from a header, skipping validation.
    pub(crate) fn push_entry(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a metadata value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Number of key/value entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append a free-text comment line.
    pub fn add_comment(&mut self, comment: impl Into<String>) -> Result<()> {
        let comment = comment.into();
        check_value("comment", &comment)?;
        self.comments.push(comment);
        Ok(())
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub(crate) fn comments_mut(&mut self) -> &mut Vec<String> {
        &mut self.comments
    }

    /// Provenance token, if any.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Overwrite the provenance token.
    ///
    /// Only meaningful for geometry files; scalar files take theirs from
    /// the track file they annotate.
    pub fn set_timestamp(&mut self, token: impl Into<String>) {
        self.timestamp = Some(token.into());
    }

    /// Number of complete streamlines.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn set_count(&mut self, count: u64) {
        self.count = count;
    }

    /// Number of streamlines processed, including those with no scalars.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
    }

    /// Check that every field survives a header write and read unchanged.
    ///
    /// The timestamp is set without validation, so a token holding a line
    /// break is only caught here.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.iter() {
            check_entry(key, value)?;
        }
        for comment in &self.comments {
            check_value("comment", comment)?;
        }
        if let Some(token) = &self.timestamp {
            check_value("timestamp", token)?;
        }
        Ok(())
    }
}

/// Header lines are `key: value`, with both sides trimmed on read.
fn check_entry(key: &str, value: &str) -> Result<()> {
    if is_reserved_key(key) {
        return Err(Error::ReservedKey(key.to_string()));
    }
    if key.is_empty() || key.trim() != key || key.contains(|c: char| c == ':' || c == '\n' || c == '\r') {
        return Err(Error::header(format!("key not representable in a header line: {key:?}")));
    }
    check_value(key, value)
}

fn check_value(key: &str, value: &str) -> Result<()> {
    if value.trim() != value || value.contains(|c: char| c == '\n' || c == '\r') {
        return Err(Error::header(format!("{key} value not representable in a header line: {value:?}")));
    }
    Ok(())
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Properties")
            .field("timestamp", &self.timestamp)
            .field("count", &self.count)
            .field("total_count", &self.total_count)
            .field("entries", &self.entries)
            .field("comments", &self.comments)
            .finish()
    }
}

/// Seconds since the Unix epoch with nanosecond resolution.
fn current_timestamp() -> String {
    let now = time::OffsetDateTime::now_utc();
    format!("{}.{:09}", now.unix_timestamp(), now.nanosecond())
}
