//! Configuration lookup and writer settings.
//!
//! Configuration files hold one `Key: value` pair per line; blank lines
//! and lines starting with `#` are ignored.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::util::{Error, Result, ScalarType};

/// Config key holding the writer buffer size in bytes.
pub const BUFFER_SIZE_KEY: &str = "TrackWriterBufferSize";

/// Default writer buffer size in bytes (16 MiB).
pub const DEFAULT_BUFFER_BYTES: usize = 16 * 1024 * 1024;

/// Largest accepted writer buffer size in bytes (1 GiB).
///
/// The buffer is allocated in full when the writer is created.
pub const MAX_BUFFER_BYTES: usize = 1 << 30;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "TSF_CONFIG";

/// Environment variable overriding [`BUFFER_SIZE_KEY`].
pub const BUFFER_SIZE_ENV: &str = "TSF_WRITER_BUFFER_SIZE";

/// Parsed key/value configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        Self::parse(&text)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut values = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| {
                Error::InvalidConfig(format!("line {}: expected \"Key: value\"", lineno + 1))
            })?;
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    /// Build configuration from the process environment.
    ///
    /// Reads the file named by `TSF_CONFIG` if set, then applies
    /// `TSF_WRITER_BUFFER_SIZE` on top.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::new(),
        };
        if let Ok(size) = std::env::var(BUFFER_SIZE_ENV) {
            config.set(BUFFER_SIZE_KEY, size);
        }
        Ok(config)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Integer lookup; missing keys yield `default`, malformed values an error.
    pub fn get_int(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("{key}: expected an integer, got {v:?}"))),
        }
    }
}

/// Creation parameters of a [`ScalarWriter`](crate::tsf::ScalarWriter).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    /// Write-back buffer size in bytes.
    pub buffer_bytes: usize,
    /// On-disk encoding of the body.
    pub datatype: ScalarType,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: DEFAULT_BUFFER_BYTES,
            datatype: ScalarType::default(),
        }
    }
}

impl WriterConfig {
    pub fn new(datatype: ScalarType) -> Self {
        Self { datatype, ..Self::default() }
    }

    pub fn with_buffer_bytes(mut self, bytes: usize) -> Self {
        self.buffer_bytes = bytes;
        self
    }

    /// Apply the buffer size from a [`Config`], keeping the 16 MiB default.
    pub fn from_config(config: &Config, datatype: ScalarType) -> Result<Self> {
        let bytes = config.get_int(BUFFER_SIZE_KEY, DEFAULT_BUFFER_BYTES as u64)?;
        let buffer_bytes = usize::try_from(bytes)
            .map_err(|_| Error::InvalidConfig(format!("{BUFFER_SIZE_KEY} too large: {bytes}")))?;
        let config = Self { buffer_bytes, datatype };
        config.validate()?;
        Ok(config)
    }

    /// Reject buffer sizes above [`MAX_BUFFER_BYTES`].
    pub fn validate(&self) -> Result<()> {
        if self.buffer_bytes > MAX_BUFFER_BYTES {
            return Err(Error::InvalidConfig(format!(
                "{BUFFER_SIZE_KEY} too large: {} bytes (limit {MAX_BUFFER_BYTES})",
                self.buffer_bytes
            )));
        }
        Ok(())
    }

    /// Buffer capacity in encoded values, never zero.
    pub fn capacity_values(&self) -> usize {
        (self.buffer_bytes / self.datatype.num_bytes()).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cfg = Config::parse("# comment\n\nTrackWriterBufferSize: 4096\nName : value with: colon\n").unwrap();
        assert_eq!(cfg.get_int(BUFFER_SIZE_KEY, 0).unwrap(), 4096);
        assert_eq!(cfg.get("Name"), Some("value with: colon"));
        assert!(Config::parse("no separator").is_err());
    }

    #[test]
    fn test_get_int_default_and_invalid() {
        let mut cfg = Config::new();
        assert_eq!(cfg.get_int("Missing", 7).unwrap(), 7);
        cfg.set("Bad", "lots");
        assert!(matches!(cfg.get_int("Bad", 0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_writer_config() {
        let cfg = WriterConfig::default();
        assert_eq!(cfg.buffer_bytes, 16_777_216);
        assert_eq!(cfg.capacity_values(), 16_777_216 / 4);

        let cfg = WriterConfig::new(ScalarType::Float64BE);
        assert_eq!(cfg.capacity_values(), 16_777_216 / 8);

        let mut file_cfg = Config::new();
        file_cfg.set(BUFFER_SIZE_KEY, "64");
        let cfg = WriterConfig::from_config(&file_cfg, ScalarType::Float32LE).unwrap();
        assert_eq!(cfg.capacity_values(), 16);

        assert_eq!(WriterConfig::default().with_buffer_bytes(3).capacity_values(), 1);
    }

    #[test]
    fn test_buffer_size_limit() {
        let mut file_cfg = Config::new();
        file_cfg.set(BUFFER_SIZE_KEY, "1099511627776");
        let err = WriterConfig::from_config(&file_cfg, ScalarType::Float32LE);
        assert!(matches!(err, Err(Error::InvalidConfig(_))));

        file_cfg.set(BUFFER_SIZE_KEY, MAX_BUFFER_BYTES.to_string());
        assert!(WriterConfig::from_config(&file_cfg, ScalarType::Float32LE).is_ok());
        assert!(WriterConfig::default().with_buffer_bytes(usize::MAX).validate().is_err());
    }
}
