//! Message framing strategies.

use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_util::codec::LengthDelimitedCodec;

/// Default upper bound on a single length-delimited frame (8 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Default width of the length prefix, in bytes.
pub const DEFAULT_LENGTH_FIELD_LENGTH: usize = 4;

/// How message boundaries are located in the byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Framing {
    /// Messages are written back to back with no header.
    ///
    /// The decoder finds the end of a message by deserializing it, so a
    /// message split across many reads is re-parsed on each one.
    Streamed,

    /// Every message is prefixed with its encoded length.
    LengthDelimited(LengthDelimitedConfig),
}

impl Framing {
    /// Length-delimited framing with default settings.
    pub fn length_delimited() -> Self {
        Framing::LengthDelimited(LengthDelimitedConfig::default())
    }

    /// Check that the framing can be turned into a codec.
    pub fn validate(&self) -> Result<()> {
        match self {
            Framing::Streamed => Ok(()),
            Framing::LengthDelimited(config) => config.validate(),
        }
    }
}

impl Default for Framing {
    #[cfg(not(feature = "big_data"))]
    fn default() -> Self {
        Framing::Streamed
    }

    #[cfg(feature = "big_data")]
    fn default() -> Self {
        Framing::length_delimited()
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Streamed => f.write_str("streamed"),
            Framing::LengthDelimited(_) => f.write_str("length-delimited"),
        }
    }
}

impl FromStr for Framing {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streamed" | "stream" => Ok(Framing::Streamed),
            "length-delimited" | "length_delimited" | "delimited" => {
                Ok(Framing::length_delimited())
            }
            other => Err(CodecError::InvalidConfig(format!(
                "unknown framing '{}', expected 'streamed' or 'length-delimited'",
                other
            ))),
        }
    }
}

/// Settings for the length prefix of [`Framing::LengthDelimited`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthDelimitedConfig {
    /// Largest body accepted or produced, in bytes.
    pub max_frame_length: usize,

    /// Width of the length prefix, 1 to 8 bytes.
    pub length_field_length: usize,

    /// Write the prefix in network byte order.
    pub big_endian: bool,
}

impl Default for LengthDelimitedConfig {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            length_field_length: DEFAULT_LENGTH_FIELD_LENGTH,
            big_endian: true,
        }
    }
}

impl LengthDelimitedConfig {
    /// Set the maximum frame length.
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// Set the width of the length prefix.
    pub fn with_length_field_length(mut self, length_field_length: usize) -> Self {
        self.length_field_length = length_field_length;
        self
    }

    /// Write the prefix little endian.
    pub fn little_endian(mut self) -> Self {
        self.big_endian = false;
        self
    }

    /// Check the prefix width and that `max_frame_length` fits in it.
    pub fn validate(&self) -> Result<()> {
        if self.length_field_length == 0 || self.length_field_length > 8 {
            return Err(CodecError::InvalidConfig(format!(
                "length field must be 1 to 8 bytes, got {}",
                self.length_field_length
            )));
        }
        if self.max_frame_length == 0 {
            return Err(CodecError::InvalidConfig(
                "max frame length must be non-zero".to_string(),
            ));
        }
        let representable = if self.length_field_length >= 8 {
            u64::MAX
        } else {
            (1u64 << (self.length_field_length * 8)) - 1
        };
        if self.max_frame_length as u64 > representable {
            return Err(CodecError::InvalidConfig(format!(
                "max frame length {} does not fit in a {} byte length field",
                self.max_frame_length, self.length_field_length
            )));
        }
        Ok(())
    }

    pub(crate) fn build(&self) -> Result<LengthDelimitedCodec> {
        self.validate()?;
        Ok(self.new_codec())
    }

    /// Build the framing layer without validating. Only for configs known to
    /// be valid, such as the default.
    pub(crate) fn new_codec(&self) -> LengthDelimitedCodec {
        let mut builder = LengthDelimitedCodec::builder();
        builder
            .max_frame_length(self.max_frame_length)
            .length_field_length(self.length_field_length);
        if self.big_endian {
            builder.big_endian();
        } else {
            builder.little_endian();
        }
        builder.new_codec()
    }
}
