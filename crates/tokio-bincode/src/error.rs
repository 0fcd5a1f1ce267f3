//! Error types for codec operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Frame too large: {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: u64, max: usize },

    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    /// Whether the error came from the underlying transport rather than the payload.
    pub fn is_io(&self) -> bool {
        matches!(self, CodecError::Io(_))
            || matches!(self, CodecError::Bincode(e) if matches!(**e, bincode::ErrorKind::Io(_)))
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_too_large_message() {
        let err = CodecError::FrameTooLarge { size: 10, max: 4 };
        assert_eq!(
            err.to_string(),
            "Frame too large: 10 bytes exceeds the 4 byte limit"
        );
        assert!(!err.is_io());
    }

    #[test]
    fn test_io_classification() {
        let err = CodecError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(err.is_io());

        let wrapped: bincode::Error = Box::new(bincode::ErrorKind::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "eof",
        )));
        assert!(CodecError::from(wrapped).is_io());

        let payload: bincode::Error = Box::new(bincode::ErrorKind::InvalidTagEncoding(7));
        assert!(!CodecError::from(payload).is_io());
    }
}
