//! Error types for the MPEG-DASH engine adapter

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error types
#[derive(Error, Debug)]
pub enum Error {
    // Load errors
    #[error("Empty video source")]
    EmptySource,

    #[error("Cannot resolve source {src:?}: {source}")]
    InvalidSource {
        src: String,
        source: url::ParseError,
    },

    // Surface errors
    #[error("Time range index {index} out of bounds (length {len})")]
    TimeRange { index: usize, len: usize },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    // Driver errors
    #[error("Engine input channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::EmptySource => "EMPTY_SOURCE",
            Error::InvalidSource { .. } => "INVALID_SOURCE",
            Error::TimeRange { .. } => "TIME_RANGE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
            Error::ChannelClosed => "CHANNEL_CLOSED",
            Error::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::TimeRange { index: 0, len: 0 }.error_code(), "TIME_RANGE");
        assert_eq!(Error::EmptySource.error_code(), "EMPTY_SOURCE");
        assert_eq!(Error::ChannelClosed.error_code(), "CHANNEL_CLOSED");
    }

    #[test]
    fn test_invalid_source_message() {
        let base = url::Url::parse("data:text/plain,x").unwrap();
        let err = base.join("manifest.mpd").unwrap_err();
        let error = Error::InvalidSource {
            src: "manifest.mpd".into(),
            source: err,
        };
        assert!(error.to_string().contains("manifest.mpd"));
    }
}
