use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Hex field errors
    #[error("Hex field value {value} outside [{min}, {max})")]
    HexOutOfRange { value: u64, min: u64, max: u64 },

    #[error("Hex field text '{text}' is not a valid {width}-digit hex number")]
    HexInvalidText { text: String, width: u8 },

    #[error("Hex field width {width} outside 1..={max}")]
    HexInvalidWidth { width: u8, max: u8 },

    // Validation status errors
    #[error("Malformed validation status: {message}")]
    MalformedStatus { message: String },

    // Stream errors
    #[error("Frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge { size: usize, max_size: usize },

    // Configuration errors
    #[error("Configuration error: {message}")]
    InvalidConfig { message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a malformed status error.
    pub fn malformed_status(message: impl Into<String>) -> Self {
        Error::MalformedStatus {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::HexOutOfRange {
            value: 70000,
            min: 0,
            max: 65536,
        };
        assert_eq!(err.to_string(), "Hex field value 70000 outside [0, 65536)");

        let err = Error::config("separator equals terminator");
        assert_eq!(
            err.to_string(),
            "Configuration error: separator equals terminator"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
