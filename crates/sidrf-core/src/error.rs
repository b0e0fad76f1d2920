//! Error types for sidrf

use thiserror::Error;

/// Main error type for sidrf
#[derive(Error, Debug)]
pub enum SidrfError {
    /// Configuration error (unknown policy, out-of-range parameter)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed workload input
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sidrf operations
pub type SidrfResult<T> = Result<T, SidrfError>;

impl SidrfError {
    /// Build a parse error for a 1-based input line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SidrfError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for SidrfError {
    fn from(err: toml::de::Error) -> Self {
        SidrfError::Config(format!("Failed to parse config: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SidrfError::Config("unknown policy".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown policy");
    }

    #[test]
    fn test_parse_error_display() {
        let err = SidrfError::parse(3, "expected 6 fields, found 5");
        assert_eq!(
            err.to_string(),
            "Parse error on line 3: expected 6 fields, found 5"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SidrfError = io_err.into();
        assert!(matches!(err, SidrfError::Io(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("p = ").unwrap_err();
        let err: SidrfError = toml_err.into();
        assert!(matches!(err, SidrfError::Config(_)));
    }
}
