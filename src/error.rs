//! Error types for mailtree.

use thiserror::Error;

/// Common error type for mailtree.
#[derive(Error, Debug)]
pub enum MailtreeError {
    /// Malformed email address in the source document.
    #[error("invalid address: {0}")]
    Address(String),

    /// Malformed date in the source document.
    #[error("invalid date: {0}")]
    Date(String),

    /// Source document could not be parsed.
    #[error("failed to parse source: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] crate::template::TemplateError),

    /// Delivery error from the mail provider.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_yaml::Error> for MailtreeError {
    fn from(e: serde_yaml::Error) -> Self {
        MailtreeError::Parse(e.to_string())
    }
}

/// Result type alias for mailtree operations.
pub type Result<T> = std::result::Result<T, MailtreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_error_display() {
        let err = MailtreeError::Address("not-an-address".to_string());
        assert_eq!(err.to_string(), "invalid address: not-an-address");
    }

    #[test]
    fn test_delivery_error_display() {
        let err = MailtreeError::Delivery("status 500".to_string());
        assert_eq!(err.to_string(), "delivery error: status 500");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MailtreeError = io_err.into();
        assert!(matches!(err, MailtreeError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(sample_ok().unwrap(), 42);
    }
}
