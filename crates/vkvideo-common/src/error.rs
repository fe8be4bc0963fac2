//! Common error type used throughout vkvideo.
//!
//! Covers argument validation, remote API failures, transport failures, and
//! local storage errors. Every fallible operation in the workspace returns
//! [`Result`].

/// Common error type for vkvideo.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested record was not found locally.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid arguments were supplied. Raised before any request is made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation is not legal in the record's current lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The remote API answered with an error envelope.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response record did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new InvalidState error.
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new Api error from the remote error code and message.
    pub fn api<S: Into<String>>(code: i64, msg: S) -> Self {
        Self::Api {
            code,
            message: msg.into(),
        }
    }

    /// Create a new Transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new Parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was raised by argument validation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("album 42");
        assert_eq!(err.to_string(), "Not found: album 42");

        let err = Error::database("connection failed");
        assert_eq!(err.to_string(), "Database error: connection failed");

        let err = Error::invalid_input("count too large");
        assert_eq!(err.to_string(), "Invalid input: count too large");

        let err = Error::invalid_state("comment is archived");
        assert_eq!(err.to_string(), "Invalid state: comment is archived");

        let err = Error::api(15, "Access denied");
        assert_eq!(err.to_string(), "API error 15: Access denied");

        let err = Error::transport("timed out");
        assert_eq!(err.to_string(), "Transport error: timed out");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<i64>("not json").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(Error::invalid_input("x").is_invalid_input());
        assert!(!Error::api(1, "x").is_invalid_input());
    }
}
