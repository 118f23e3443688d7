//! Error types module
//!
//! All failures raised by the portal client are unified under [`PortalError`].
//! Variants fall into three groups:
//!
//! - precondition errors, detected before any remote call is made
//!   (`MissingContext`, `MissingCsrfToken`, `InvalidInput`, `InvalidMove`, `Config`)
//! - remote-call errors, a non-success HTTP status with the server's `detail`
//! - transport errors, where no HTTP response was received at all
//!
//! Operation-level wrappers (`FolderCreation`, `FileUpload`) carry the failing
//! folder path or file name together with the underlying cause.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected operations the user can correct
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Missing required context: {0}")]
    MissingContext(&'static str),

    #[error("CSRF token not found (checked cookie, meta tag and form field)")]
    MissingCsrfToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("Network error: {message}")]
    Transport { message: String, timeout: bool },

    #[error("Failed to create folder \"{path}\": {source}")]
    FolderCreation {
        path: String,
        #[source]
        source: Box<PortalError>,
    },

    #[error("Failed to upload {file}: {source}")]
    FileUpload {
        file: String,
        #[source]
        source: Box<PortalError>,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// Build a remote-call error from a status code and message.
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        PortalError::Api {
            status,
            detail: detail.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        PortalError::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    /// True when no HTTP response was received (connection, DNS, timeout).
    ///
    /// Wrapped errors are classified by their innermost cause.
    pub fn is_transport(&self) -> bool {
        match self {
            PortalError::Transport { .. } => true,
            PortalError::FolderCreation { source, .. } | PortalError::FileUpload { source, .. } => {
                source.is_transport()
            }
            _ => false,
        }
    }

    /// True when the error was raised before any remote call was issued.
    ///
    /// Wrapped errors are classified by their innermost cause.
    pub fn is_precondition(&self) -> bool {
        match self {
            PortalError::MissingContext(_)
            | PortalError::MissingCsrfToken
            | PortalError::InvalidInput(_)
            | PortalError::InvalidMove(_)
            | PortalError::Config(_) => true,
            PortalError::FolderCreation { source, .. } | PortalError::FileUpload { source, .. } => {
                source.is_precondition()
            }
            _ => false,
        }
    }

    /// HTTP status of the innermost remote-call error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::Api { status, .. } => Some(*status),
            PortalError::FolderCreation { source, .. } | PortalError::FileUpload { source, .. } => {
                source.status()
            }
            _ => None,
        }
    }

    /// Machine-readable error code (e.g., "API_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::MissingContext(_) => "MISSING_CONTEXT",
            PortalError::MissingCsrfToken => "MISSING_CSRF_TOKEN",
            PortalError::InvalidInput(_) => "INVALID_INPUT",
            PortalError::InvalidMove(_) => "INVALID_MOVE",
            PortalError::Config(_) => "CONFIG_ERROR",
            PortalError::Api { .. } => "API_ERROR",
            PortalError::Transport { .. } => "TRANSPORT_ERROR",
            PortalError::FolderCreation { .. } => "FOLDER_CREATION_FAILED",
            PortalError::FileUpload { .. } => "FILE_UPLOAD_FAILED",
            PortalError::Decode(_) => "DECODE_ERROR",
            PortalError::Io(_) => "IO_ERROR",
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        if self.is_precondition() {
            return LogLevel::Warn;
        }
        match self.status() {
            Some(status) if status < 500 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Decode(format!("JSON parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_classification() {
        let err = PortalError::FolderCreation {
            path: "a/b".to_string(),
            source: Box::new(PortalError::transport("connection refused")),
        };
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("a/b"));
    }

    #[test]
    fn api_error_displays_detail() {
        let err = PortalError::api(403, "Forbidden");
        assert_eq!(err.to_string(), "Forbidden");
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(!err.is_transport());
    }

    #[test]
    fn file_upload_error_names_file() {
        let err = PortalError::FileUpload {
            file: "notes.pdf".to_string(),
            source: Box::new(PortalError::api(500, "Server exploded")),
        };
        assert_eq!(err.to_string(), "Failed to upload notes.pdf: Server exploded");
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(err.error_code(), "FILE_UPLOAD_FAILED");
    }

    #[test]
    fn wrapped_missing_token_is_a_precondition() {
        let err = PortalError::FolderCreation {
            path: "a".to_string(),
            source: Box::new(PortalError::MissingCsrfToken),
        };
        assert!(err.is_precondition());
        assert_eq!(err.log_level(), LogLevel::Warn);

        let err = PortalError::FileUpload {
            file: "a/f.txt".to_string(),
            source: Box::new(PortalError::api(400, "bad")),
        };
        assert!(!err.is_precondition());
    }

    #[test]
    fn preconditions() {
        assert!(PortalError::MissingCsrfToken.is_precondition());
        assert!(PortalError::MissingContext("session").is_precondition());
        assert!(!PortalError::api(400, "bad").is_precondition());
    }
}
