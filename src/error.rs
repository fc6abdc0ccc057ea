use thiserror::Error;

/// Unified error type for the Vigil application
#[derive(Error, Debug)]
pub enum VigilError {
    // Transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {status}")]
    BadStatus { status: u16 },

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    // Application errors
    #[error("Request rejected by server: {message}")]
    Rejected { message: String },

    // Session errors
    #[error("Session setup failed: {0}")]
    SessionSetup(String),

    // Proxy errors
    #[error("Invalid proxy address: {0}")]
    InvalidProxyAddress(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Vigil operations
pub type Result<T> = std::result::Result<T, VigilError>;

impl VigilError {
    /// True for failures at the network/HTTP layer (connect, timeout, TLS,
    /// non-2xx status, unreadable body). Logged at ERROR by callers.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            VigilError::Transport(_)
                | VigilError::BadStatus { .. }
                | VigilError::MalformedResponse(_)
        )
    }

    /// True when the server answered 2xx but signalled logical failure.
    /// Logged at WARNING by callers.
    pub fn is_rejection(&self) -> bool {
        matches!(self, VigilError::Rejected { .. })
    }
}
