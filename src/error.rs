/// Which side of a call an [`Error`] came from.
///
/// `Connection` errors mean no usable session could be established,
/// `Service` errors mean the session was up but the chat call failed or
/// returned something unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Service,
    Storage,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("The configuration contains errors: {0}")]
    BadConfigurationError(String),

    #[error("Failed to connect to the authorization endpoint: {0}")]
    ConnectionError(String),

    #[error("Authorization failed ({status}): {message}")]
    AuthenticationError { status: u16, message: String },

    #[error("Failed to serialize request: {0}")]
    SerializationError(serde_json::Error),

    #[error("Failed to deserialize response: {0}")]
    DeserializationError(serde_json::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("The response contains no choices")]
    NoChoicesError,

    #[error("Roadmap index is corrupt: {0}")]
    CorruptIndexError(serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadConfigurationError(_)
            | Error::ConnectionError(_)
            | Error::AuthenticationError { .. } => ErrorKind::Connection,
            Error::SerializationError(_)
            | Error::DeserializationError(_)
            | Error::NetworkError(_)
            | Error::ApiError { .. }
            | Error::NoChoicesError => ErrorKind::Service,
            Error::CorruptIndexError(_) | Error::IoError(_) => ErrorKind::Storage,
        }
    }
}
