use std::fmt;
use thiserror::Error;

/// The error type for netstorage operations.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The credential secret key is missing or empty.
    InvalidCredentials,

    /// The parameter descriptor is unusable for signing (no action set).
    MissingParameters,

    /// A connection-level failure (reset, DNS, timeout). Retryable.
    TransportFailure,

    /// The server answered with a non-success status. Retryable.
    UnexpectedServerResponse,

    /// The remote `Date` header diverges more than 30s from the local
    /// clock. Retrying will not fix a systemic clock problem.
    ClockDrift,

    /// 404 on a read action. The resource genuinely does not exist.
    ResourceNotFound,

    /// The local source file for an upload does not exist.
    LocalFileNotFound,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether another attempt at the same request may succeed.
    ///
    /// Signing and parameter errors are deterministic, clock drift is
    /// systemic, and a 404 on a read means the resource is absent. Only
    /// transport failures and generic server responses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TransportFailure | ErrorKind::UnexpectedServerResponse
        )
    }
}

// Convenience constructors
impl Error {
    /// Create an invalid credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create a missing parameters error.
    pub fn missing_parameters(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingParameters, message)
    }

    /// Create a transport failure error.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFailure, message)
    }

    /// Create an unexpected server response error.
    pub fn unexpected_server_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedServerResponse, message)
    }

    /// Create a clock drift error.
    pub fn clock_drift(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClockDrift, message)
    }

    /// Create a resource not found error.
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceNotFound, message)
    }

    /// Create a local file not found error.
    pub fn local_file_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LocalFileNotFound, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidCredentials => write!(f, "invalid credentials"),
            ErrorKind::MissingParameters => write!(f, "missing parameters"),
            ErrorKind::TransportFailure => write!(f, "transport failure"),
            ErrorKind::UnexpectedServerResponse => write!(f, "unexpected server response"),
            ErrorKind::ClockDrift => write!(f, "clock drift"),
            ErrorKind::ResourceNotFound => write!(f, "resource not found"),
            ErrorKind::LocalFileNotFound => write!(f, "local file not found"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::new(ErrorKind::MissingParameters, err.to_string())
            .with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::new(ErrorKind::MissingParameters, err.to_string())
            .with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::new(ErrorKind::MissingParameters, err.to_string())
            .with_source(anyhow::Error::from(err))
    }
}
