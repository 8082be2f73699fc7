//! Error types for calendar feed operations.
//!
//! Every fallible operation in this crate returns a [`FeedResult`]. The
//! [`FeedErrorCode`] gives callers a stable classification; HTTP failures
//! additionally carry the response status and body for diagnostics.

use std::fmt;
use thiserror::Error;

/// The category of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorCode {
    /// Conflicting or malformed filter combination.
    InvalidQuery,
    /// Entry end time is not after its start time.
    InvalidRange,
    /// A write was attempted without a stored credential.
    NotAuthenticated,
    /// Credential exchange failed or its response could not be read.
    AuthenticationFailed,
    /// The service answered with a non-success, non-redirect status.
    RequestFailed,
    /// An optional collaborator (e.g. the recurrence codec) is not present.
    UnsupportedFeature,
    /// A value handed to the API is not acceptable (bad enum text, MIME type, ...).
    InvalidArgument,
    /// The service answered with a body that is not a usable document.
    InvalidResponse,
    /// Transport level failure: connection, timeout, TLS.
    NetworkError,
    /// Missing or invalid configuration.
    ConfigurationError,
    /// Unexpected internal state.
    InternalError,
}

impl FeedErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidQuery => "invalid_query",
            Self::InvalidRange => "invalid_range",
            Self::NotAuthenticated => "not_authenticated",
            Self::AuthenticationFailed => "authentication_failed",
            Self::RequestFailed => "request_failed",
            Self::UnsupportedFeature => "unsupported_feature",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidResponse => "invalid_response",
            Self::NetworkError => "network_error",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a calendar feed.
#[derive(Debug, Error)]
pub struct FeedError {
    code: FeedErrorCode,
    message: String,
    /// HTTP status code of the failing response, if any.
    status: Option<u16>,
    /// Body of the failing response, if any.
    body: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeedError {
    /// Creates a new error with the given code and message.
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InvalidQuery, message)
    }

    /// Creates an invalid range error.
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InvalidRange, message)
    }

    /// Creates a not-authenticated error.
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::NotAuthenticated, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::AuthenticationFailed, message)
    }

    /// Creates a request failure carrying the response status line and body.
    pub fn request_failed(status: u16, status_line: &str, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            code: FeedErrorCode::RequestFailed,
            message: status_line.to_string(),
            status: Some(status),
            body: Some(body),
            source: None,
        }
    }

    /// Creates an unsupported feature error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::UnsupportedFeature, message)
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InvalidArgument, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InvalidResponse, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::NetworkError, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InternalError, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FeedErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status of the failing response, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the body of the failing response, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(body) = self.body.as_deref().filter(|b| !b.trim().is_empty()) {
            write!(f, " ({})", body.trim())?;
        }
        Ok(())
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
