//! Error handling for libteamsgraph
//!
//! This module provides the error type returned by every fallible
//! operation in the library, along with the mapping a routing layer
//! needs to turn an error kind into an HTTP status.

use std::fmt;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid argument provided (bad or ambiguous message source, malformed timestamp)
    InvalidArgument,
    /// Token exchange failed or the token was rejected
    AuthenticationFailed,
    /// Authenticated but the granted permissions are insufficient
    PermissionDenied,
    /// Team, channel, chat or message does not exist or is inaccessible
    NotFound,
    /// Network call exceeded its deadline or the connection failed
    Timeout,
    /// Any other non-success remote response or malformed payload
    Upstream,
    /// Invariant violation inside the library (e.g. pagination cap exceeded)
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "Invalid argument",
            ErrorCode::AuthenticationFailed => "Authentication failed",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::NotFound => "Not found",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::Upstream => "Upstream error",
            ErrorCode::Internal => "Internal error",
        }
    }

    /// HTTP status a routing layer should answer with for this error kind
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidArgument => 400,
            ErrorCode::AuthenticationFailed => 401,
            ErrorCode::PermissionDenied => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::Timeout => 504,
            ErrorCode::Upstream => 500,
            ErrorCode::Internal => 500,
        }
    }
}

/// Error type carrying the kind plus whatever upstream detail was available
#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    /// Graph error code from the response envelope (e.g. "Unauthorized", "NotFound")
    pub(crate) graph_error_code: Option<String>,
    /// Request ID from the `request-id` response header for debugging
    pub(crate) request_id: Option<String>,
    /// HTTP status code if this error came from an HTTP response
    pub(crate) http_status: Option<u16>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: message.into(),
            graph_error_code: None,
            request_id: None,
            http_status: None,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::new(ErrorCode::InvalidArgument, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::new(ErrorCode::Internal, msg)
    }

    /// Add the Graph error code from the response envelope (builder pattern)
    pub fn with_graph_error_code(mut self, code: String) -> Self {
        self.graph_error_code = Some(code);
        self
    }

    /// Add the request ID for debugging (builder pattern)
    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Add the HTTP status code (builder pattern)
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Get the Graph error code if available
    pub fn graph_error_code(&self) -> Option<&str> {
        self.graph_error_code.as_deref()
    }

    /// Get the request ID if available
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Get the HTTP status code if available
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorCode::Upstream, "Graph returned 500");
        assert_eq!(err.code, ErrorCode::Upstream);
        assert_eq!(err.message, "Graph returned 500");
    }

    #[test]
    fn test_error_with_additional_info() {
        let error = Error::new(ErrorCode::NotFound, "Channel not found")
            .with_graph_error_code("NotFound".to_string())
            .with_request_id("abc123".to_string())
            .with_http_status(404);

        assert_eq!(error.code, ErrorCode::NotFound);
        assert_eq!(error.message, "Channel not found");
        assert_eq!(error.graph_error_code(), Some("NotFound"));
        assert_eq!(error.request_id(), Some("abc123"));
        assert_eq!(error.http_status(), Some(404));
    }

    #[test]
    fn test_error_without_additional_info() {
        let error = Error::invalid_argument("Missing chat_id");

        assert_eq!(error.code, ErrorCode::InvalidArgument);
        assert_eq!(error.graph_error_code(), None);
        assert_eq!(error.request_id(), None);
        assert_eq!(error.http_status(), None);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::InvalidArgument.http_status(), 400);
        assert_eq!(ErrorCode::AuthenticationFailed.http_status(), 401);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::Timeout.http_status(), 504);
        assert_eq!(ErrorCode::Upstream.http_status(), 500);
        assert_eq!(ErrorCode::Internal.http_status(), 500);
    }

    #[test]
    fn test_display() {
        let err = Error::new(ErrorCode::PermissionDenied, "Missing ChannelMessage.Read.All");
        assert_eq!(
            err.to_string(),
            "Permission denied: Missing ChannelMessage.Read.All"
        );
    }
}
