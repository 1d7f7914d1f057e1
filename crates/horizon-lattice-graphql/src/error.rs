//! Error types for the GraphQL engine.

use http::StatusCode;
use serde_json::Value;

use crate::decode::DecodeError;
use crate::response::GraphQLErrors;

/// Errors that can occur while executing a GraphQL operation.
///
/// Every variant is fatal for the call that produced it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GraphQLClientError {
    /// The transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The connection to the endpoint could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The call exceeded its deadline.
    #[error("Request timed out")]
    Timeout,

    /// The call was cancelled by the caller.
    #[error("Request was cancelled")]
    Cancelled,

    /// The server answered with a status other than `200 OK`.
    ///
    /// The body is kept verbatim and is never parsed as an envelope.
    #[error("non-200 OK status code: {status} body: {body:?}")]
    HttpStatus {
        /// The HTTP status.
        status: StatusCode,
        /// The raw response body.
        body: String,
    },

    /// The request envelope could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body is not a well-formed envelope.
    #[error("Failed to decode response envelope: {0}")]
    EnvelopeDecode(#[source] serde_json::Error),

    /// The `data` member did not fit the target type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The server reported one or more errors.
    ///
    /// `data` holds whatever the server returned alongside the errors. For
    /// decoding entry points it has already been written into the target.
    #[error("{errors}")]
    GraphQL {
        /// The reported errors, in response order.
        errors: GraphQLErrors,
        /// The `data` member of the same response, if present and non-null.
        data: Option<Value>,
    },

    /// A header name or value could not be used.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A query document could not be generated for a shaped request.
    #[error("Failed to build query: {0}")]
    QueryBuild(String),

    /// Client configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GraphQLClientError {
    /// Create a query-building error.
    pub fn query_build(message: impl Into<String>) -> Self {
        Self::QueryBuild(message.into())
    }

    /// The server-reported errors, if this is a [`GraphQLClientError::GraphQL`].
    pub fn graphql_errors(&self) -> Option<&GraphQLErrors> {
        match self {
            Self::GraphQL { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Check whether the call ended because of a deadline or cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Timeout | Self::Cancelled)
    }
}

impl From<reqwest::Error> for GraphQLClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for GraphQLClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for GraphQLClientError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for GraphQLClientError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLClientError>;
