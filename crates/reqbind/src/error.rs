//! Binding error types.
//!
//! Every error records the [`Source`] it was raised for, so callers can map
//! failures to a response without inspecting messages.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Part of the request a value is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Path variables supplied by the router
    Path,
    /// HTTP headers
    Header,
    /// Query string parameters
    Query,
    /// Url-encoded or multipart form fields
    Form,
    /// Structured request body (JSON, XML)
    Body,
    /// The `Content-Type` header itself
    ContentType,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Header => write!(f, "header"),
            Self::Query => write!(f, "query"),
            Self::Form => write!(f, "form"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// A raw string that could not be converted into the target field type.
///
/// Produced by [`FromValues`](crate::FromValues) implementations; the binder
/// attaches the source and field name to turn it into a [`BindError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {value:?}: {reason}")]
pub struct ValueError {
    /// The offending raw value.
    pub value: String,
    /// Why the conversion failed.
    pub reason: String,
}

impl ValueError {
    /// Creates a conversion error for `value`.
    #[must_use]
    pub fn new(value: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error returned when request data cannot be bound.
///
/// # Example
///
/// ```rust
/// use reqbind::{BindError, Source, ValueError};
/// use http::StatusCode;
///
/// let err = BindError::invalid_value(Source::Path, "id", ValueError::new("abc", "invalid digit"));
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.source_kind(), Source::Path);
/// assert_eq!(err.field(), Some("id"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    /// A raw value could not be converted into the field's type.
    #[error("invalid {location} parameter '{field}': cannot parse {value:?}: {reason}")]
    InvalidValue {
        /// Where the value came from.
        location: Source,
        /// Tag name of the field.
        field: String,
        /// The raw value.
        value: String,
        /// Conversion failure detail.
        reason: String,
    },

    /// A decoder (JSON, XML, url-encoded, multipart) rejected the input.
    #[error("failed to decode {location}: {message}")]
    Decode {
        /// What was being decoded.
        location: Source,
        /// Decoder message.
        message: String,
    },

    /// The body exceeds the configured limit.
    #[error("payload too large: max {limit} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes.
        limit: usize,
        /// Actual body length.
        actual: usize,
    },

    /// The `Content-Type` header could not be parsed.
    #[error("invalid content type: {value:?}")]
    InvalidContentType {
        /// Raw header value.
        value: String,
    },

    /// A multipart body carries more parts than allowed.
    #[error("too many multipart fields: max {limit}")]
    TooManyFields {
        /// Configured part limit.
        limit: usize,
    },
}

impl BindError {
    /// Wraps a conversion failure for `field`.
    #[must_use]
    pub fn invalid_value(source: Source, field: impl Into<String>, err: ValueError) -> Self {
        Self::InvalidValue {
            location: source,
            field: field.into(),
            value: err.value,
            reason: err.reason,
        }
    }

    /// Creates a decoding failure.
    #[must_use]
    pub fn decode(source: Source, message: impl fmt::Display) -> Self {
        Self::Decode {
            location: source,
            message: message.to_string(),
        }
    }

    /// Returns the request part the error relates to.
    #[must_use]
    pub fn source_kind(&self) -> Source {
        match self {
            Self::InvalidValue { location, .. } | Self::Decode { location, .. } => *location,
            Self::PayloadTooLarge { .. } | Self::TooManyFields { .. } => Source::Body,
            Self::InvalidContentType { .. } => Source::ContentType,
        }
    }

    /// Returns the tag name of the failing field, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns the HTTP status code that best describes this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidValue { .. } | Self::Decode { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } | Self::TooManyFields { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::InvalidContentType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "INVALID_PARAMETER",
            Self::Decode { .. } => "DESERIALIZATION_FAILED",
            Self::PayloadTooLarge { .. } | Self::TooManyFields { .. } => "PAYLOAD_TOO_LARGE",
            Self::InvalidContentType { .. } => "UNSUPPORTED_MEDIA_TYPE",
        }
    }
}
