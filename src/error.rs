//! Error types for LINE Messaging API calls.
//!
//! Every error raised by a call carries the request path it was raised for,
//! together with either the structured error body returned by the platform
//! or a freeform diagnostic message.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Message used for every timed-out call.
pub const TIMEOUT_MESSAGE: &str = "Request Timeout";

/// Structured error body returned by the platform on non-2xx responses.
///
/// The schema is decoded on a best-effort basis: a body that does not
/// match it falls back to [`Error::Http`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable summary of the failure.
    pub message: String,

    /// Per-field detail entries, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

/// A single field-level entry of an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

/// The main error type for LINE Messaging API calls.
///
/// # Examples
///
/// ```no_run
/// use line_messaging::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("channel-access-token")?;
///
/// match client.get_profile("U4af4980629").await {
///     Ok(profile) => println!("Hello {}", profile.display_name),
///     Err(Error::Api { path, error, .. }) => {
///         eprintln!("{path} rejected: {}", error.message);
///         for detail in &error.details {
///             eprintln!("  {:?}: {:?}", detail.property, detail.message);
///         }
///     }
///     Err(e) if e.is_timeout() => eprintln!("timed out: {e}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A caller-supplied argument broke its contract. Raised before any network I/O.
    #[error("Invalid argument `{parameter}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// An image upload named a format other than jpeg or png. Raised before any network I/O.
    #[error("{path}: {format} is not supported.")]
    UnsupportedImageFormat {
        /// The request path
        path: String,
        /// The rejected format name
        format: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("{path}: Request Timeout")]
    Timeout {
        /// The request path
        path: String,
    },

    /// The call was aborted through the client's cancellation channel.
    #[error("{path}: Request Cancelled")]
    Cancelled {
        /// The request path
        path: String,
    },

    /// The platform answered with a non-2xx status and a decodable error body.
    #[error("{path}: {} (status {status})", .error.message)]
    Api {
        /// The request path
        path: String,
        /// The HTTP status code
        status: StatusCode,
        /// The decoded error body
        error: ErrorResponse,
    },

    /// The platform answered with a non-2xx status and a body that is not an
    /// [`ErrorResponse`].
    #[error("{path}: {message}")]
    Http {
        /// The request path
        path: String,
        /// The HTTP status code
        status: StatusCode,
        /// Synthesized message embedding the status code and reason phrase
        message: String,
    },

    /// A transport-level failure other than a timeout (DNS, TLS, connection reset, ...).
    #[error("{path}: Network error: {source}")]
    Network {
        /// The request path
        path: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The request body could not be encoded as JSON.
    #[error("{path}: Failed to serialize request: {source}")]
    SerializationFailed {
        /// The request path
        path: String,
        /// The serde error
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response body could not be decoded into the requested type.
    #[error("{path}: Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The request path
        path: String,
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid base URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the request path this error was raised for, if it came from a call.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::UnsupportedImageFormat { path, .. }
            | Error::Timeout { path }
            | Error::Cancelled { path }
            | Error::Api { path, .. }
            | Error::Http { path, .. }
            | Error::Network { path, .. }
            | Error::SerializationFailed { path, .. }
            | Error::DeserializationFailed { path, .. } => Some(path),
            Error::InvalidArgument { .. } | Error::ConfigurationError(_) | Error::InvalidUrl(_) => {
                None
            }
        }
    }

    /// Returns the message carried by this error, without the path prefix.
    ///
    /// For [`Error::Api`] this is the platform's own message.
    ///
    /// # Examples
    ///
    /// ```
    /// use line_messaging::Error;
    ///
    /// let err = Error::Timeout { path: "/v2/bot/message/push".to_string() };
    /// assert_eq!(err.message(), "Request Timeout");
    /// assert_eq!(err.path(), Some("/v2/bot/message/push"));
    /// ```
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Error::Timeout { .. } => Cow::Borrowed(TIMEOUT_MESSAGE),
            Error::Api { error, .. } => Cow::Borrowed(&error.message),
            Error::Http { message, .. } => Cow::Borrowed(message),
            Error::UnsupportedImageFormat { format, .. } => {
                Cow::Owned(format!("{format} is not supported."))
            }
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Returns the structured error body, if the platform sent a decodable one.
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. }
            | Error::Http { status, .. }
            | Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the call failed because it ran past the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns `true` for contract violations raised before any request was sent.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. } | Error::UnsupportedImageFormat { .. }
        )
    }

    pub(crate) fn invalid_argument(parameter: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            parameter,
            reason: reason.into(),
        }
    }

    /// Translates a transport failure, folding timeouts into [`Error::Timeout`].
    pub(crate) fn from_transport(path: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Error::Timeout {
                path: path.to_string(),
            }
        } else {
            Error::Network {
                path: path.to_string(),
                source,
            }
        }
    }

    /// Translates a non-2xx response body into an error.
    ///
    /// Falls back to a synthesized status/reason message when the body is not
    /// a decodable [`ErrorResponse`].
    pub(crate) fn from_status(path: &str, status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(error) => Error::Api {
                path: path.to_string(),
                status,
                error,
            },
            Err(_) => Error::Http {
                path: path.to_string(),
                status,
                message: format!(
                    "Error has occurred. Response StatusCode:{} ReasonPhrase:{}.",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                ),
            },
        }
    }
}

/// A specialized `Result` type for LINE Messaging API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_body_is_decoded() {
        let err = Error::from_status(
            "/v2/bot/message/reply",
            StatusCode::BAD_REQUEST,
            r#"{
                "message": "The request body has 1 error(s)",
                "details": [{"message": "May not be empty", "property": "messages[0].text"}]
            }"#,
        );

        let error = err.error_response().expect("structured body");
        assert_eq!(error.message, "The request body has 1 error(s)");
        assert_eq!(error.details.len(), 1);
        assert_eq!(error.details[0].property.as_deref(), Some("messages[0].text"));
        assert_eq!(err.path(), Some("/v2/bot/message/reply"));
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_missing_details_defaults_to_empty() {
        let err = Error::from_status(
            "/p",
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Authentication failed"}"#,
        );
        assert_eq!(err.message(), "Authentication failed");
        assert!(err.error_response().unwrap().details.is_empty());
    }

    #[test]
    fn test_undecodable_body_synthesizes_message() {
        let err = Error::from_status("/p", StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(err.error_response().is_none());
        assert_eq!(
            err.message(),
            "Error has occurred. Response StatusCode:502 ReasonPhrase:Bad Gateway."
        );

        // valid JSON, wrong shape
        let err = Error::from_status("/p", StatusCode::NOT_FOUND, "{}");
        assert!(matches!(err, Error::Http { .. }));
        assert!(err.message().contains("404"));
    }

    #[test]
    fn test_timeout_message_and_path() {
        let err = Error::Timeout {
            path: "/v2/bot/profile/U1".to_string(),
        };
        assert!(err.is_timeout());
        assert_eq!(err.message(), TIMEOUT_MESSAGE);
        assert_eq!(err.to_string(), "/v2/bot/profile/U1: Request Timeout");
    }

    #[test]
    fn test_contract_violations() {
        let err = Error::invalid_argument("message_id", "is empty");
        assert!(err.is_contract_violation());
        assert_eq!(err.path(), None);

        let err = Error::UnsupportedImageFormat {
            path: "/v2/bot/richmenu/r1/content".to_string(),
            format: "bmp".to_string(),
        };
        assert!(err.is_contract_violation());
        assert_eq!(err.message(), "bmp is not supported.");
    }
}
