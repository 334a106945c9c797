//! Channel access token used to authenticate every request.

use crate::{Error, Result};
use http::HeaderValue;
use std::fmt;

/// An opaque, non-empty bearer token.
///
/// The token is fixed for the lifetime of a [`Client`](crate::Client) and its
/// value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a channel access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the token is empty or only whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use line_messaging::AccessToken;
    ///
    /// assert!(AccessToken::new("secret").is_ok());
    /// assert!(AccessToken::new("").is_err());
    /// ```
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::invalid_argument(
                "channel_access_token",
                "is null or empty",
            ));
        }
        Ok(Self(token))
    }

    /// Returns the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Renders the `Authorization` header value, marked sensitive.
    pub(crate) fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::try_from(format!("Bearer {}", self.0)).map_err(|_| {
            Error::invalid_argument("channel_access_token", "contains invalid header characters")
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
