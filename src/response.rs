//! Response wrapper that keeps the decoded data alongside transaction details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful (2xx) response.
///
/// # Examples
///
/// ```no_run
/// use line_messaging::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct BotInfo {
///     #[serde(rename = "displayName")]
///     display_name: String,
/// }
///
/// # async fn example() -> Result<(), line_messaging::Error> {
/// let client = Client::new("channel-access-token")?;
///
/// let response = client.get::<BotInfo>("/v2/bot/info").await?;
/// println!("Bot: {}", response.data.display_name);
/// println!("Request took {:?}", response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response data.
    pub data: T,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(data: T, status: StatusCode, headers: HeaderMap, latency: Duration) -> Self {
        Self {
            data,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use line_messaging::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     vec![1u8, 2, 3],
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let len = response.map(|bytes| bytes.len());
    /// assert_eq!(len.data, 3);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Consumes the response and returns the data.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use line_messaging::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-line-request-id", HeaderValue::from_static("f70dd685"));
    ///
    /// let response = Response::new((), StatusCode::OK, headers, Duration::ZERO);
    /// assert_eq!(response.header("x-line-request-id"), Some("f70dd685"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
