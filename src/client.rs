//! Request dispatcher for the LINE Messaging API.
//!
//! The [`Client`] type is the main entry point for making requests.
//! Use [`ClientBuilder`] to configure and create clients.
//!
//! Every dispatched call is a single attempt: a timeout, a transport failure,
//! or a non-2xx status is returned to the caller as an [`Error`] carrying the
//! request path. There is no retry.

use crate::{
    codec,
    credential::AccessToken,
    metadata::{Host, RequestBody, RequestMetadata},
    Error, Response, Result,
};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use url::Url;

/// Default base address of the JSON API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.line.me/";

/// Default base address of the content-serving endpoint.
pub const DEFAULT_DATA_BASE_URL: &str = "https://api-data.line.me/";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A LINE Messaging API client.
///
/// The client is cheap to clone and is meant to be reused: all clones share
/// one connection pool, one credential, and one configuration. Calls made
/// concurrently are independent and complete in no particular order.
///
/// # Examples
///
/// ```no_run
/// use line_messaging::{Client, Message};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), line_messaging::Error> {
/// let client = Client::builder()
///     .channel_access_token("channel-access-token")
///     .timeout(Duration::from_secs(5))
///     .build()?;
///
/// client
///     .push_message("U4af4980629", vec![Message::text("Hello, world")])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    api_base_url: Url,
    data_base_url: Url,
    access_token: AccessToken,
    authorization: HeaderValue,
    default_headers: HeaderMap,
    timeout: Duration,
    cancellation: Option<watch::Receiver<bool>>,
}

impl Client {
    /// Creates a client with default settings for the given channel access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the token is empty.
    pub fn new(channel_access_token: impl Into<String>) -> Result<Self> {
        Self::builder()
            .channel_access_token(channel_access_token)
            .build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The credential attached to every request.
    pub fn access_token(&self) -> &AccessToken {
        &self.inner.access_token
    }

    /// The per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Dispatches a request and decodes the JSON response body into `Res`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the call runs past the configured timeout
    /// - [`Error::Api`] / [`Error::Http`] on a non-2xx status
    /// - [`Error::DeserializationFailed`] if a 2xx body does not decode as `Res`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use line_messaging::{Client, metadata::RequestMetadata};
    /// use http::Method;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Quota { value: u64 }
    ///
    /// # async fn example() -> Result<(), line_messaging::Error> {
    /// let client = Client::new("channel-access-token")?;
    ///
    /// let metadata = RequestMetadata::new(Method::GET, "/v2/bot/message/quota");
    /// let quota = client.call::<Quota>(metadata).await?;
    /// println!("Monthly quota: {}", quota.value);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Res>(&self, metadata: RequestMetadata) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let path = metadata.path.clone();
        let response = self.call_text(metadata).await?;
        let data = codec::decode_body(&path, response.status, &response.data)?;
        Ok(response.map(|_| data))
    }

    /// Dispatches a request and returns the response body as text.
    pub async fn call_text(&self, metadata: RequestMetadata) -> Result<Response<String>> {
        let start_time = Instant::now();
        let response = self.dispatch(&metadata).await?;
        let status = response.status();
        let headers = response.headers().clone();

        let body = self
            .cancellable(&metadata.path, response.text())
            .await?
            .map_err(|e| Error::from_transport(&metadata.path, e))?;

        let latency = start_time.elapsed();
        tracing::debug!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            path = %metadata.path,
            "Received HTTP response"
        );

        Ok(Response::new(body, status, headers, latency))
    }

    /// Dispatches a request and returns the response body as raw bytes.
    pub async fn call_bytes(&self, metadata: RequestMetadata) -> Result<Response<Vec<u8>>> {
        let start_time = Instant::now();
        let response = self.dispatch(&metadata).await?;
        let status = response.status();
        let headers = response.headers().clone();

        let body = self
            .cancellable(&metadata.path, response.bytes())
            .await?
            .map_err(|e| Error::from_transport(&metadata.path, e))?;

        let latency = start_time.elapsed();
        tracing::debug!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            bytes = body.len(),
            path = %metadata.path,
            "Received HTTP response"
        );

        Ok(Response::new(body.to_vec(), status, headers, latency))
    }

    /// Sends the request and translates a non-2xx status into an error.
    pub(crate) async fn dispatch(&self, metadata: &RequestMetadata) -> Result<reqwest::Response> {
        let response = self.send(metadata).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw_response = self
            .cancellable(&metadata.path, response.text())
            .await?
            .map_err(|e| Error::from_transport(&metadata.path, e))?;
        Err(Error::from_status(&metadata.path, status, &raw_response))
    }

    /// Sends a single request without looking at the response status.
    async fn send(&self, metadata: &RequestMetadata) -> Result<reqwest::Response> {
        let base_url = match metadata.host {
            Host::Api => &self.inner.api_base_url,
            Host::Data => &self.inner.data_base_url,
        };
        let url = base_url.join(&metadata.path_and_query())?;

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            "Executing HTTP request"
        );

        let mut request = self
            .inner
            .http_client
            .request(metadata.method.clone(), url)
            .timeout(self.inner.timeout)
            .header(header::AUTHORIZATION, self.inner.authorization.clone());

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }

        for (name, value) in &metadata.headers {
            request = request.header(name, value);
        }

        match &metadata.body {
            RequestBody::None => {}
            RequestBody::Json(bytes) => {
                request = request
                    .header(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
                    .body(bytes.clone());
            }
            RequestBody::Image { format, bytes } => {
                request = request
                    .header(header::CONTENT_TYPE, format.content_type())
                    .body(bytes.clone());
            }
        }

        self.cancellable(&metadata.path, request.send())
            .await?
            .map_err(|e| Error::from_transport(&metadata.path, e))
    }

    /// Races `fut` against the cancellation channel, if one is configured.
    pub(crate) async fn cancellable<F>(&self, path: &str, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        let Some(cancellation) = &self.inner.cancellation else {
            return Ok(fut.await);
        };

        let mut cancellation = cancellation.clone();
        tokio::select! {
            output = fut => Ok(output),
            () = cancelled(&mut cancellation) => {
                tracing::debug!(path = %path, "Request cancelled");
                Err(Error::Cancelled { path: path.to_string() })
            }
        }
    }

    /// Makes a GET request to the API host.
    pub async fn get<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        self.call(RequestMetadata::new(Method::GET, path)).await
    }

    /// Makes a POST request with a JSON body to the API host.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use line_messaging::{Client, Message, PushMessage};
    ///
    /// # async fn example() -> Result<(), line_messaging::Error> {
    /// let client = Client::new("channel-access-token")?;
    ///
    /// let body = PushMessage {
    ///     to: "U4af4980629".to_string(),
    ///     messages: vec![Message::text("Hello")],
    /// };
    /// let sent: line_messaging::Response<serde_json::Value> =
    ///     client.post("/v2/bot/message/push", &body).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::POST, path).with_json(body)?;
        self.call(metadata).await
    }

    /// Makes a DELETE request to the API host.
    pub async fn delete<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        self.call(RequestMetadata::new(Method::DELETE, path)).await
    }

    /// Uploads raw image bytes to the API host.
    ///
    /// `format` must be `"jpeg"` or `"png"`; anything else fails with
    /// [`Error::UnsupportedImageFormat`] before a request is sent.
    pub async fn post_image(
        &self,
        path: impl Into<String>,
        format: &str,
        image: Vec<u8>,
    ) -> Result<Response<String>> {
        let metadata = RequestMetadata::new(Method::POST, path).with_image(format, image)?;
        self.call_text(metadata).await
    }
}

/// Resolves once the watched flag is `true`. Never resolves if the sender is gone.
async fn cancelled(cancellation: &mut watch::Receiver<bool>) {
    if cancellation.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use line_messaging::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), line_messaging::Error> {
/// let (cancel, cancellation) = tokio::sync::watch::channel(false);
///
/// let client = ClientBuilder::new()
///     .channel_access_token("channel-access-token")
///     .timeout(Duration::from_secs(30))
///     .cancellation(cancellation)
///     .default_header("User-Agent", "my-bot/1.0")?
///     .build()?;
///
/// // Later: abort every in-flight call.
/// let _ = cancel.send(true);
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    channel_access_token: Option<String>,
    api_base_url: Option<Url>,
    data_base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Duration,
    cancellation: Option<watch::Receiver<bool>>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            channel_access_token: None,
            api_base_url: None,
            data_base_url: None,
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            cancellation: None,
            http_client: None,
        }
    }

    /// Sets the channel access token. Required.
    pub fn channel_access_token(mut self, token: impl Into<String>) -> Self {
        self.channel_access_token = Some(token.into());
        self
    }

    /// Overrides the JSON API base address.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn api_base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.api_base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Overrides the content-serving base address.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn data_base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.data_base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-call timeout. Defaults to [`DEFAULT_TIMEOUT`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Aborts in-flight calls with [`Error::Cancelled`] once the watched value becomes `true`.
    pub fn cancellation(mut self, cancellation: watch::Receiver<bool>) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Uses an existing `reqwest::Client` as the transport.
    ///
    /// The configured timeout is still applied to every call.
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no (or an empty) channel access token was provided,
    /// if the timeout is zero, or if the transport cannot be built.
    pub fn build(self) -> Result<Client> {
        let access_token = AccessToken::new(self.channel_access_token.unwrap_or_default())?;
        let authorization = access_token.header_value()?;

        if self.timeout.is_zero() {
            return Err(Error::ConfigurationError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let api_base_url = match self.api_base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_API_BASE_URL)?,
        };
        let data_base_url = match self.data_base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_DATA_BASE_URL)?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                api_base_url,
                data_base_url,
                access_token,
                authorization,
                default_headers: self.default_headers,
                timeout: self.timeout,
                cancellation: self.cancellation,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_token() {
        let err = Client::builder().build().err().expect("missing token");
        assert!(matches!(
            err,
            Error::InvalidArgument {
                parameter: "channel_access_token",
                ..
            }
        ));
        assert!(Client::new("").is_err());
    }

    #[test]
    fn test_defaults() {
        let client = Client::new("token").unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.timeout(), Duration::from_secs(10));
        assert_eq!(client.inner.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(client.inner.data_base_url.as_str(), DEFAULT_DATA_BASE_URL);
        assert_eq!(client.access_token().expose(), "token");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = Client::builder()
            .channel_access_token("token")
            .timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Client::builder().api_base_url("not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_cancellable_passes_through_without_channel() {
        let client = Client::new("token").unwrap();
        let value = client.cancellable("/p", async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancellable_aborts_when_flag_set() {
        let (cancel, cancellation) = watch::channel(false);
        let client = Client::builder()
            .channel_access_token("token")
            .cancellation(cancellation)
            .build()
            .unwrap();

        cancel.send(true).unwrap();
        let result = client
            .cancellable("/v2/bot/info", std::future::pending::<()>())
            .await;
        assert!(matches!(result, Err(Error::Cancelled { ref path }) if path == "/v2/bot/info"));
    }

    #[tokio::test]
    async fn test_cancellable_ignores_dropped_sender() {
        let (cancel, cancellation) = watch::channel(false);
        drop(cancel);
        let client = Client::builder()
            .channel_access_token("token")
            .cancellation(cancellation)
            .build()
            .unwrap();

        let value = client.cancellable("/p", async { "done" }).await.unwrap();
        assert_eq!(value, "done");
    }
}
