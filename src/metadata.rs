//! Request metadata: everything needed to dispatch a single call.

use crate::codec;
use crate::content::ImageFormat;
use crate::Result;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which of the two platform hosts a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Host {
    /// The JSON API host (`api.line.me`).
    #[default]
    Api,
    /// The content-serving host (`api-data.line.me`).
    Data,
}

/// The body attached to a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    None,
    /// Pre-encoded JSON, sent as `application/json; charset=utf-8`.
    Json(Vec<u8>),
    /// Raw image bytes, sent with the format's own content type.
    Image { format: ImageFormat, bytes: Vec<u8> },
}

/// Metadata for an individual request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method.
    pub method: Method,

    /// The request path, also used to identify the call in errors.
    pub path: String,

    /// The host the path is resolved against.
    pub host: Host,

    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Query parameters, encoded in key order.
    pub query_params: BTreeMap<String, String>,

    /// The request body.
    pub body: RequestBody,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` for the API host with no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            host: Host::Api,
            headers: HeaderMap::new(),
            query_params: BTreeMap::new(),
            body: RequestBody::None,
        }
    }

    /// Targets the content-serving host instead of the API host.
    pub fn on_data_host(mut self) -> Self {
        self.host = Host::Data;
        self
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.insert(key.into(), value.to_string());
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SerializationFailed`] if `body` cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(codec::encode_body(&self.path, body)?);
        Ok(self)
    }

    /// Attaches a raw image body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedImageFormat`] unless `format` is
    /// `"jpeg"` or `"png"`.
    pub fn with_image(mut self, format: &str, bytes: Vec<u8>) -> Result<Self> {
        let format = ImageFormat::for_path(&self.path, format)?;
        self.body = RequestBody::Image { format, bytes };
        Ok(self)
    }

    /// Returns the path with its encoded query string appended.
    pub fn path_and_query(&self) -> String {
        format!("{}{}", self.path, codec::encode_query(&self.query_params))
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_path_and_query() {
        let metadata = RequestMetadata::new(Method::GET, "/v2/bot/group/G1/members/ids")
            .with_query_param("start", "abc def");
        assert_eq!(
            metadata.path_and_query(),
            "/v2/bot/group/G1/members/ids?start=abc%20def"
        );

        let metadata = RequestMetadata::new(Method::GET, "/v2/bot/info");
        assert_eq!(metadata.path_and_query(), "/v2/bot/info");
    }

    #[test]
    fn test_with_json_encodes_body() {
        let metadata = RequestMetadata::new(Method::POST, "/p")
            .with_json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(metadata.body, RequestBody::Json(br#"{"a":1}"#.to_vec()));
    }

    #[test]
    fn test_with_image_rejects_unsupported_format() {
        let err = RequestMetadata::new(Method::POST, "/v2/bot/richmenu/r1/content")
            .with_image("bmp", vec![0x42, 0x4d])
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedImageFormat { .. }));
        assert_eq!(err.path(), Some("/v2/bot/richmenu/r1/content"));
    }

    #[test]
    fn test_data_host() {
        let metadata = RequestMetadata::new(Method::GET, "/p");
        assert_eq!(metadata.host, Host::Api);
        assert_eq!(metadata.on_data_host().host, Host::Data);
    }
}
