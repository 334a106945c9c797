//! Query string and JSON body encoding.

use crate::{Error, Result};
use http::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;

/// Encodes query parameters into a query string.
///
/// Returns an empty string for an empty map, otherwise a string starting with
/// `?`. Keys and values are percent-encoded and emitted in key order.
///
/// # Examples
///
/// ```
/// use line_messaging::codec::encode_query;
/// use std::collections::BTreeMap;
///
/// assert_eq!(encode_query(&BTreeMap::new()), "");
///
/// let mut params = BTreeMap::new();
/// params.insert("start".to_string(), "next token".to_string());
/// assert_eq!(encode_query(&params), "?start=next%20token");
/// ```
pub fn encode_query(params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect();

    format!("?{}", pairs.join("&"))
}

/// Encodes a request body as JSON bytes.
pub fn encode_body<T: Serialize + ?Sized>(path: &str, body: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(|source| Error::SerializationFailed {
        path: path.to_string(),
        source,
    })
}

/// Decodes a JSON response body.
///
/// A body that does not match `T` is reported as
/// [`Error::DeserializationFailed`] with the raw text preserved; it never
/// falls back to a default value.
pub fn decode_body<T: DeserializeOwned>(path: &str, status: StatusCode, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::DeserializationFailed {
        path: path.to_string(),
        status,
        raw_response: raw.to_string(),
        serde_error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_empty_query_is_empty_string() {
        assert_eq!(encode_query(&BTreeMap::new()), "");
    }

    #[test]
    fn test_query_is_percent_encoded_and_ordered() {
        let mut params = BTreeMap::new();
        params.insert("b".to_string(), "2 x".to_string());
        params.insert("a".to_string(), "1".to_string());

        let query = encode_query(&params);
        assert!(query.starts_with('?'));
        assert_eq!(query, "?a=1&b=2%20x");
    }

    #[test]
    fn test_query_encodes_reserved_characters_in_keys() {
        let mut params = BTreeMap::new();
        params.insert("k&y".to_string(), "v=1/2".to_string());
        assert_eq!(encode_query(&params), "?k%26y=v%3D1%2F2");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Counter {
        x: i64,
    }

    #[test]
    fn test_decode_body() {
        let decoded: Counter = decode_body("/p", StatusCode::OK, r#"{"x":1}"#).unwrap();
        assert_eq!(decoded, Counter { x: 1 });
    }

    #[test]
    fn test_decode_failure_is_loud() {
        let err = decode_body::<Counter>("/p", StatusCode::OK, r#"{"y":1}"#).unwrap_err();
        match err {
            Error::DeserializationFailed {
                path,
                raw_response,
                serde_error,
                ..
            } => {
                assert_eq!(path, "/p");
                assert_eq!(raw_response, r#"{"y":1}"#);
                assert!(serde_error.contains("missing field"));
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_body() {
        let body = encode_body("/p", &serde_json::json!({"to": "U1"})).unwrap();
        assert_eq!(body, br#"{"to":"U1"}"#);
    }
}
