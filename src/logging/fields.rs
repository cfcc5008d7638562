//! Field extraction helpers for request logging

use axum::http::{header, HeaderMap, Request};
use serde::Serialize;
use serde_json::{Map, Value};

/// Maximum length of header-derived values kept in a log entry
pub(crate) const MAX_HEADER_VALUE_LEN: usize = 256;

/// Standard fields derived from an inbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestFields {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl RequestFields {
    /// Extract method, path and common headers from a request
    ///
    /// # Examples
    ///
    /// ```
    /// use axum::http::Request;
    /// use ctxlog::logging::RequestFields;
    ///
    /// let request = Request::builder()
    ///     .method("GET")
    ///     .uri("/items?limit=5")
    ///     .header("user-agent", "curl/8.0")
    ///     .body(())
    ///     .unwrap();
    ///
    /// let fields = RequestFields::from_request(&request);
    /// assert_eq!(fields.method, "GET");
    /// assert_eq!(fields.path, "/items");
    /// assert_eq!(fields.query.as_deref(), Some("limit=5"));
    /// assert_eq!(fields.user_agent.as_deref(), Some("curl/8.0"));
    /// ```
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request.uri();
        let host = uri
            .host()
            .map(str::to_string)
            .or_else(|| header_value(request.headers(), header::HOST));

        Self {
            method: request.method().as_str().to_string(),
            path: uri.path().to_string(),
            query: uri.query().filter(|q| !q.is_empty()).map(str::to_string),
            host,
            user_agent: header_value(request.headers(), header::USER_AGENT),
        }
    }

    /// Convert into a structured field map, omitting absent values
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("method".to_string(), Value::String(self.method));
        map.insert("path".to_string(), Value::String(self.path));
        if let Some(query) = self.query {
            map.insert("query".to_string(), Value::String(query));
        }
        if let Some(host) = self.host {
            map.insert("host".to_string(), Value::String(host));
        }
        if let Some(user_agent) = self.user_agent {
            map.insert("user_agent".to_string(), Value::String(user_agent));
        }
        map
    }
}

/// Read a header as text, dropping values that are not visible ASCII
fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| truncate_string(v, MAX_HEADER_VALUE_LEN))
}

/// Helper function to truncate a string to a maximum length
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    format!("{}...", clip(s, max_len))
}

/// Longest prefix of `s` that fits in `max_len` bytes without splitting a char.
pub(crate) fn clip(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
