//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core crate builds `HttpRequest`
//! values and interprets `HttpResponse` values; the bytes on the wire are the
//! business of a `Transport` implementation supplied by the caller.
//!
//! An `HttpRequest` is never mutated after it has been handed to a transport.
//! Adding a header or retargeting a request after a redirect produces a new
//! value.

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// UTF-8 JSON payload. `None` means a zero-length body.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON payload and the matching content type.
    pub fn with_json_body(self, body: impl Into<String>) -> Self {
        let mut req = self.with_header("content-type", "application/json");
        req.body = Some(body.into());
        req
    }

    /// Return a copy of this request with `name` set to `value`, replacing any
    /// existing header of the same name.
    pub fn with_header(&self, name: &str, value: impl Into<String>) -> Self {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(name))
            .cloned()
            .collect();
        headers.push((name.to_ascii_lowercase(), value.into()));
        Self {
            method: self.method,
            url: self.url.clone(),
            headers,
            body: self.body.clone(),
        }
    }

    /// Same method, headers and payload against a new target. `location` may
    /// be relative; it is resolved against the current URL.
    pub fn redirect_to(&self, location: &str) -> Result<Self, ApiError> {
        let base = url::Url::parse(&self.url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.url)))?;
        let target = base
            .join(location)
            .map_err(|e| ApiError::InvalidUrl(format!("{location}: {e}")))?;
        Ok(Self {
            method: self.method,
            url: target.to_string(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Number of body bytes the transport must send.
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, |b| b.len())
    }
}

/// An HTTP response described as plain data.
///
/// Transports read the body to the end before returning, so a response never
/// holds an open stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
