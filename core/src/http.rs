//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and parses `HttpResponse` values; executing the
//! round-trip is the job of a `Transport`. The constructors on `HttpRequest`
//! act as the request factory: every request they produce already carries the
//! credentials held by the `Config`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::config::Config;
use crate::error::AclError;

pub const ADMIN_TOKEN_HEADER: &str = "Kong-Admin-Token";
pub const API_KEY_HEADER: &str = "apikey";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, including any query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(config: &Config, url: String) -> Self {
        Self::with_config(HttpMethod::Get, config, url)
    }

    pub fn post(config: &Config, url: String) -> Self {
        Self::with_config(HttpMethod::Post, config, url)
    }

    pub fn patch(config: &Config, url: String) -> Self {
        Self::with_config(HttpMethod::Patch, config, url)
    }

    pub fn delete(config: &Config, url: String) -> Self {
        Self::with_config(HttpMethod::Delete, config, url)
    }

    fn with_config(method: HttpMethod, config: &Config, url: String) -> Self {
        let mut headers = Vec::new();
        if let Some(username) = &config.username {
            let password = config.password.as_deref().unwrap_or_default();
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            headers.push(("authorization".to_string(), format!("Basic {encoded}")));
        }
        if let Some(key) = &config.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        if let Some(token) = &config.admin_token {
            headers.push((ADMIN_TOKEN_HEADER.to_string(), token.clone()));
        }
        Self {
            method,
            path: url,
            headers,
            body: None,
        }
    }

    /// Serialize `payload` as the request body and mark it as JSON.
    pub fn with_json_body<T: Serialize>(mut self, payload: &T) -> Result<Self, AclError> {
        let body = serde_json::to_string(payload)?;
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        Ok(self)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Append `filter` to `url` as a query string.
///
/// `None` leaves the url untouched. Fields the filter skips when serializing
/// are omitted, so an empty filter produces no `?` at all. Keys come out in
/// struct field order, not sorted; the gateway does not care about order.
pub fn add_query_string<T: Serialize>(url: &str, filter: Option<&T>) -> Result<String, AclError> {
    let Some(filter) = filter else {
        return Ok(url.to_string());
    };
    let query = serde_urlencoded::to_string(filter)?;
    if query.is_empty() {
        return Ok(url.to_string());
    }
    Ok(format!("{url}?{query}"))
}
