//! HTTP transport abstraction.
//!
//! The client talks to the service through a [`Transport`], which sends
//! one request and returns the raw response without following redirects.
//! [`ReqwestTransport`] is the default implementation; tests substitute a
//! scripted one.

use std::fmt;

use url::Url;

use crate::error::FeedResult;

/// HTTP methods used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response as received, redirects included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Status code and reason, e.g. `404 Not Found`.
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, reason: &str, body: impl Into<String>) -> Self {
        Self {
            status,
            status_line: format!("{} {}", status, reason).trim_end().to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Sends single HTTP requests.
///
/// Implementations must not follow redirects: the request pipeline needs
/// to see `302` responses to pick up session ids.
pub trait Transport: fmt::Debug + Send + Sync {
    fn send(&self, request: &HttpRequest) -> FeedResult<HttpResponse>;
}

#[cfg(feature = "http")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "http")]
mod reqwest_transport {
    use reqwest::blocking::Client;
    use reqwest::redirect::Policy;
    use tracing::trace;

    use super::{HttpRequest, HttpResponse, Method, Transport};
    use crate::config::ClientConfig;
    use crate::error::{FeedError, FeedResult};

    /// Blocking transport backed by reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        /// Creates a transport with the timeout and user agent from `config`.
        pub fn new(config: &ClientConfig) -> FeedResult<Self> {
            let client = Client::builder()
                .timeout(config.timeout)
                .user_agent(&config.user_agent)
                .redirect(Policy::none())
                .build()
                .map_err(|e| {
                    FeedError::network(format!("Failed to create HTTP client: {}", e))
                        .with_source(e)
                })?;
            Ok(Self { client })
        }
    }

    impl Transport for ReqwestTransport {
        fn send(&self, request: &HttpRequest) -> FeedResult<HttpResponse> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, request.url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(ref body) = request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().map_err(|e| {
                FeedError::network(format!("Request failed: {}", e)).with_source(e)
            })?;

            let status = response.status();
            trace!(status = %status, "Received response");

            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
                })
                .collect();
            let body = response.text().map_err(|e| {
                FeedError::network(format!("Failed to read response: {}", e)).with_source(e)
            })?;

            Ok(HttpResponse {
                status: status.as_u16(),
                status_line: status.to_string(),
                headers,
                body,
            })
        }
    }
}
