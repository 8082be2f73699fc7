//! Authenticated request execution.
//!
//! The pipeline attaches credentials and the session id to each request,
//! follows the service's `302` redirects (caching the `gsessionid` they
//! carry), and turns responses into entries or errors.

use std::sync::Arc;

use tracing::{debug, trace, warn};
use url::Url;

use crate::atom::ATOM_CONTENT_TYPE;
use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::entry::Entry;
use crate::error::{FeedError, FeedResult};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// Query parameter carrying the session affinity token.
pub const SESSION_PARAM: &str = "gsessionid";
/// Header that tunnels PUT and DELETE through POST.
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

const HTTP_FOUND: u16 = 302;

/// The write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteVerb {
    /// Create.
    Post,
    /// Update.
    Put,
    /// Delete.
    Delete,
}

impl WriteVerb {
    fn method(&self) -> Method {
        match self {
            Self::Post => Method::Post,
            Self::Put => Method::Put,
            Self::Delete => Method::Delete,
        }
    }
}

/// Executes requests for one client.
#[derive(Debug)]
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    session_id: Option<String>,
    session_affinity: bool,
    max_redirects: u32,
    method_override: bool,
}

impl RequestPipeline {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            session_id: None,
            session_affinity: config.session_affinity,
            max_redirects: config.max_redirects,
            method_override: config.method_override,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The cached session affinity token.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Enables or disables session affinity; disabling drops the cached id.
    pub fn set_session_affinity(&mut self, enabled: bool) {
        self.session_affinity = enabled;
        if !enabled {
            self.session_id = None;
        }
    }

    /// Sends `entry` to `url` with the given verb.
    ///
    /// A response body is parsed into a new entry and returned; with
    /// `in_place` set, `entry` is also replaced by it. An empty response body
    /// (the usual answer to a delete) returns `entry` unchanged. `entry` is
    /// never touched when the operation fails.
    pub fn write(
        &mut self,
        auth: &AuthSession,
        entry: &mut Entry,
        url: &Url,
        verb: WriteVerb,
        in_place: bool,
    ) -> FeedResult<Entry> {
        let authorization = auth.authorization_header_value().ok_or_else(|| {
            FeedError::not_authenticated("writing requires a login or a token")
        })?;

        let body = match verb {
            WriteVerb::Delete => None,
            WriteVerb::Post | WriteVerb::Put => Some(entry.to_xml()?),
        };

        let mut headers = vec![("Authorization".to_string(), authorization)];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), ATOM_CONTENT_TYPE.to_string()));
        }
        let method = match verb {
            WriteVerb::Post => Method::Post,
            WriteVerb::Put | WriteVerb::Delete if self.method_override => {
                headers.push((
                    METHOD_OVERRIDE_HEADER.to_string(),
                    verb.method().as_str().to_string(),
                ));
                Method::Post
            }
            WriteVerb::Put | WriteVerb::Delete => verb.method(),
        };

        let response = self.execute(method, url, &headers, body.as_deref())?;
        if response.body.trim().is_empty() {
            return Ok(entry.clone());
        }

        let fresh = Entry::parse(&response.body)?
            .with_recurrence_codec(entry.recurrence_codec().cloned());
        if in_place {
            *entry = fresh.clone();
        }
        Ok(fresh)
    }

    /// Fetches `url`, attaching credentials when available.
    pub fn read(&mut self, auth: &AuthSession, url: &Url) -> FeedResult<String> {
        let headers: Vec<(String, String)> = auth
            .authorization_header_value()
            .map(|v| ("Authorization".to_string(), v))
            .into_iter()
            .collect();
        self.execute(Method::Get, url, &headers, None)
            .map(|response| response.body)
    }

    fn execute(
        &mut self,
        method: Method,
        url: &Url,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> FeedResult<HttpResponse> {
        let mut target = url.clone();
        let mut redirects = 0;

        loop {
            let request = HttpRequest {
                method,
                url: self.attach_session(&target),
                headers: headers.to_vec(),
                body: body.map(str::to_string),
            };
            debug!(method = %method, url = %request.url, "Sending request");

            let response = self.transport.send(&request)?;
            trace!(status = response.status, "Received response");

            if response.is_success() {
                return Ok(response);
            }
            if response.status != HTTP_FOUND {
                warn!(status = response.status, url = %request.url, "Request failed");
                return Err(FeedError::request_failed(
                    response.status,
                    &response.status_line,
                    response.body,
                ));
            }

            if redirects >= self.max_redirects {
                warn!(max = self.max_redirects, "Giving up after repeated redirects");
                return Err(FeedError::request_failed(
                    response.status,
                    &format!("too many redirects ({} followed)", redirects),
                    response.body,
                ));
            }
            redirects += 1;

            let location = response.header("Location").ok_or_else(|| {
                FeedError::invalid_response("redirect response has no Location header")
            })?;
            let next = target.join(location).map_err(|e| {
                FeedError::invalid_response(format!("invalid redirect location {:?}: {}", location, e))
            })?;

            match session_id_of(&next) {
                Some(id) if self.session_affinity => {
                    debug!(redirects, "Following redirect with new session id");
                    self.session_id = Some(id);
                }
                Some(_) => debug!(redirects, "Following redirect"),
                None => warn!(location = %next, "Redirect without a session id"),
            }
            target = next;
        }
    }

    fn attach_session(&self, url: &Url) -> Url {
        match self.session_id {
            Some(ref id) if self.session_affinity => with_query_param(url, SESSION_PARAM, id),
            _ => url.clone(),
        }
    }
}

fn session_id_of(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == SESSION_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Returns `url` with `key` set to `value`, replacing earlier values.
fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    out.set_query(None);
    out.query_pairs_mut()
        .extend_pairs(kept)
        .append_pair(key, value);
    out
}
