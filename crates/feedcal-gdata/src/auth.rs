//! Authentication state.
//!
//! Two modes are supported and exactly one is active at a time:
//! credential exchange ([`AuthSession::login`]), which trades a username
//! and password for a token, and delegated tokens ([`AuthSession::auth`]),
//! which are obtained out of band and stored as-is.

use std::fmt;

use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::error::{FeedError, FeedResult};
use crate::transport::{HttpRequest, Method, Transport};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// How the stored token was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    /// Credential exchange.
    ClientLogin,
    /// Delegated token.
    AuthSub,
}

impl AuthKind {
    /// Authorization scheme and parameter name.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::ClientLogin => "GoogleLogin auth",
            Self::AuthSub => "AuthSub token",
        }
    }
}

/// Overrides for the protocol parameters sent on login.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    pub service: Option<String>,
    pub source: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Clone)]
struct Credential {
    token: String,
    kind: AuthKind,
}

/// Current credential of a client.
#[derive(Clone, Default)]
pub struct AuthSession {
    username: Option<String>,
    credential: Option<Credential>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("username", &self.username)
            .field("kind", &self.kind())
            .field("token", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchanges a username and password for a token.
    ///
    /// On failure the session is left exactly as it was.
    pub fn login(
        &mut self,
        transport: &dyn Transport,
        config: &ClientConfig,
        username: &str,
        password: &str,
        options: &LoginOptions,
    ) -> FeedResult<()> {
        let url = config.parsed_login_url()?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("Email", username)
            .append_pair("Passwd", password)
            .append_pair(
                "service",
                options.service.as_deref().unwrap_or(&config.service),
            )
            .append_pair("source", options.source.as_deref().unwrap_or(&config.source))
            .append_pair(
                "accountType",
                options
                    .account_type
                    .as_deref()
                    .unwrap_or(&config.account_type),
            )
            .finish();

        debug!(url = %url, user = %username, "Exchanging credentials");
        let request = HttpRequest::new(Method::Post, url)
            .with_header("Content-Type", FORM_CONTENT_TYPE)
            .with_body(body);
        let response = transport.send(&request)?;

        if !response.is_success() {
            warn!(status = response.status, user = %username, "Login rejected");
            let reason = response_field(&response.body, "Error")
                .map(|e| format!(" ({})", e))
                .unwrap_or_default();
            return Err(FeedError::authentication(format!(
                "login failed: {}{}",
                response.status_line, reason
            )));
        }

        let token = response_field(&response.body, "Auth").ok_or_else(|| {
            FeedError::authentication("login response did not contain an Auth token")
        })?;

        self.username = Some(username.to_string());
        self.credential = Some(Credential {
            token,
            kind: AuthKind::ClientLogin,
        });
        info!(user = %username, "Logged in");
        Ok(())
    }

    /// Stores a delegated token without contacting the service.
    pub fn auth(&mut self, username: impl Into<String>, token: impl Into<String>) {
        self.username = Some(username.into());
        self.credential = Some(Credential {
            token: token.into(),
            kind: AuthKind::AuthSub,
        });
    }

    /// Forgets the stored credential.
    pub fn clear(&mut self) {
        self.username = None;
        self.credential = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn kind(&self) -> Option<AuthKind> {
        self.credential.as_ref().map(|c| c.kind)
    }

    /// Value for the `Authorization` header, if a credential is stored.
    pub fn authorization_header_value(&self) -> Option<String> {
        self.credential
            .as_ref()
            .map(|c| format!("{}={}", c.kind.scheme(), c.token))
    }
}

/// Reads a `Key=value` line from a login response body.
fn response_field(body: &str, key: &str) -> Option<String> {
    body.lines()
        .filter_map(|line| line.trim().split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
