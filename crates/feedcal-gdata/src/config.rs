//! Calendar client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{FeedError, FeedResult};

/// Configuration for [`CalendarClient`](crate::CalendarClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the calendar feeds; feed URLs are `<base>/<calendar>/<visibility>/<projection>`.
    pub feeds_base: String,

    /// Credential exchange endpoint.
    pub login_url: String,

    /// Service identifier sent on login.
    pub service: String,

    /// Client identification sent on login.
    pub source: String,

    /// Account type sent on login.
    pub account_type: String,

    /// Feed to use instead of the one derived on login.
    pub feed_url: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Redirects followed per operation before giving up.
    pub max_redirects: u32,

    /// Whether successful writes replace the caller's entry with the response.
    pub in_place: bool,

    /// Whether the session id from redirects is attached to later requests.
    pub session_affinity: bool,

    /// Whether PUT and DELETE are sent as POST with `X-HTTP-Method-Override`.
    pub method_override: bool,
}

impl ClientConfig {
    pub const DEFAULT_FEEDS_BASE: &'static str = "https://www.google.com/calendar/feeds";
    pub const DEFAULT_LOGIN_URL: &'static str = "https://www.google.com/accounts/ClientLogin";
    pub const DEFAULT_SERVICE: &'static str = "cl";
    pub const DEFAULT_ACCOUNT_TYPE: &'static str = "HOSTED_OR_GOOGLE";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

    /// Creates a configuration pointing at the public service.
    pub fn new() -> Self {
        Self {
            feeds_base: Self::DEFAULT_FEEDS_BASE.to_string(),
            login_url: Self::DEFAULT_LOGIN_URL.to_string(),
            service: Self::DEFAULT_SERVICE.to_string(),
            source: format!("feedcal-{}", env!("CARGO_PKG_VERSION")),
            account_type: Self::DEFAULT_ACCOUNT_TYPE.to_string(),
            feed_url: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("feedcal/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: Self::DEFAULT_MAX_REDIRECTS,
            in_place: true,
            session_affinity: true,
            method_override: true,
        }
    }

    pub fn with_feeds_base(mut self, base: impl Into<String>) -> Self {
        self.feeds_base = base.into();
        self
    }

    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = account_type.into();
        self
    }

    /// Sets the active feed up front.
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }

    /// Controls whether writes mutate the caller's entry.
    pub fn with_in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    pub fn with_session_affinity(mut self, enabled: bool) -> Self {
        self.session_affinity = enabled;
        self
    }

    /// Sends PUT and DELETE as themselves instead of tunnelling them through POST.
    pub fn with_native_verbs(mut self) -> Self {
        self.method_override = false;
        self
    }

    /// Checks that every configured URL parses.
    pub fn validate(&self) -> FeedResult<()> {
        self.parsed_feeds_base()?;
        self.parsed_login_url()?;
        self.parsed_feed_url()?;
        Ok(())
    }

    pub(crate) fn parsed_feeds_base(&self) -> FeedResult<Url> {
        parse_url("feeds base", &self.feeds_base)
    }

    pub(crate) fn parsed_login_url(&self) -> FeedResult<Url> {
        parse_url("login URL", &self.login_url)
    }

    pub(crate) fn parsed_feed_url(&self) -> FeedResult<Option<Url>> {
        self.feed_url
            .as_deref()
            .map(|u| parse_url("feed URL", u))
            .transpose()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_url(what: &str, value: &str) -> FeedResult<Url> {
    Url::parse(value).map_err(|e| {
        FeedError::configuration(format!("invalid {} {:?}: {}", what, value, e)).with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedErrorCode;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.service, "cl");
        assert_eq!(config.account_type, "HOSTED_OR_GOOGLE");
        assert!(config.source.starts_with("feedcal-"));
        assert_eq!(config.max_redirects, 5);
        assert!(config.in_place);
        assert!(config.session_affinity);
        assert!(config.method_override);
        assert!(config.parsed_feed_url().unwrap().is_none());
        assert_eq!(
            config.parsed_feeds_base().unwrap().as_str(),
            "https://www.google.com/calendar/feeds"
        );
    }

    #[test]
    fn builder_methods() {
        let config = ClientConfig::new()
            .with_feeds_base("https://calendar.example.com/feeds")
            .with_service("cal")
            .with_max_redirects(2)
            .with_in_place(false)
            .with_session_affinity(false)
            .with_native_verbs()
            .with_timeout(Duration::from_secs(5))
            .with_feed_url("https://calendar.example.com/feeds/jo/private/full");

        assert_eq!(config.service, "cal");
        assert_eq!(config.max_redirects, 2);
        assert!(!config.in_place);
        assert!(!config.session_affinity);
        assert!(!config.method_override);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.parsed_feed_url().unwrap().is_some());
    }

    #[test]
    fn invalid_urls_are_configuration_errors() {
        let config = ClientConfig::new().with_feeds_base("not a url");
        let err = config.parsed_feeds_base().unwrap_err();
        assert_eq!(err.code(), FeedErrorCode::ConfigurationError);
        assert!(err.message().contains("feeds base"));

        let config = ClientConfig::new().with_feed_url("::nope");
        assert!(config.validate().is_err());
        assert!(ClientConfig::new().validate().is_ok());
    }
}
