//! The calendar client.
//!
//! [`CalendarClient`] ties authentication, query encoding and the request
//! pipeline together. It always has at most one active feed: the calendar
//! that `list`, `get` and `add` work on. Updates and deletes go to the
//! entry's own edit link, whichever calendar is active.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};
use url::Url;

use crate::auth::{AuthSession, LoginOptions};
use crate::calendar::CalendarEntry;
use crate::config::ClientConfig;
use crate::entry::Entry;
use crate::error::{FeedError, FeedResult};
use crate::feed::Feed;
use crate::pipeline::{RequestPipeline, WriteVerb};
use crate::query::Query;
use crate::recurrence::{self, RecurrenceCodec};
use crate::transport::Transport;

/// Matches the `private-<key>` visibility of read-only feed addresses.
static PRIVATE_KEY_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/private-[^/]+/").expect("Invalid private feed regex"));

const VISIBILITY_PRIVATE: &str = "private";
const PROJECTION_FULL: &str = "full";
const DEFAULT_USER: &str = "default";

/// A client for one user's calendars.
#[derive(Debug)]
pub struct CalendarClient {
    config: ClientConfig,
    auth: AuthSession,
    pipeline: RequestPipeline,
    feeds_base: Url,
    feed_url: Option<Url>,
    in_place: bool,
    codec: Option<Arc<dyn RecurrenceCodec>>,
}

impl CalendarClient {
    /// Creates a client that talks HTTP(S) through reqwest.
    #[cfg(feature = "http")]
    pub fn new(config: ClientConfig) -> FeedResult<Self> {
        let transport = Arc::new(crate::transport::ReqwestTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Creates a client on top of the given transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> FeedResult<Self> {
        let feeds_base = config.parsed_feeds_base()?;
        let feed_url = config.parsed_feed_url()?;
        config.parsed_login_url()?;

        Ok(Self {
            pipeline: RequestPipeline::new(transport, &config),
            in_place: config.in_place,
            auth: AuthSession::new(),
            codec: recurrence::default_codec(),
            feeds_base,
            feed_url,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth_session(&self) -> &AuthSession {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// The session affinity token picked up from redirects, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.pipeline.session_id()
    }

    /// The active feed.
    pub fn feed_url(&self) -> Option<&Url> {
        self.feed_url.as_ref()
    }

    pub fn set_feed_url(&mut self, url: &str) -> FeedResult<()> {
        let url = Url::parse(url).map_err(|e| {
            FeedError::invalid_argument(format!("invalid feed URL {:?}: {}", url, e)).with_source(e)
        })?;
        self.feed_url = Some(url);
        Ok(())
    }

    pub fn in_place(&self) -> bool {
        self.in_place
    }

    /// Controls whether `add` and `update` replace the caller's entry.
    pub fn set_in_place(&mut self, in_place: bool) {
        self.in_place = in_place;
    }

    pub fn set_session_affinity(&mut self, enabled: bool) {
        self.pipeline.set_session_affinity(enabled);
    }

    /// Codec given to entries read by this client.
    pub fn set_recurrence_codec(&mut self, codec: Option<Arc<dyn RecurrenceCodec>>) {
        self.codec = codec;
    }

    /// Logs in with a username and password.
    pub fn login(&mut self, username: &str, password: &str) -> FeedResult<()> {
        self.login_with(username, password, &LoginOptions::default())
    }

    /// Logs in, overriding the service, source or account type.
    pub fn login_with(
        &mut self,
        username: &str,
        password: &str,
        options: &LoginOptions,
    ) -> FeedResult<()> {
        self.auth.login(
            self.pipeline.transport().as_ref(),
            &self.config,
            username,
            password,
            options,
        )?;
        self.derive_feed(username);
        Ok(())
    }

    /// Uses a token obtained out of band.
    pub fn auth(&mut self, username: &str, token: &str) {
        self.auth.auth(username, token);
        self.derive_feed(username);
    }

    /// Sets the feed after authentication: the user's private feed if none
    /// was configured, otherwise the configured one with any `private-<key>`
    /// visibility turned into plain `private`.
    fn derive_feed(&mut self, username: &str) {
        let derived = match self.feed_url.take() {
            Some(url) => normalize_private(url),
            None => self.private_feed(username),
        };
        debug!(feed = %derived, "Active feed");
        self.feed_url = Some(derived);
    }

    fn private_feed(&self, calendar_id: &str) -> Url {
        self.feeds_url(&[calendar_id, VISIBILITY_PRIVATE, PROJECTION_FULL])
    }

    fn feeds_url(&self, segments: &[&str]) -> Url {
        let mut url = self.feeds_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn calendars_url(&self, owned: bool) -> Url {
        let list = if owned { "owncalendars" } else { "allcalendars" };
        self.feeds_url(&[DEFAULT_USER, list, PROJECTION_FULL])
    }

    fn active_feed(&self) -> FeedResult<&Url> {
        self.feed_url.as_ref().ok_or_else(|| {
            FeedError::configuration("no calendar feed: log in, authenticate or set a feed URL")
        })
    }

    /// Fetches one page of the active feed.
    pub fn fetch_feed(&mut self, query: &Query) -> FeedResult<Feed> {
        let url = query.encode(self.active_feed()?)?;
        let body = self.pipeline.read(&self.auth, &url)?;
        Feed::parse(&body, self.codec.clone())
    }

    /// Lists entries of the active feed.
    pub fn list(&mut self, query: &Query) -> FeedResult<Vec<Entry>> {
        Ok(self.fetch_feed(query)?.into_entries())
    }

    /// Fetches a single entry by id.
    ///
    /// Accepts either the bare id or the full id URL.
    pub fn get(&mut self, entry_id: &str) -> FeedResult<Entry> {
        let id = entry_id.trim_end_matches('/').rsplit('/').next().unwrap_or(entry_id);
        if id.is_empty() {
            return Err(FeedError::invalid_argument("entry id is empty"));
        }
        let url = Query::new().entry_id(id).encode(self.active_feed()?)?;
        let body = self.pipeline.read(&self.auth, &url)?;
        Ok(Entry::parse(&body)?.with_recurrence_codec(self.codec.clone()))
    }

    /// Creates an entry in the active feed.
    pub fn add(&mut self, entry: &mut Entry) -> FeedResult<Entry> {
        let url = self.active_feed()?.clone();
        self.pipeline
            .write(&self.auth, entry, &url, WriteVerb::Post, self.in_place)
    }

    /// Saves changes to an existing entry.
    pub fn update(&mut self, entry: &mut Entry) -> FeedResult<Entry> {
        let url = edit_url_of(entry.edit_url())?;
        self.pipeline
            .write(&self.auth, entry, &url, WriteVerb::Put, self.in_place)
    }

    /// Deletes an entry.
    pub fn delete(&mut self, entry: &Entry) -> FeedResult<()> {
        let url = edit_url_of(entry.edit_url())?;
        let mut target = entry.clone();
        self.pipeline
            .write(&self.auth, &mut target, &url, WriteVerb::Delete, false)?;
        Ok(())
    }

    /// Lists all calendars the user can see, or only those they own.
    pub fn calendars(&mut self, owned: bool) -> FeedResult<Vec<CalendarEntry>> {
        let url = self.calendars_url(owned);
        let body = self.pipeline.read(&self.auth, &url)?;
        Ok(Feed::parse(&body, None)?
            .into_entries()
            .into_iter()
            .map(CalendarEntry::from_entry)
            .collect())
    }

    /// Creates a calendar.
    pub fn add_calendar(&mut self, calendar: &mut CalendarEntry) -> FeedResult<CalendarEntry> {
        let url = self.calendars_url(true);
        self.pipeline
            .write(&self.auth, calendar.entry_mut(), &url, WriteVerb::Post, self.in_place)
            .map(CalendarEntry::from_entry)
    }

    /// Saves calendar settings.
    pub fn update_calendar(&mut self, calendar: &mut CalendarEntry) -> FeedResult<CalendarEntry> {
        let url = edit_url_of(calendar.edit_url(true))?;
        self.pipeline
            .write(&self.auth, calendar.entry_mut(), &url, WriteVerb::Put, self.in_place)
            .map(CalendarEntry::from_entry)
    }

    pub fn delete_calendar(&mut self, calendar: &CalendarEntry) -> FeedResult<()> {
        let url = edit_url_of(calendar.edit_url(true))?;
        let mut target = calendar.entry().clone();
        self.pipeline
            .write(&self.auth, &mut target, &url, WriteVerb::Delete, false)?;
        Ok(())
    }

    /// Makes the given calendar's private feed the active feed.
    pub fn select_calendar(&mut self, calendar: &CalendarEntry) -> FeedResult<()> {
        let id = calendar
            .calendar_id()
            .ok_or_else(|| FeedError::invalid_argument("calendar entry has no id"))?;
        let feed = self.private_feed(&id);
        info!(calendar = %id, feed = %feed, "Selected calendar");
        self.feed_url = Some(feed);
        Ok(())
    }
}

fn edit_url_of(href: Option<String>) -> FeedResult<Url> {
    let href = href.ok_or_else(|| FeedError::invalid_argument("entry has no edit link"))?;
    Url::parse(&href).map_err(|e| {
        FeedError::invalid_argument(format!("invalid edit link {:?}: {}", href, e)).with_source(e)
    })
}

fn normalize_private(url: Url) -> Url {
    if !PRIVATE_KEY_SEGMENT.is_match(url.path()) {
        return url;
    }
    let path = PRIVATE_KEY_SEGMENT
        .replace(url.path(), format!("/{}/", VISIBILITY_PRIVATE).as_str())
        .into_owned();
    let mut url = url;
    url.set_path(&path);
    url
}
