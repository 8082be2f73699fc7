//! Feed queries and their URL encoding.
//!
//! A [`Query`] is an ordered set of filters. Encoding it against a feed
//! address yields the request URL:
//!
//! - `entryID` must stand alone and becomes an extra path segment;
//! - a category *list* becomes the path suffix `/-/A/B` (all categories
//!   must match), while a single category string stays a query parameter
//!   and may use `|` for OR and a leading `-` for NOT;
//! - instants are written as RFC 3339 UTC timestamps;
//! - everything else is a query parameter, in insertion order.

use chrono::{DateTime, Utc};
use feedcal_core::time::{TimeWindow, format_query_timestamp};
use url::Url;

use crate::error::{FeedError, FeedResult};

pub const Q: &str = "q";
pub const CATEGORY: &str = "category";
pub const AUTHOR: &str = "author";
pub const UPDATED_MIN: &str = "updated-min";
pub const UPDATED_MAX: &str = "updated-max";
pub const START_MIN: &str = "start-min";
pub const START_MAX: &str = "start-max";
pub const START_INDEX: &str = "start-index";
pub const MAX_RESULTS: &str = "max-results";
pub const ENTRY_ID: &str = "entryID";
pub const ORDER_BY: &str = "orderby";
pub const SORT_ORDER: &str = "sortorder";
pub const SINGLE_EVENTS: &str = "singleevents";
pub const FUTURE_EVENTS: &str = "futureevents";
pub const CTZ: &str = "ctz";
pub const RECURRENCE_EXPANSION_START: &str = "recurrence-expansion-start";
pub const RECURRENCE_EXPANSION_END: &str = "recurrence-expansion-end";

/// Path segment that introduces a category filter.
const CATEGORY_MARKER: &str = "-";

/// The value of one filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Used verbatim.
    Text(String),
    /// An ordered list; for `category` this is a path filter.
    List(Vec<String>),
    /// Written as an RFC 3339 UTC timestamp.
    Instant(DateTime<Utc>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Instant(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Sort direction for `sortorder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// Filters for a list or get request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a filter, replacing any earlier value for the same key in place.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Full-text search.
    pub fn text(self, q: impl Into<String>) -> Self {
        self.set(Q, QueryValue::Text(q.into()))
    }

    /// Category expression passed as a query parameter.
    pub fn category(self, expression: impl Into<String>) -> Self {
        self.set(CATEGORY, QueryValue::Text(expression.into()))
    }

    /// Categories that must all match, encoded in the path.
    pub fn categories<I, S>(self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = categories.into_iter().map(Into::into).collect();
        self.set(CATEGORY, list)
    }

    pub fn author(self, author: impl Into<String>) -> Self {
        self.set(AUTHOR, QueryValue::Text(author.into()))
    }

    /// Lower bound on the update time; an instant or a preformatted timestamp.
    pub fn updated_min(self, bound: impl Into<QueryValue>) -> Self {
        self.set(UPDATED_MIN, bound)
    }

    pub fn updated_max(self, bound: impl Into<QueryValue>) -> Self {
        self.set(UPDATED_MAX, bound)
    }

    /// Events ending after this bound.
    pub fn start_min(self, bound: impl Into<QueryValue>) -> Self {
        self.set(START_MIN, bound)
    }

    /// Events starting before this bound.
    pub fn start_max(self, bound: impl Into<QueryValue>) -> Self {
        self.set(START_MAX, bound)
    }

    /// Events overlapping the window.
    pub fn within(self, window: TimeWindow) -> Self {
        self.start_min(window.start).start_max(window.end)
    }

    /// 1-based index of the first result.
    pub fn start_index(self, index: u32) -> Self {
        self.set(START_INDEX, index.to_string())
    }

    pub fn max_results(self, max: u32) -> Self {
        self.set(MAX_RESULTS, max.to_string())
    }

    /// Fetches a single entry. Cannot be combined with other filters.
    pub fn entry_id(self, id: impl Into<String>) -> Self {
        self.set(ENTRY_ID, QueryValue::Text(id.into()))
    }

    /// Sort key, e.g. `starttime` or `lastmodified`.
    pub fn order_by(self, key: impl Into<String>) -> Self {
        self.set(ORDER_BY, QueryValue::Text(key.into()))
    }

    pub fn sort_order(self, order: SortOrder) -> Self {
        self.set(SORT_ORDER, order.as_str())
    }

    /// Expand recurring events into single occurrences.
    pub fn single_events(self, expand: bool) -> Self {
        self.set(SINGLE_EVENTS, expand.to_string())
    }

    pub fn future_events(self, only_future: bool) -> Self {
        self.set(FUTURE_EVENTS, only_future.to_string())
    }

    /// Timezone results are rendered in.
    pub fn timezone(self, tz: impl Into<String>) -> Self {
        self.set(CTZ, QueryValue::Text(tz.into()))
    }

    pub fn recurrence_expansion_start(self, bound: impl Into<QueryValue>) -> Self {
        self.set(RECURRENCE_EXPANSION_START, bound)
    }

    pub fn recurrence_expansion_end(self, bound: impl Into<QueryValue>) -> Self {
        self.set(RECURRENCE_EXPANSION_END, bound)
    }

    /// Builds the request URL for this query against `base`.
    pub fn encode(&self, base: &Url) -> FeedResult<Url> {
        let mut url = base.clone();

        if let Some(id) = self.get(ENTRY_ID) {
            if self.params.len() > 1 {
                return Err(FeedError::invalid_query(
                    "entryID cannot be combined with other filters",
                ));
            }
            let QueryValue::Text(id) = id else {
                return Err(FeedError::invalid_query("entryID must be a single value"));
            };
            push_segments(&mut url, std::iter::once(id.as_str()))?;
            return Ok(url);
        }

        let mut pairs: Vec<(&str, String)> = Vec::new();
        for (key, value) in &self.params {
            match value {
                QueryValue::List(items) if key == CATEGORY => {
                    let segments = std::iter::once(CATEGORY_MARKER)
                        .chain(items.iter().map(String::as_str));
                    push_segments(&mut url, segments)?;
                }
                QueryValue::List(items) => pairs.push((key.as_str(), items.join(","))),
                QueryValue::Text(text) => pairs.push((key.as_str(), text.clone())),
                QueryValue::Instant(dt) => pairs.push((key.as_str(), format_query_timestamp(*dt))),
            }
        }

        if !pairs.is_empty() {
            let mut query = url.query().unwrap_or_default().to_string();
            for (key, value) in pairs {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&urlencoding::encode(key));
                query.push('=');
                query.push_str(&encode_value(key, &value));
            }
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

/// Percent-encodes a parameter value. Category expressions keep their
/// `|` and `,` operators literal.
fn encode_value(key: &str, value: &str) -> String {
    let encoded = urlencoding::encode(value);
    if key == CATEGORY {
        encoded.replace("%7C", "|").replace("%2C", ",")
    } else {
        encoded.into_owned()
    }
}

fn push_segments<'a>(url: &mut Url, segments: impl Iterator<Item = &'a str>) -> FeedResult<()> {
    if url.cannot_be_a_base() {
        return Err(FeedError::invalid_query(format!(
            "cannot extend the path of {}",
            url
        )));
    }
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    Ok(())
}
