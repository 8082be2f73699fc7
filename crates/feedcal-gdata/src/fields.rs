//! Value types for calendar extension fields.
//!
//! Enumerated fields travel as `value` attributes holding a URI such as
//! `http://schemas.google.com/g/2005#event.confirmed`. The types here hold
//! the bare lower-case name; [`EVENT_VALUE_PREFIX`] is added on write and
//! stripped on read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// URI prefix of every enumerated event value.
pub const EVENT_VALUE_PREFIX: &str = "http://schemas.google.com/g/2005#event.";

/// A person attached to an entry: author or attendee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

impl Person {
    /// Creates a person with both name and email.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Creates a person known only by email.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: Some(email.into()),
        }
    }

    /// Creates a person known only by name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
        }
    }
}

/// A category attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Categorization scheme URI.
    pub scheme: Option<String>,
    /// Term within the scheme.
    pub term: String,
}

/// Confirmation state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The event was canceled.
    Canceled,
    /// The event is confirmed.
    Confirmed,
    /// The event is tentative.
    Tentative,
}

impl EventStatus {
    /// Returns the lower-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canceled => "canceled",
            Self::Confirmed => "confirmed",
            Self::Tentative => "tentative",
        }
    }
}

/// Whether an event blocks time on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    /// The event consumes time (busy).
    Opaque,
    /// The event does not consume time (free).
    Transparent,
}

impl Transparency {
    /// Returns the lower-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opaque => "opaque",
            Self::Transparent => "transparent",
        }
    }
}

/// Who may see an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Details hidden, time shown.
    Confidential,
    /// Inherit the calendar's sharing setting.
    Default,
    /// Visible to the owner only.
    Private,
    /// Visible to everyone.
    Public,
}

impl Visibility {
    /// Returns the lower-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confidential => "confidential",
            Self::Default => "default",
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

/// Parses an enumerated value case-insensitively, with or without URI prefix.
fn parse_value<T: Copy>(
    field: &str,
    raw: &str,
    variants: &[T],
    name: impl Fn(&T) -> &'static str,
) -> Result<T, FeedError> {
    let normalized = raw.trim().to_lowercase();
    let bare = normalized
        .strip_prefix(EVENT_VALUE_PREFIX)
        .unwrap_or(&normalized);
    variants
        .iter()
        .copied()
        .find(|v| name(v) == bare)
        .ok_or_else(|| FeedError::invalid_argument(format!("unknown {} value: {}", field, raw)))
}

impl FromStr for EventStatus {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value(
            "status",
            s,
            &[Self::Canceled, Self::Confirmed, Self::Tentative],
            Self::as_str,
        )
    }
}

impl FromStr for Transparency {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value(
            "transparency",
            s,
            &[Self::Opaque, Self::Transparent],
            Self::as_str,
        )
    }
}

impl FromStr for Visibility {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value(
            "visibility",
            s,
            &[Self::Confidential, Self::Default, Self::Private, Self::Public],
            Self::as_str,
        )
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transparency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
