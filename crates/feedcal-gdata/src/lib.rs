//! Client for calendar services published as Atom feeds.
//!
//! The crate is organised in three layers:
//!
//! - [`Entry`], [`CalendarEntry`] and [`Feed`] - typed views over Atom
//!   documents, with the calendar extension fields (time window, status,
//!   attendees, recurrence, web content links)
//! - [`Query`] - list and single-entry filters and their URL encoding
//! - [`CalendarClient`] - authentication ([`AuthSession`]) plus the
//!   [`RequestPipeline`] that sends requests, follows session redirects and
//!   parses responses
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────────┐
//!              │  CalendarClient  │
//!              └───┬─────┬─────┬──┘
//!                  │     │     │
//!        ┌─────────┘     │     └──────────┐
//!        ▼               ▼                ▼
//! ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐
//! │ AuthSession │ │    Query    │ │ RequestPipeline │
//! └─────────────┘ └─────────────┘ └────────┬────────┘
//!                                          │ Transport
//!                                          ▼
//!                                   ┌─────────────┐
//!                                   │ Entry / Feed│
//!                                   └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use feedcal_gdata::{CalendarClient, ClientConfig, Entry, Query};
//!
//! let mut client = CalendarClient::new(ClientConfig::new())?;
//! client.login("jo@gmail.com", "secret")?;
//!
//! let mut entry = Entry::new();
//! entry.set_title("Tennis with Beth");
//! client.add(&mut entry)?;
//!
//! for event in client.list(&Query::new().text("Tennis"))? {
//!     println!("{:?}", event.title());
//! }
//! ```

pub mod atom;
pub mod auth;
pub mod calendar;
pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod feed;
pub mod fields;
pub mod link;
pub mod pipeline;
pub mod query;
pub mod recurrence;
pub mod transport;
pub mod web_content;

// Re-export main types at crate root
pub use auth::{AuthKind, AuthSession, LoginOptions};
pub use calendar::CalendarEntry;
pub use client::CalendarClient;
pub use config::ClientConfig;
pub use entry::Entry;
pub use error::{FeedError, FeedErrorCode, FeedResult};
pub use feed::Feed;
pub use fields::{Category, EventStatus, Person, Transparency, Visibility};
pub use link::{Link, LinkRelation};
pub use pipeline::{RequestPipeline, WriteVerb};
pub use query::{Query, QueryValue, SortOrder};
pub use recurrence::{Recurrence, RecurrenceCodec, RecurrenceTime};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use web_content::{WebContent, WebContentLink};

#[cfg(feature = "recurrence")]
pub use recurrence::IcsRecurrenceCodec;
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
