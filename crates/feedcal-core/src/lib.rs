//! Core types shared by the feedcal crates: entry times, query windows,
//! wire timestamp helpers and tracing setup.

pub mod time;
pub mod tracing;

pub use time::{EventTime, TimeWindow, format_entry_timestamp, format_query_timestamp};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
