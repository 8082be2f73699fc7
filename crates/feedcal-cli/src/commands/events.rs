//! Event commands.

use std::io::Write;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use feedcal_core::EventTime;
use feedcal_gdata::{CalendarClient, Entry, Query};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::output;

/// Filters for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub query: Option<String>,
    pub categories: Vec<String>,
    pub from: Option<String>,
    pub until: Option<String>,
    pub future: bool,
    pub max_results: Option<u32>,
}

impl ListOptions {
    pub fn to_query(&self) -> CliResult<Query> {
        let mut query = Query::new();
        if let Some(ref text) = self.query {
            query = query.text(text.as_str());
        }
        if !self.categories.is_empty() {
            query = query.categories(self.categories.iter().map(String::as_str));
        }
        if let Some(ref from) = self.from {
            query = query.start_min(parse_bound(from)?);
        }
        if let Some(ref until) = self.until {
            query = query.start_max(parse_bound(until)?);
        }
        if self.future {
            query = query.future_events(true);
        }
        if let Some(max) = self.max_results {
            query = query.max_results(max);
        }
        Ok(query)
    }
}

pub fn list(
    client: &mut CalendarClient,
    options: &ListOptions,
    json: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let entries = client.list(&options.to_query()?)?;
    output::write_events(out, &entries, json)
}

pub fn get(client: &mut CalendarClient, id: &str, json: bool, out: &mut dyn Write) -> CliResult<()> {
    let entry = client.get(id)?;
    output::write_events(out, std::slice::from_ref(&entry), json)
}

/// Fields for a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
}

impl NewEvent {
    pub fn to_entry(&self) -> CliResult<Entry> {
        let start = parse_time(&self.start)?;
        let end = match self.end {
            Some(ref raw) => parse_time(raw)?,
            None => default_end(&start),
        };
        if start.is_all_day() != end.is_all_day() {
            return Err(CliError::InvalidInput(
                "start and end must both be dates or both be timestamps".to_string(),
            ));
        }

        let mut entry = Entry::new();
        entry.set_title(self.title.as_str());
        entry.set_when(start.to_utc_datetime(), end.to_utc_datetime(), start.is_all_day())?;
        if let Some(ref content) = self.content {
            entry.set_content(content.as_str());
        }
        if let Some(ref location) = self.location {
            entry.set_location(location.as_str());
        }
        Ok(entry)
    }
}

pub fn add(
    client: &mut CalendarClient,
    event: &NewEvent,
    json: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut entry = event.to_entry()?;
    client.add(&mut entry)?;
    info!(id = ?entry.id(), "Created event");
    output::write_events(out, std::slice::from_ref(&entry), json)
}

pub fn update_title(
    client: &mut CalendarClient,
    id: &str,
    title: &str,
    json: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut entry = client.get(id)?;
    entry.set_title(title);
    client.update(&mut entry)?;
    output::write_events(out, std::slice::from_ref(&entry), json)
}

pub fn delete(client: &mut CalendarClient, id: &str, out: &mut dyn Write) -> CliResult<()> {
    let entry = client.get(id)?;
    client.delete(&entry)?;
    let title = entry.title().unwrap_or_else(|| output::short_id(id).to_string());
    writeln!(out, "Deleted {}", title)?;
    Ok(())
}

/// Reads `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_time(raw: &str) -> CliResult<EventTime> {
    EventTime::parse_wire(raw).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "{:?} is neither a date (YYYY-MM-DD) nor an RFC 3339 timestamp",
            raw
        ))
    })
}

fn parse_bound(raw: &str) -> CliResult<DateTime<Utc>> {
    parse_time(raw).map(|t| t.to_utc_datetime())
}

fn default_end(start: &EventTime) -> EventTime {
    match start {
        EventTime::AllDay(date) => EventTime::from_date(next_day(*date)),
        EventTime::DateTime(dt) => EventTime::from_utc(*dt + Duration::hours(1)),
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
