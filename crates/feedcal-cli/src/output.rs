//! Rendering entries for the terminal or as JSON.

use std::io::Write;

use feedcal_core::EventTime;
use feedcal_gdata::{CalendarEntry, Entry, EventStatus};
use serde::Serialize;

use crate::error::{CliError, CliResult};

/// What the CLI shows of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: Option<String>,
    pub status: Option<EventStatus>,
    pub recurring: bool,
}

impl From<&Entry> for EventView {
    fn from(entry: &Entry) -> Self {
        let when = entry.when();
        Self {
            id: entry.id(),
            title: entry.title(),
            start: when.first().copied(),
            end: when.get(1).copied(),
            location: entry.location().filter(|l| !l.is_empty()),
            status: entry.status(),
            recurring: entry.recurrence_text().is_some(),
        }
    }
}

impl EventView {
    /// One line for the terminal.
    pub fn line(&self) -> String {
        let start = self
            .start
            .map(|t| display_time(&t))
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "{:<20} {}",
            start,
            self.title.as_deref().unwrap_or("(untitled)")
        );
        if let Some(ref location) = self.location {
            line.push_str(&format!(" @ {}", location));
        }
        if self.recurring {
            line.push_str(" (recurring)");
        }
        if self.status == Some(EventStatus::Canceled) {
            line.push_str(" [canceled]");
        }
        if let Some(ref id) = self.id {
            line.push_str(&format!("\n{:<20} {}", "", short_id(id)));
        }
        line
    }
}

/// What the CLI shows of a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub id: Option<String>,
    pub title: Option<String>,
    pub color: Option<String>,
    pub access_level: Option<String>,
    pub hidden: bool,
}

impl From<&CalendarEntry> for CalendarView {
    fn from(calendar: &CalendarEntry) -> Self {
        Self {
            id: calendar.calendar_id(),
            title: calendar.title(),
            color: calendar.color(),
            access_level: calendar.access_level(),
            hidden: calendar.hidden().unwrap_or(false),
        }
    }
}

impl CalendarView {
    pub fn line(&self) -> String {
        let mut line = format!(
            "{:<30} {}",
            self.title.as_deref().unwrap_or("(untitled)"),
            self.id.as_deref().unwrap_or("-")
        );
        if let Some(ref level) = self.access_level {
            line.push_str(&format!(" ({})", level));
        }
        if self.hidden {
            line.push_str(" [hidden]");
        }
        line
    }
}

/// Writes `items` one per line, or as a JSON array.
pub fn write_views<T: Serialize>(
    out: &mut dyn Write,
    items: &[T],
    json: bool,
    line: impl Fn(&T) -> String,
) -> CliResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(items)
            .map_err(|e| CliError::InvalidInput(format!("failed to render JSON: {}", e)))?;
        writeln!(out, "{}", rendered)?;
    } else {
        for item in items {
            writeln!(out, "{}", line(item))?;
        }
    }
    Ok(())
}

pub fn write_events(out: &mut dyn Write, entries: &[Entry], json: bool) -> CliResult<()> {
    let views: Vec<EventView> = entries.iter().map(EventView::from).collect();
    write_views(out, &views, json, EventView::line)
}

pub fn write_calendars(
    out: &mut dyn Write,
    calendars: &[CalendarEntry],
    json: bool,
) -> CliResult<()> {
    let views: Vec<CalendarView> = calendars.iter().map(CalendarView::from).collect();
    write_views(out, &views, json, CalendarView::line)
}

fn display_time(time: &EventTime) -> String {
    match time {
        EventTime::AllDay(date) => date.format("%Y-%m-%d").to_string(),
        EventTime::DateTime(dt) => dt.format("%Y-%m-%d %H:%MZ").to_string(),
    }
}

/// The last path segment of an entry id URL.
pub fn short_id(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}
