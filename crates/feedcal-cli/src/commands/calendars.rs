//! Account and calendar commands.

use std::io::Write;

use feedcal_gdata::{AuthKind, CalendarClient};

use crate::error::CliResult;
use crate::output;
use crate::session;

/// Reports who is logged in and which feed is active.
pub fn login(client: &CalendarClient, out: &mut dyn Write) -> CliResult<()> {
    let auth = client.auth_session();
    let mode = match auth.kind() {
        Some(AuthKind::ClientLogin) => "password",
        Some(AuthKind::AuthSub) => "token",
        None => "none",
    };
    writeln!(out, "user: {}", auth.username().unwrap_or("-"))?;
    writeln!(out, "auth: {}", mode)?;
    if let Some(feed) = client.feed_url() {
        writeln!(out, "feed: {}", feed)?;
    }
    Ok(())
}

pub fn calendars(
    client: &mut CalendarClient,
    owned: bool,
    json: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let calendars = client.calendars(owned)?;
    output::write_calendars(out, &calendars, json)
}

/// Prints the private feed of the named calendar.
pub fn select(client: &mut CalendarClient, name: &str, out: &mut dyn Write) -> CliResult<()> {
    let calendar = session::find_calendar(client, name)?;
    client.select_calendar(&calendar)?;
    if let Some(feed) = client.feed_url() {
        writeln!(out, "{}", feed)?;
    }
    Ok(())
}
