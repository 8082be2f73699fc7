//! Building an authenticated client from the config file.

use feedcal_gdata::{CalendarClient, CalendarEntry};
use tracing::debug;

use crate::config::{CliConfig, Credentials};
use crate::error::{CliError, CliResult};

/// Creates an authenticated client.
pub fn connect(config: &CliConfig) -> CliResult<CalendarClient> {
    let mut client = CalendarClient::new(config.client_config())?;
    authenticate(&mut client, &config.credentials()?)?;
    Ok(client)
}

/// Selects the calendar named by `calendar`, falling back to
/// `[feed] calendar`. Does nothing if neither is set.
pub fn select_configured(
    client: &mut CalendarClient,
    config: &CliConfig,
    calendar: Option<&str>,
) -> CliResult<()> {
    if let Some(name) = calendar.or(config.feed.calendar.as_deref()) {
        let chosen = find_calendar(client, name)?;
        client.select_calendar(&chosen)?;
    }
    Ok(())
}

/// Checks the configured URLs without building a client.
pub fn check_endpoints(config: &CliConfig) -> CliResult<()> {
    config.client_config().validate()?;
    Ok(())
}

pub fn authenticate(client: &mut CalendarClient, credentials: &Credentials) -> CliResult<()> {
    match credentials {
        Credentials::Password { username, password } => {
            debug!(user = %username, "Logging in with password");
            client.login(username, password)?;
        }
        Credentials::Token { username, token } => {
            debug!(user = %username, "Using delegated token");
            client.auth(username, token);
        }
    }
    Ok(())
}

/// Looks a calendar up by id or title among those the account can see.
pub fn find_calendar(client: &mut CalendarClient, name: &str) -> CliResult<CalendarEntry> {
    let calendars = client.calendars(false)?;
    pick_calendar(calendars, name)
        .ok_or_else(|| CliError::NotFound(format!("no calendar named {:?}", name)))
}

/// An exact id match wins over a case-insensitive title match.
pub fn pick_calendar(calendars: Vec<CalendarEntry>, name: &str) -> Option<CalendarEntry> {
    let by_id = calendars
        .iter()
        .position(|c| c.calendar_id().as_deref() == Some(name));
    let index = by_id.or_else(|| {
        calendars.iter().position(|c| {
            c.title()
                .is_some_and(|title| title.trim().eq_ignore_ascii_case(name.trim()))
        })
    })?;
    calendars.into_iter().nth(index)
}
