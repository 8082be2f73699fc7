//! feedcal CLI entry point.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use feedcal_cli::cli::{Cli, Command, ConfigAction};
use feedcal_cli::commands::events::{ListOptions, NewEvent};
use feedcal_cli::commands::{calendars, config, events};
use feedcal_cli::config::CliConfig;
use feedcal_cli::error::CliResult;
use feedcal_cli::session;
use feedcal_core::{TracingConfig, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::cli(cli.debug)) {
        eprintln!("warning: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Command::Config { ref action } = cli.command {
        return match action {
            ConfigAction::Dump => config::dump(&config, &mut out),
            ConfigAction::Validate => config::validate(&config, &mut out),
            ConfigAction::Path => config::path(&mut out),
        };
    }

    let mut client = session::connect(&config)?;
    // `select` looks its calendar up itself.
    if !matches!(cli.command, Command::Select { .. }) {
        session::select_configured(&mut client, &config, cli.calendar.as_deref())?;
    }

    let json = cli.json;
    match cli.command {
        Command::Login => calendars::login(&client, &mut out),
        Command::List {
            query,
            category,
            from,
            until,
            future,
            max_results,
        } => {
            let options = ListOptions {
                query,
                categories: category,
                from,
                until,
                future,
                max_results: max_results.or(config.feed.max_results),
            };
            events::list(&mut client, &options, json, &mut out)
        }
        Command::Get { id } => events::get(&mut client, &id, json, &mut out),
        Command::Add {
            title,
            start,
            end,
            content,
            location,
        } => {
            let event = NewEvent {
                title,
                start,
                end,
                content,
                location,
            };
            events::add(&mut client, &event, json, &mut out)
        }
        Command::UpdateTitle { id, title } => {
            events::update_title(&mut client, &id, &title, json, &mut out)
        }
        Command::Delete { id } => events::delete(&mut client, &id, &mut out),
        Command::Calendars { owned } => calendars::calendars(&mut client, owned, json, &mut out),
        Command::Select { calendar } => calendars::select(&mut client, &calendar, &mut out),
        Command::Config { .. } => Ok(()),
    }?;

    out.flush()?;
    Ok(())
}
