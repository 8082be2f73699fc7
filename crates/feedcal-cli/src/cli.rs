//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// feedcal - read and edit a feed-based calendar
#[derive(Debug, Parser)]
#[command(name = "feedcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "FEEDCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Calendar to work on (title or id), overrides the config file
    #[arg(long)]
    pub calendar: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the configured credentials and show the active feed
    Login,

    /// List events
    List {
        /// Full-text search
        #[arg(long, short)]
        query: Option<String>,

        /// Only events in this category (can be repeated, all must match)
        #[arg(long, action = clap::ArgAction::Append)]
        category: Vec<String>,

        /// Events starting at or after this time (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// Events starting before this time (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        until: Option<String>,

        /// Only events that have not ended yet
        #[arg(long)]
        future: bool,

        /// Maximum number of events
        #[arg(long, short = 'n')]
        max_results: Option<u32>,
    },

    /// Show a single event
    Get {
        /// Event id (bare or full URL)
        id: String,
    },

    /// Create an event
    Add {
        /// Event title
        title: String,

        /// Start (YYYY-MM-DD for all-day events, or RFC 3339)
        #[arg(long)]
        start: String,

        /// End; defaults to one hour (or one day) after the start
        #[arg(long)]
        end: Option<String>,

        /// Description
        #[arg(long)]
        content: Option<String>,

        /// Location
        #[arg(long)]
        location: Option<String>,
    },

    /// Change the title of an event
    UpdateTitle {
        /// Event id (bare or full URL)
        id: String,

        /// New title
        title: String,
    },

    /// Delete an event
    Delete {
        /// Event id (bare or full URL)
        id: String,
    },

    /// List calendars
    Calendars {
        /// Only calendars owned by the account
        #[arg(long)]
        owned: bool,
    },

    /// Show the feed URL of a calendar, for use as `[feed] url`
    Select {
        /// Calendar title or id
        calendar: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
