//! Configuration commands.

use std::io::Write;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::session;

/// Dumps the configuration as TOML.
pub fn dump(config: &CliConfig, out: &mut dyn Write) -> CliResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    writeln!(out, "# config.toml ({})", CliConfig::default_path().display())?;
    writeln!(out, "{}", rendered)?;
    Ok(())
}

/// Checks URLs and credentials without contacting the service.
pub fn validate(config: &CliConfig, out: &mut dyn Write) -> CliResult<()> {
    session::check_endpoints(config)?;
    config.credentials()?;
    writeln!(out, "Configuration is valid.")?;
    Ok(())
}

pub fn path(out: &mut dyn Write) -> CliResult<()> {
    writeln!(out, "config: {}", CliConfig::default_path().display())?;
    Ok(())
}
