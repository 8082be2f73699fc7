//! Secret references in the config file.
//!
//! `password` and `token` may say where the secret lives instead of holding
//! it. `env::VAR` reads an environment variable and `pass::entry` takes the
//! first line of `pass show entry`. Any other value is the secret itself.

use std::fmt;
use std::process::Command;

use crate::error::{CliError, CliResult};

/// A parsed secret reference.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    Plain(&'a str),
    Env(&'a str),
    Pass(&'a str),
}

impl fmt::Debug for SecretRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(<redacted>)"),
            Self::Env(var) => write!(f, "Env({})", var),
            Self::Pass(entry) => write!(f, "Pass({})", entry),
        }
    }
}

impl<'a> SecretRef<'a> {
    pub fn parse(raw: &'a str) -> Self {
        if let Some(entry) = raw.strip_prefix("pass::") {
            Self::Pass(entry)
        } else if let Some(var) = raw.strip_prefix("env::") {
            Self::Env(var)
        } else {
            Self::Plain(raw)
        }
    }

    /// Fetches the secret value.
    pub fn resolve(&self) -> CliResult<String> {
        match *self {
            Self::Plain(value) => Ok(value.to_string()),
            Self::Env(var) => std::env::var(var)
                .map_err(|_| CliError::Secret(format!("environment variable `{}` is not set", var))),
            Self::Pass(entry) => from_pass(entry),
        }
    }
}

/// Resolves a config value that may be a secret reference.
pub fn resolve(raw: &str) -> CliResult<String> {
    SecretRef::parse(raw).resolve()
}

fn from_pass(entry: &str) -> CliResult<String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(entry)
        .output()
        .map_err(|e| CliError::Secret(format!("failed to run `pass show {}`: {}", entry, e)))?;

    if !output.status.success() {
        return Err(CliError::Secret(format!(
            "`pass show {}` failed ({}): {}",
            entry,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CliError::Secret(format!("`pass show {}` printed nothing", entry)))
}
