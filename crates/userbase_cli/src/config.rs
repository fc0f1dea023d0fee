//! Command-line and environment configuration for the console binary.
//!
//! # Invariants
//! - Every option has an environment fallback except `--in-memory`.
//! - A relative log directory is resolved against the working directory.

use clap::Parser;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "userbase")]
#[command(version)]
#[command(about = "Interactive console for managing person records")]
pub struct Config {
    /// SQLite database file
    #[arg(long, env = "USERBASE_DB", default_value = "userbase.sqlite3")]
    pub db: PathBuf,

    /// Use a throwaway in-memory database instead of `--db`
    #[arg(long)]
    pub in_memory: bool,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, env = "USERBASE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "USERBASE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Config {
    /// Returns the configured level or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(userbase_core::default_log_level())
    }

    /// Returns the log directory as an absolute path, if configured.
    pub fn absolute_log_dir(&self) -> io::Result<Option<PathBuf>> {
        match &self.log_dir {
            None => Ok(None),
            Some(dir) if dir.is_absolute() => Ok(Some(dir.clone())),
            Some(dir) => Ok(Some(std::env::current_dir()?.join(dir))),
        }
    }
}
