//! Console entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the database.
//! - Own the SQLite connection for the whole session and close it on exit.

mod config;
mod console;

use clap::Parser;
use config::Config;
use console::Console;
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::io;
use std::process::ExitCode;
use userbase_core::db::{open_db, open_db_in_memory};
use userbase_core::{init_logging, SqliteUserStore, UserService};

fn main() -> ExitCode {
    let config = Config::parse();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=app_exit module=cli status=error error={err}");
            eprintln!("userbase: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = config.absolute_log_dir()? {
        let log_dir = log_dir
            .to_str()
            .ok_or("log directory must be valid UTF-8")?
            .to_string();
        init_logging(config.effective_log_level(), &log_dir)?;
    }

    let conn = if config.in_memory {
        open_db_in_memory()?
    } else {
        open_db(&config.db)?
    };

    let session = run_console(&conn);
    close_connection(conn)?;
    session
}

fn run_console(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let service = UserService::new(SqliteUserStore::try_new(conn)?);
    let stdin = io::stdin();
    Console::new(&service, stdin.lock(), io::stdout()).run()?;
    Ok(())
}

fn close_connection(conn: Connection) -> Result<(), Box<dyn Error>> {
    match conn.close() {
        Ok(()) => {
            info!("event=db_close module=cli status=ok");
            Ok(())
        }
        Err((_conn, err)) => Err(err.into()),
    }
}
