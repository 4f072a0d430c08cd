mod calendar;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod tracker;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use calendar::current_week;
use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::SqliteStore;
use error::TrackerError;
use tracker::Tracker;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    if let Some(Commands::Config { init }) = cli.command {
        return handlers::handle_config(&config, init);
    }

    // Ensure data directory exists and open DB
    let db_path = config.ensure_db_dir()?;
    let store = SqliteStore::open(&db_path)?;

    let mut tracker = Tracker::load(store, current_week()).context("Loading halqa data")?;
    match cli.date {
        Some(date) => tracker.go_to_date(date)?,
        None => tracker.go_to_today()?,
    };
    if cli.offset != 0 {
        tracker.change_week(cli.offset)?;
    }
    debug!(
        "Active week {} (ordinal {})",
        tracker.week().key(),
        tracker.week().ordinal
    );

    let result = dispatch(&mut tracker, &config, cli.command);
    if let Err(e) = &result {
        if e.downcast_ref::<TrackerError>().is_some_and(TrackerError::is_not_found) {
            eprintln!("Hint: `halqa dashboard` and `halqa area <id>` list valid ids.");
        }
    }
    result
}

fn dispatch(
    tracker: &mut Tracker<SqliteStore>,
    config: &AppConfig,
    command: Option<Commands>,
) -> Result<()> {
    match command {
        None | Some(Commands::Dashboard) => handlers::handle_dashboard(tracker)?,
        Some(Commands::Week) => handlers::handle_week(tracker)?,
        Some(Commands::Area { area }) => handlers::handle_area(tracker, &area)?,
        Some(Commands::Meeting { target }) => handlers::handle_meeting(tracker, &target)?,
        Some(Commands::Attend { target, member }) => {
            handlers::handle_attend(tracker, &target, &member)?
        }
        Some(Commands::Agenda { target, item }) => {
            handlers::handle_agenda(tracker, &target, &item)?
        }
        Some(Commands::Status {
            target,
            status,
            reason,
        }) => handlers::handle_status(tracker, &target, &status, reason.as_deref())?,
        Some(Commands::Note { target, text }) => {
            handlers::handle_note(tracker, &target, &text)?
        }
        Some(Commands::Report) => handlers::handle_report(tracker)?,
        Some(Commands::Admin { password, action }) => {
            handlers::handle_admin(tracker, config, &password, &action)?
        }
        Some(Commands::Config { init }) => handlers::handle_config(config, init)?,
    }

    Ok(())
}
