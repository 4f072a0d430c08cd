use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "halqa", version, author, about = "Weekly attendance and agenda tracking for halqas")]
pub struct Cli {
    /// Work on the week containing this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,

    /// Move this many weeks forward (negative for back) from the selected week
    #[arg(long, global = true, default_value_t = 0, allow_hyphen_values = true)]
    pub offset: i32,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the selected week, its meeting type and agenda
    Week,
    /// Completion statistics per area
    Dashboard,
    /// List an area's halqas and their status
    Area {
        /// Area id
        area: String,
    },
    /// Open a halqa's meeting for the week (created if missing)
    Meeting {
        /// Halqa id, meeting id, `halqa:<id>` or `meeting:<id>`
        target: String,
    },
    /// Toggle a member's attendance
    Attend {
        target: String,
        /// Member id
        member: String,
    },
    /// Toggle an agenda item
    Agenda {
        target: String,
        /// Agenda item id (e.g. quran, report, discussion)
        item: String,
    },
    /// Set the meeting status
    Status {
        target: String,
        /// pending, completed, missed or cancelled
        status: String,
        /// Why the meeting was missed or cancelled
        #[arg(long)]
        reason: Option<String>,
    },
    /// Attach free-text notes to a meeting
    Note {
        target: String,
        text: String,
    },
    /// Weekly report table for all halqas
    Report,
    /// Show config and database locations
    Config {
        /// Write a config.toml with default values if none exists
        #[arg(long)]
        init: bool,
    },
    /// Administrative commands
    Admin {
        /// Admin password from config.toml
        #[arg(long)]
        password: String,
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Add an area
    AddArea {
        name: String,
        #[arg(long, default_value = "#888888")]
        color: String,
    },
    /// Rename an area
    RenameArea { area: String, name: String },
    /// Add a halqa to an area
    AddHalqa {
        area: String,
        name: String,
        /// Weekday the halqa meets on (defaults to config)
        #[arg(long)]
        day: Option<String>,
    },
    /// Rename a halqa
    RenameHalqa { halqa: String, name: String },
    /// Delete a halqa and all of its meetings
    DeleteHalqa { halqa: String },
    /// Add a member to a halqa
    AddMember { halqa: String, name: String },
    /// Rename a member
    RenameMember {
        halqa: String,
        member: String,
        name: String,
    },
    /// Remove a member from a halqa
    RemoveMember { halqa: String, member: String },
    /// Fill an empty database with demo areas and halqas
    Seed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_week_selection() {
        let cli = Cli::try_parse_from(["halqa", "report", "--date", "2024-02-29", "--offset", "-1"]).unwrap();
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(cli.offset, -1);
        assert!(matches!(cli.command, Some(Commands::Report)));
    }

    #[test]
    fn test_status_with_reason() {
        let cli = Cli::try_parse_from(["halqa", "status", "h-1", "missed", "--reason", "rain"]).unwrap();
        match cli.command {
            Some(Commands::Status { target, status, reason }) => {
                assert_eq!(target, "h-1");
                assert_eq!(status, "missed");
                assert_eq!(reason.as_deref(), Some("rain"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_admin_requires_password() {
        assert!(Cli::try_parse_from(["halqa", "admin", "seed"]).is_err());
        let cli = Cli::try_parse_from(["halqa", "admin", "--password", "x", "add-halqa", "north", "New"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Admin { action: AdminCommands::AddHalqa { .. }, .. })
        ));
    }
}
