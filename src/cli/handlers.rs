use anyhow::{Context, Result, anyhow};
use log::debug;
use std::str::FromStr;

use crate::cli::args::AdminCommands;
use crate::config::AppConfig;
use crate::db::store::RecordStore;
use crate::models::agenda::agenda_for;
use crate::models::{Meeting, MeetingStatus};
use crate::tracker::{AdminSession, Target, Tracker};
use crate::utils::format::{fraction, pad, percent, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn status_color(status: MeetingStatus) -> &'static str {
    match status {
        MeetingStatus::Completed => GREEN,
        MeetingStatus::Missed => RED,
        MeetingStatus::Cancelled => AMBER,
        MeetingStatus::Pending => DIM,
    }
}

fn status_icon(status: MeetingStatus) -> &'static str {
    match status {
        MeetingStatus::Completed => "●",
        MeetingStatus::Missed => "✗",
        MeetingStatus::Cancelled => "⊘",
        MeetingStatus::Pending => "○",
    }
}

fn week_heading<S: RecordStore>(tracker: &Tracker<S>) {
    let week = tracker.week();
    println!();
    println_colored!(
        GOLD,
        "  Week {} — {} ({})",
        week.ordinal,
        week.meeting_type_name(),
        week
    );
    println!();
}

/// Resolves a command-line target to a meeting, creating it if needed.
fn open_meeting<S: RecordStore>(tracker: &mut Tracker<S>, input: &str) -> Result<Meeting> {
    let target = tracker.resolve_target(input)?;
    let (_, meeting) = tracker.open(&target)?;
    Ok(meeting)
}

// ─── Week ────────────────────────────────────────────────────────────────────

pub fn handle_week<S: RecordStore>(tracker: &Tracker<S>) -> Result<()> {
    week_heading(tracker);
    let week = tracker.week();
    println_colored!(
        DIM,
        "  {} → {}  ({} days)",
        week.start_datetime().format("%a %Y-%m-%d %H:%M"),
        week.end_datetime().format("%a %Y-%m-%d %H:%M"),
        week.len_days()
    );
    println!();
    println_colored!(BOLD, "  Agenda");
    for item in agenda_for(week.ordinal) {
        println!("  ○ {:<14} {}", item.id, item.label);
    }
    println!();
    println_colored!(DIM, "  Previous: {}   Next: {}", week.prev(), week.next());
    println!();
    Ok(())
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

pub fn handle_dashboard<S: RecordStore>(tracker: &Tracker<S>) -> Result<()> {
    week_heading(tracker);
    if tracker.areas().is_empty() {
        println_colored!(AMBER, "  No areas yet. Run `halqa admin --password … seed` to add demo data.");
        println!();
        return Ok(());
    }

    let all = tracker.all_area_stats();
    for (area, stats) in &all {
        println_colored!(
            BOLD,
            "  {}  {}  {}",
            pad(&area.name, 18),
            progress_bar(stats.completed, stats.total, 12),
            percent(stats.completion_ratio())
        );
        println!(
            "  {}  {} held  ·  {} missed  ·  {} pending{}",
            pad(&area.id, 18),
            stats.completed,
            stats.missed,
            stats.pending,
            if stats.cancelled > 0 {
                format!(" ({} cancelled)", stats.cancelled)
            } else {
                String::new()
            }
        );
    }

    let total: u32 = all.iter().map(|(_, s)| s.total).sum();
    let completed: u32 = all.iter().map(|(_, s)| s.completed).sum();
    println!();
    println_colored!(
        GREEN,
        "  {} of {} halqas held this week ({})",
        completed,
        total,
        percent(if total == 0 { 0.0 } else { completed as f64 / total as f64 })
    );
    println!();
    Ok(())
}

// ─── Area ────────────────────────────────────────────────────────────────────

pub fn handle_area<S: RecordStore>(tracker: &Tracker<S>, area_id: &str) -> Result<()> {
    let area = tracker.area(area_id)?;
    week_heading(tracker);
    println_colored!(BOLD, "  {}", area.name);
    println!();
    for (i, halqa) in tracker.halqas_in_area(area_id).iter().enumerate() {
        let status = tracker.status_of(&halqa.id);
        println!(
            "  {:02}  {}{}\x1b[0m {}  {}  {} members  {}",
            i + 1,
            status_color(status),
            status_icon(status),
            pad(&halqa.name, 40),
            pad(status.as_str(), 9),
            halqa.strength(),
            halqa.id
        );
    }
    println!();
    Ok(())
}

// ─── Meeting ─────────────────────────────────────────────────────────────────

pub fn handle_meeting<S: RecordStore>(tracker: &mut Tracker<S>, input: &str) -> Result<()> {
    let meeting = open_meeting(tracker, input)?;
    print_meeting(tracker, meeting)
}

fn print_meeting<S: RecordStore>(tracker: &Tracker<S>, meeting: Meeting) -> Result<()> {
    let view = tracker.meeting_view(meeting)?;
    let m = &view.meeting;

    println!();
    println_colored!(GOLD, "  {}", view.halqa.name);
    println_colored!(
        DIM,
        "  Week of {} · week {} · {} · meets {}",
        m.week_start_date,
        view.week.ordinal,
        view.week.meeting_type_name(),
        view.halqa.meeting_day
    );
    println_colored!(DIM, "  Meeting id {}", m.id);
    println!();
    println_colored!(status_color(m.status), "  Status: {}", m.status);
    if let Some(reason) = m.reason() {
        println!("  Reason: {}", reason);
    }
    if let Some(notes) = &m.notes {
        println!("  Notes:  {}", notes);
    }

    println!();
    println_colored!(
        BOLD,
        "  Attendance {}",
        fraction(view.attendance_count(), view.halqa.strength())
    );
    for member in &view.halqa.members {
        if m.is_present(&member.id) {
            println_colored!(GREEN, "  ✓ {} {}", pad(&member.name, 24), member.id);
        } else {
            println_colored!(DIM, "  ○ {} {}", pad(&member.name, 24), member.id);
        }
    }

    println!();
    println_colored!(
        BOLD,
        "  Agenda {}",
        fraction(view.agenda_count(), view.agenda.len())
    );
    for item in view.agenda {
        if m.is_covered(item.id) {
            println_colored!(GREEN, "  ✓ {} {}", pad(item.label, 40), item.id);
        } else {
            println_colored!(DIM, "  ○ {} {}", pad(item.label, 40), item.id);
        }
    }
    println!();
    Ok(())
}

pub fn handle_attend<S: RecordStore>(tracker: &mut Tracker<S>, input: &str, member_id: &str) -> Result<()> {
    let meeting = open_meeting(tracker, input)?;
    let updated = tracker.toggle_attendance(&meeting.id, member_id)?;
    let name = tracker
        .halqa(&updated.halqa_id)?
        .member(member_id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| member_id.to_string());
    if updated.is_present(member_id) {
        println_colored!(GREEN, "  ✓ {} marked present", name);
    } else {
        println_colored!(DIM, "  ○ {} marked absent", name);
    }
    Ok(())
}

pub fn handle_agenda<S: RecordStore>(tracker: &mut Tracker<S>, input: &str, item_id: &str) -> Result<()> {
    let meeting = open_meeting(tracker, input)?;
    let updated = tracker.toggle_agenda(&meeting.id, item_id)?;
    if updated.is_covered(item_id) {
        println_colored!(GREEN, "  ✓ {} covered", item_id);
    } else {
        println_colored!(DIM, "  ○ {} not covered", item_id);
    }
    Ok(())
}

pub fn handle_status<S: RecordStore>(
    tracker: &mut Tracker<S>,
    input: &str,
    status_str: &str,
    reason: Option<&str>,
) -> Result<()> {
    let status = MeetingStatus::from_str(status_str).map_err(|_| {
        let valid: Vec<&str> = MeetingStatus::all().iter().map(|s| s.as_str()).collect();
        anyhow!("Unknown status '{}'. Use: {}", status_str, valid.join(", "))
    })?;
    let meeting = open_meeting(tracker, input)?;
    let mut updated = tracker.set_status(&meeting.id, status)?;
    if let Some(reason) = reason {
        updated = tracker.set_reason(&meeting.id, reason)?;
    }

    println_colored!(
        status_color(updated.status),
        "  {} {} — {}",
        status_icon(updated.status),
        tracker.halqa(&updated.halqa_id)?.name,
        updated.status
    );
    if matches!(status, MeetingStatus::Missed | MeetingStatus::Cancelled) && updated.reason().is_none() {
        println_colored!(DIM, "  Tip: add --reason to record why");
    }
    Ok(())
}

pub fn handle_note<S: RecordStore>(tracker: &mut Tracker<S>, input: &str, text: &str) -> Result<()> {
    let meeting = open_meeting(tracker, input)?;
    tracker.set_notes(&meeting.id, text)?;
    println_colored!(GREEN, "  ✓ Notes saved");
    Ok(())
}

// ─── Report ──────────────────────────────────────────────────────────────────

pub fn handle_report<S: RecordStore>(tracker: &Tracker<S>) -> Result<()> {
    let report = tracker.weekly_report();
    week_heading(tracker);
    println_colored!(
        BOLD,
        "  {:>3}  {}  {}  {:>5}  {:>8}",
        "#",
        pad("HALQA", 44),
        pad("HELD", 4),
        "PART.",
        "STRENGTH"
    );
    let mut current_area = "";
    for row in &report.rows {
        if row.area_name != current_area {
            current_area = row.area_name.as_str();
            println_colored!(GOLD, "  {}", current_area);
        }
        let held = if row.held {
            format!("{}YES \x1b[0m", GREEN)
        } else {
            format!("{}NO  \x1b[0m", RED)
        };
        println!(
            "  {:>3}  {}  {}  {:>5}  {:>8}",
            row.index,
            pad(&row.halqa_name, 44),
            held,
            row.participation,
            row.strength
        );
    }
    println!();
    println!("  Total halqas held:          {}", report.held);
    println!("  Halqas with no meeting:     {}", report.not_held);
    println!();
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            println_colored!(DIM, "  Config already exists; leaving it unchanged");
        } else {
            config.save()?;
            println_colored!(GREEN, "  ✓ Wrote default config");
        }
    }
    println!();
    println!("  Config file:   {}", path.display());
    println!("  Database:      {}", config.db_path()?.display());
    println!("  Meeting day:   {}", config.tracker.default_meeting_day);
    println!(
        "  Admin:         {}",
        if config.admin.password.is_empty() { "disabled" } else { "enabled" }
    );
    println!();
    Ok(())
}

// ─── Admin ───────────────────────────────────────────────────────────────────

pub fn handle_admin<S: RecordStore>(
    tracker: &mut Tracker<S>,
    config: &AppConfig,
    password: &str,
    action: &AdminCommands,
) -> Result<()> {
    let session = AdminSession::login(&config.admin, password).context("Admin login failed")?;
    debug!("Admin session opened at {}", session.issued_at().format("%H:%M:%S"));

    match action {
        AdminCommands::AddArea { name, color } => {
            let area = tracker.add_area(&session, name, color)?;
            println_colored!(GREEN, "  ✓ Added area {} ({})", area.name, area.id);
        }
        AdminCommands::RenameArea { area, name } => {
            tracker.rename_area(&session, area, name)?;
            println_colored!(GREEN, "  ✓ Renamed area {} to {}", area, name);
        }
        AdminCommands::AddHalqa { area, name, day } => {
            let day = day.as_deref().unwrap_or(&config.tracker.default_meeting_day);
            let halqa = tracker.add_halqa(&session, area, name, day)?;
            println_colored!(GREEN, "  ✓ Added halqa {} ({})", halqa.name, halqa.id);
        }
        AdminCommands::RenameHalqa { halqa, name } => {
            let id = halqa_id(tracker, halqa)?;
            tracker.rename_halqa(&session, &id, name)?;
            println_colored!(GREEN, "  ✓ Renamed halqa to {}", name);
        }
        AdminCommands::DeleteHalqa { halqa } => {
            let id = halqa_id(tracker, halqa)?;
            tracker.delete_halqa(&session, &id)?;
            println_colored!(AMBER, "  Deleted halqa {} and its meetings", id);
        }
        AdminCommands::AddMember { halqa, name } => {
            let id = halqa_id(tracker, halqa)?;
            let member = tracker.add_member(&session, &id, name)?;
            println_colored!(GREEN, "  ✓ Added {} ({})", member.name, member.id);
        }
        AdminCommands::RenameMember { halqa, member, name } => {
            let id = halqa_id(tracker, halqa)?;
            tracker.rename_member(&session, &id, member, name)?;
            println_colored!(GREEN, "  ✓ Renamed member {} to {}", member, name);
        }
        AdminCommands::RemoveMember { halqa, member } => {
            let id = halqa_id(tracker, halqa)?;
            tracker.remove_member(&session, &id, member)?;
            println_colored!(AMBER, "  Removed member {}", member);
        }
        AdminCommands::Seed => {
            let inserted = tracker.seed_demo(&session, &config.tracker.default_meeting_day)?;
            if inserted == 0 {
                println_colored!(DIM, "  Database already has areas; nothing seeded");
            } else {
                println_colored!(GREEN, "  ✓ Seeded {} halqas", inserted);
            }
        }
    }
    Ok(())
}

/// Admin commands only accept halqa targets.
fn halqa_id<S: RecordStore>(tracker: &Tracker<S>, input: &str) -> Result<String> {
    match tracker.resolve_target(input)? {
        Target::Halqa(id) => Ok(id),
        Target::Meeting(id) => Err(anyhow!("'{}' is a meeting, not a halqa", id)),
    }
}
