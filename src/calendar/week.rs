use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::agenda::meeting_type_name;

/// Date format used for week keys in the record store.
pub const WEEK_KEY_FORMAT: &str = "%Y-%m-%d";

/// A custom week: a fixed day-of-month band within one calendar month.
///
/// Bands are `[1-7]`, `[8-14]`, `[15-21]`, `[22-28]` and `[29-end]`. The fifth
/// band only exists in months with more than 28 days and is 1 to 3 days long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    pub ordinal: u8,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn from_sign(n: i32) -> Self {
        if n < 0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

impl Week {
    /// Midnight at the start of the first day.
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last representable instant of the final day.
    pub fn end_datetime(&self) -> NaiveDateTime {
        self.end.and_time(end_of_day())
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The `week_start_date` value meetings of this week are keyed by.
    pub fn key(&self) -> String {
        self.start.format(WEEK_KEY_FORMAT).to_string()
    }

    pub fn meeting_type_name(&self) -> &'static str {
        meeting_type_name(self.ordinal)
    }

    pub fn next(&self) -> Week {
        step_week(self, Direction::Forward)
    }

    pub fn prev(&self) -> Week {
        step_week(self, Direction::Backward)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.format("%b %-d, %Y"))
        } else {
            write!(
                f,
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d, %Y")
            )
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Resolves the custom week containing `date`. Total over all dates.
pub fn resolve_week(date: NaiveDate) -> Week {
    let day = date.day();
    let ordinal = ((day - 1) / 7 + 1).min(5) as u8;
    let start_day = (ordinal as u32 - 1) * 7 + 1;
    let end_day = if ordinal < 5 {
        start_day + 6
    } else {
        days_in_month(date)
    };

    let start = date - Duration::days((day - start_day) as i64);
    let end = date + Duration::days((end_day - day) as i64);
    Week {
        ordinal,
        start,
        end,
    }
}

/// The adjacent week in `direction`.
///
/// Weeks tile the calendar without gaps, so the neighbour is simply the week
/// holding the day after `end` (or the day before `start`). That yields:
/// 1..3 -> +1 same month; 4 -> 5 on day 29 when the month has one, else 1 of
/// the next month; 5 -> 1 of the next month. Backwards, 1 lands on the
/// previous month's last band (5 if it has day 29, else 4) and 5 -> 4.
pub fn step_week(week: &Week, direction: Direction) -> Week {
    let neighbour = match direction {
        Direction::Forward => week.end.succ_opt(),
        Direction::Backward => week.start.pred_opt(),
    };
    neighbour.map(resolve_week).unwrap_or(*week)
}

/// Moves `|n|` weeks from the week containing `date`, stepping one custom
/// week at a time. Never plain day arithmetic: band 5 is 1 to 3 days long.
pub fn add_weeks(date: NaiveDate, n: i32) -> Week {
    let direction = Direction::from_sign(n);
    let mut week = resolve_week(date);
    for _ in 0..n.unsigned_abs() {
        week = step_week(&week, direction);
    }
    week
}

/// Week containing today's local date.
pub fn current_week() -> Week {
    resolve_week(Local::now().date_naive())
}

/// Parses a stored `week_start_date` key.
pub fn parse_week_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, WEEK_KEY_FORMAT).ok()
}
