use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Area, Halqa, Meeting, MeetingStatus};

/// Completion tally for one area in one week.
///
/// `total` counts halqas, not meetings: a halqa without a record is pending.
/// `cancelled` is informational and already included in `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaStats {
    pub total: u32,
    pub completed: u32,
    pub missed: u32,
    pub pending: u32,
    pub cancelled: u32,
}

impl AreaStats {
    pub fn compute(area_id: &str, week_key: &str, halqas: &[Halqa], meetings: &[Meeting]) -> Self {
        let ids: HashSet<&str> = halqas
            .iter()
            .filter(|h| h.area_id == area_id)
            .map(|h| h.id.as_str())
            .collect();

        let mut stats = AreaStats {
            total: ids.len() as u32,
            ..Self::default()
        };
        for m in meetings
            .iter()
            .filter(|m| m.week_start_date == week_key && ids.contains(m.halqa_id.as_str()))
        {
            match m.status {
                MeetingStatus::Completed => stats.completed += 1,
                MeetingStatus::Missed => stats.missed += 1,
                MeetingStatus::Cancelled => stats.cancelled += 1,
                MeetingStatus::Pending => {}
            }
        }
        stats.pending = stats.total.saturating_sub(stats.completed + stats.missed);
        stats
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub index: usize,
    pub area_name: String,
    pub halqa_id: String,
    pub halqa_name: String,
    pub status: MeetingStatus,
    pub held: bool,
    pub participation: usize,
    pub strength: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub week_key: String,
    pub rows: Vec<ReportRow>,
    pub held: usize,
    pub not_held: usize,
}

impl WeeklyReport {
    /// Rows ordered by area, then by halqa within the area.
    pub fn build(week_key: &str, areas: &[Area], halqas: &[Halqa], meetings: &[Meeting]) -> Self {
        let mut rows = Vec::new();
        for area in areas {
            for halqa in halqas.iter().filter(|h| h.area_id == area.id) {
                let meeting = meetings
                    .iter()
                    .find(|m| m.halqa_id == halqa.id && m.week_start_date == week_key);
                let status = meeting.map(|m| m.status).unwrap_or_default();
                rows.push(ReportRow {
                    index: rows.len() + 1,
                    area_name: area.name.clone(),
                    halqa_id: halqa.id.clone(),
                    halqa_name: halqa.name.clone(),
                    status,
                    held: status == MeetingStatus::Completed,
                    participation: meeting.map(|m| m.participation()).unwrap_or(0),
                    strength: halqa.strength(),
                });
            }
        }

        let held = rows.iter().filter(|r| r.held).count();
        WeeklyReport {
            week_key: week_key.to_string(),
            not_held: rows.len() - held,
            held,
            rows,
        }
    }
}
