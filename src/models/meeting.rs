use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    #[default]
    Pending,
    Completed,
    Missed,
    Cancelled,
}

impl MeetingStatus {
    pub fn all() -> [MeetingStatus; 4] {
        [
            MeetingStatus::Pending,
            MeetingStatus::Completed,
            MeetingStatus::Missed,
            MeetingStatus::Cancelled,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Missed => "missed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MeetingStatus::Pending),
            "completed" | "done" | "held" => Ok(MeetingStatus::Completed),
            "missed" => Ok(MeetingStatus::Missed),
            "cancelled" | "canceled" => Ok(MeetingStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Unknown meeting status: {}", s)),
        }
    }
}

/// One week's attendance and agenda record for one halqa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub halqa_id: String,
    pub week_start_date: String,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default)]
    pub attendance: BTreeMap<String, bool>,
    #[serde(default)]
    pub agenda_status: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missed_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Meeting {
    pub fn participation(&self) -> usize {
        self.attendance.values().filter(|present| **present).count()
    }

    pub fn is_present(&self, member_id: &str) -> bool {
        self.attendance.get(member_id).copied().unwrap_or(false)
    }

    pub fn is_covered(&self, item_id: &str) -> bool {
        self.agenda_status.get(item_id).copied().unwrap_or(false)
    }

    /// Reason matching the current status, if any.
    pub fn reason(&self) -> Option<&str> {
        match self.status {
            MeetingStatus::Cancelled => self.cancelled_reason.as_deref(),
            _ => self.missed_reason.as_deref(),
        }
    }

    /// Merges a partial update into this copy.
    pub fn apply(&mut self, patch: &MeetingPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(attendance) = &patch.attendance {
            self.attendance = attendance.clone();
        }
        if let Some(agenda) = &patch.agenda_status {
            self.agenda_status = agenda.clone();
        }
        if let Some(reason) = &patch.missed_reason {
            self.missed_reason = Some(reason.clone());
        }
        if let Some(reason) = &patch.cancelled_reason {
            self.cancelled_reason = Some(reason.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
    }
}

/// Partial meeting update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MeetingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda_status: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MeetingPatch {
    pub fn status(status: MeetingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
