use log::debug;

use crate::db::store::RecordStore;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Halqa, Meeting};
use crate::tracker::Tracker;

/// What a user-supplied identifier refers to, decided once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Halqa(String),
    Meeting(String),
}

/// Shortest id prefix accepted in place of a full id.
const MIN_PREFIX: usize = 4;

impl<S: RecordStore> Tracker<S> {
    /// Resolves `halqa:<id>`, `meeting:<id>` or a bare id.
    ///
    /// Bare ids are tried as halqa ids first, then as meeting ids. A unique
    /// prefix of a halqa id also matches.
    pub fn resolve_target(&self, input: &str) -> TrackerResult<Target> {
        let input = input.trim();
        if let Some(id) = input.strip_prefix("halqa:") {
            return Ok(Target::Halqa(id.to_string()));
        }
        if let Some(id) = input.strip_prefix("meeting:") {
            return Ok(Target::Meeting(id.to_string()));
        }
        if input.is_empty() {
            return Err(TrackerError::TargetNotFound(input.to_string()));
        }

        if self.halqas().iter().any(|h| h.id == input) {
            return Ok(Target::Halqa(input.to_string()));
        }
        match self.find_meeting(input) {
            Ok(m) => return Ok(Target::Meeting(m.id)),
            Err(TrackerError::MeetingNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        if input.len() >= MIN_PREFIX {
            let matches: Vec<&Halqa> = self
                .halqas()
                .iter()
                .filter(|h| h.id.starts_with(input))
                .collect();
            if let [only] = matches.as_slice() {
                debug!("'{}' resolved by prefix to halqa {}", input, only.id);
                return Ok(Target::Halqa(only.id.clone()));
            }
        }
        Err(TrackerError::TargetNotFound(input.to_string()))
    }

    /// The halqa and meeting a target denotes. Halqa targets open the active
    /// week's meeting, creating it if needed.
    pub fn open(&mut self, target: &Target) -> TrackerResult<(Halqa, Meeting)> {
        match target {
            Target::Halqa(id) => {
                let meeting = self.get_or_create_meeting(id)?;
                Ok((self.halqa(id)?.clone(), meeting))
            }
            Target::Meeting(id) => {
                let meeting = self.find_meeting(id)?;
                let halqa = self.halqa(&meeting.halqa_id)?.clone();
                Ok((halqa, meeting))
            }
        }
    }
}
