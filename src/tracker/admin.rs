use chrono::{DateTime, Local};
use log::{error, info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::db::seed::seed_demo;
use crate::db::store::{Collection, Filter, RecordStore, from_record, to_record};
use crate::error::{StoreError, TrackerError, TrackerResult};
use crate::models::{Area, Halqa, Member};
use crate::tracker::Tracker;

/// Proof of an admin login. Every administrative change takes one.
#[derive(Debug, Clone)]
pub struct AdminSession {
    issued_at: DateTime<Local>,
}

impl AdminSession {
    pub fn login(config: &AdminConfig, password: &str) -> TrackerResult<Self> {
        if config.password.is_empty() || config.password != password {
            warn!("Rejected admin login");
            return Err(TrackerError::Unauthorized);
        }
        Ok(Self {
            issued_at: Local::now(),
        })
    }

    pub fn issued_at(&self) -> DateTime<Local> {
        self.issued_at
    }
}

/// Lowercase, dash-separated id derived from a display name.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn require_name(name: &str) -> TrackerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::InvalidInput("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

impl<S: RecordStore> Tracker<S> {
    pub fn add_area(&mut self, _session: &AdminSession, name: &str, color: &str) -> TrackerResult<Area> {
        let name = require_name(name)?;
        let id = slugify(&name);
        if id.is_empty() {
            return Err(TrackerError::InvalidInput(format!("cannot derive an id from '{name}'")));
        }
        let area = Area {
            id,
            name,
            color: color.to_string(),
        };
        let inserted = match self.store.insert(Collection::Areas, vec![to_record(&area)?]) {
            Ok(inserted) => inserted,
            Err(StoreError::Conflict(_)) => {
                return Err(TrackerError::InvalidInput(format!("area '{}' already exists", area.id)));
            }
            Err(e) => return Err(e.into()),
        };
        let area: Area = match inserted.into_iter().next() {
            Some(record) => from_record(record)?,
            None => area,
        };
        info!("Added area {}", area.id);
        self.areas.push(area.clone());
        Ok(area)
    }

    pub fn rename_area(&mut self, _session: &AdminSession, area_id: &str, name: &str) -> TrackerResult<()> {
        let name = require_name(name)?;
        self.area(area_id)?;
        if let Some(area) = self.areas.iter_mut().find(|a| a.id == area_id) {
            area.name = name.clone();
        }
        self.store
            .update(
                Collection::Areas,
                &[Filter::id(area_id)],
                &to_record(&json!({ "name": name }))?,
            )
            .inspect_err(|e| error!("Error renaming area {}: {}", area_id, e))?;
        Ok(())
    }

    /// Adds a halqa with no members, meeting on the given weekday.
    pub fn add_halqa(
        &mut self,
        _session: &AdminSession,
        area_id: &str,
        name: &str,
        meeting_day: &str,
    ) -> TrackerResult<Halqa> {
        let name = require_name(name)?;
        self.area(area_id)?;
        let fresh = json!({
            "area_id": area_id,
            "name": name,
            "meeting_day": meeting_day,
            "members": [],
        });
        let record = self
            .store
            .insert(Collection::Halqas, vec![to_record(&fresh)?])
            .inspect_err(|e| error!("Error adding halqa: {}", e))?
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::HalqaNotFound(name.clone()))?;
        let halqa: Halqa = from_record(record)?;
        info!("Added halqa {} to area {}", halqa.id, area_id);
        self.halqas.push(halqa.clone());
        Ok(halqa)
    }

    pub fn rename_halqa(&mut self, _session: &AdminSession, halqa_id: &str, name: &str) -> TrackerResult<()> {
        let name = require_name(name)?;
        self.halqa(halqa_id)?;
        if let Some(h) = self.halqas.iter_mut().find(|h| h.id == halqa_id) {
            h.name = name.clone();
        }
        self.store
            .update(
                Collection::Halqas,
                &[Filter::id(halqa_id)],
                &to_record(&json!({ "name": name }))?,
            )
            .inspect_err(|e| error!("Error renaming halqa {}: {}", halqa_id, e))?;
        Ok(())
    }

    /// Removes a halqa together with all of its meetings.
    pub fn delete_halqa(&mut self, _session: &AdminSession, halqa_id: &str) -> TrackerResult<()> {
        self.halqa(halqa_id)?;
        self.halqas.retain(|h| h.id != halqa_id);
        self.meetings.retain(|m| m.halqa_id != halqa_id);

        let meetings = self
            .store
            .delete(Collection::Meetings, &[Filter::eq("halqa_id", halqa_id)])?;
        self.store
            .delete(Collection::Halqas, &[Filter::id(halqa_id)])
            .inspect_err(|e| error!("Error deleting halqa {}: {}", halqa_id, e))?;
        info!("Deleted halqa {} and {} meetings", halqa_id, meetings);
        Ok(())
    }

    /// Replaces a halqa's member list wholesale.
    pub fn replace_members(
        &mut self,
        _session: &AdminSession,
        halqa_id: &str,
        members: Vec<Member>,
    ) -> TrackerResult<Halqa> {
        self.halqa(halqa_id)?;
        let halqa = match self.halqas.iter_mut().find(|h| h.id == halqa_id) {
            Some(h) => {
                h.members = members;
                h.clone()
            }
            None => return Err(TrackerError::HalqaNotFound(halqa_id.to_string())),
        };

        self.store
            .update(
                Collection::Halqas,
                &[Filter::id(halqa_id)],
                &to_record(&json!({ "members": halqa.members }))?,
            )
            .inspect_err(|e| error!("Error updating halqa members: {}", e))?;
        Ok(halqa)
    }

    pub fn add_member(&mut self, session: &AdminSession, halqa_id: &str, name: &str) -> TrackerResult<Member> {
        let name = require_name(name)?;
        let mut members = self.halqa(halqa_id)?.members.clone();
        let member = Member {
            id: format!("m-{}", &Uuid::new_v4().simple().to_string()[..8]),
            name,
            halqa_id: Some(halqa_id.to_string()),
        };
        members.push(member.clone());
        self.replace_members(session, halqa_id, members)?;
        Ok(member)
    }

    pub fn rename_member(
        &mut self,
        session: &AdminSession,
        halqa_id: &str,
        member_id: &str,
        name: &str,
    ) -> TrackerResult<()> {
        let name = require_name(name)?;
        let mut members = self.halqa(halqa_id)?.members.clone();
        let member = members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| TrackerError::InvalidInput(format!("no member '{member_id}'")))?;
        member.name = name;
        self.replace_members(session, halqa_id, members)?;
        Ok(())
    }

    /// Past attendance entries for the member are left in place.
    pub fn remove_member(&mut self, session: &AdminSession, halqa_id: &str, member_id: &str) -> TrackerResult<()> {
        let mut members = self.halqa(halqa_id)?.members.clone();
        let before = members.len();
        members.retain(|m| m.id != member_id);
        if members.len() == before {
            return Err(TrackerError::InvalidInput(format!("no member '{member_id}'")));
        }
        self.replace_members(session, halqa_id, members)?;
        Ok(())
    }

    /// Seeds demo areas and halqas into an empty store and reloads.
    pub fn seed_demo(&mut self, _session: &AdminSession, meeting_day: &str) -> TrackerResult<usize> {
        let inserted = seed_demo(&self.store, meeting_day)?;
        self.reload()?;
        Ok(inserted)
    }
}
