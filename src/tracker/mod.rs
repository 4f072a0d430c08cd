pub mod admin;
pub mod target;

use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use serde_json::json;
use std::collections::BTreeMap;

use crate::calendar::{Week, add_weeks, parse_week_key, resolve_week};
use crate::db::store::{Collection, Filter, RecordStore, from_record, from_records, to_record};
use crate::error::{StoreError, TrackerError, TrackerResult};
use crate::models::agenda::{agenda_for, find_item};
use crate::models::{
    AgendaItem, Area, AreaStats, Halqa, Meeting, MeetingPatch, MeetingStatus, WeeklyReport,
};

pub use admin::AdminSession;
pub use target::Target;

/// Areas, halqas and the active week's meetings, cached over a record store.
///
/// Meetings are created lazily on first access and mutated optimistically:
/// the cached copy changes first, then the same partial update is written to
/// the store. A failed write is logged and returned; the cached copy keeps
/// the change and must be treated as provisional.
pub struct Tracker<S: RecordStore> {
    store: S,
    week: Week,
    areas: Vec<Area>,
    halqas: Vec<Halqa>,
    meetings: Vec<Meeting>,
}

/// Everything needed to show or edit one meeting.
#[derive(Debug, Clone)]
pub struct MeetingView {
    pub halqa: Halqa,
    pub meeting: Meeting,
    pub week: Week,
    pub agenda: &'static [AgendaItem],
}

impl MeetingView {
    pub fn attendance_count(&self) -> usize {
        self.meeting.participation()
    }

    pub fn agenda_count(&self) -> usize {
        self.agenda
            .iter()
            .filter(|item| self.meeting.is_covered(item.id))
            .count()
    }
}

impl<S: RecordStore> Tracker<S> {
    /// Opens a tracker on `week`, loading areas, halqas and that week's meetings.
    pub fn load(store: S, week: Week) -> TrackerResult<Self> {
        let mut tracker = Tracker {
            store,
            week,
            areas: Vec::new(),
            halqas: Vec::new(),
            meetings: Vec::new(),
        };
        tracker.reload()?;
        Ok(tracker)
    }

    pub fn reload(&mut self) -> TrackerResult<()> {
        self.areas = from_records(self.store.query(Collection::Areas, &[])?)?;
        self.halqas = from_records(self.store.query(Collection::Halqas, &[])?)?;
        if self.areas.is_empty() {
            info!("No areas found in store");
        }
        self.refresh_meetings()
    }

    /// Re-reads the active week's meetings.
    pub fn refresh_meetings(&mut self) -> TrackerResult<()> {
        if self.halqas.is_empty() {
            self.meetings.clear();
            return Ok(());
        }
        let records = self.store.query(
            Collection::Meetings,
            &[Filter::eq("week_start_date", self.week.key())],
        )?;
        self.meetings = from_records(records)?;
        debug!("Loaded {} meetings for week {}", self.meetings.len(), self.week.key());
        Ok(())
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn week(&self) -> &Week {
        &self.week
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn halqas(&self) -> &[Halqa] {
        &self.halqas
    }

    #[cfg(test)]
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    // ─── Week navigation ────────────────────────────────────────────────────

    pub fn change_week(&mut self, offset: i32) -> TrackerResult<Week> {
        let week = add_weeks(self.week.start, offset);
        self.set_week(week)
    }

    pub fn go_to_date(&mut self, date: NaiveDate) -> TrackerResult<Week> {
        self.set_week(resolve_week(date))
    }

    pub fn go_to_today(&mut self) -> TrackerResult<Week> {
        self.go_to_date(Local::now().date_naive())
    }

    fn set_week(&mut self, week: Week) -> TrackerResult<Week> {
        if week != self.week {
            self.week = week;
            self.refresh_meetings()?;
        }
        Ok(self.week)
    }

    // ─── Lookups ────────────────────────────────────────────────────────────

    pub fn area(&self, area_id: &str) -> TrackerResult<&Area> {
        self.areas
            .iter()
            .find(|a| a.id == area_id)
            .ok_or_else(|| TrackerError::AreaNotFound(area_id.to_string()))
    }

    pub fn halqa(&self, halqa_id: &str) -> TrackerResult<&Halqa> {
        self.halqas
            .iter()
            .find(|h| h.id == halqa_id)
            .ok_or_else(|| TrackerError::HalqaNotFound(halqa_id.to_string()))
    }

    pub fn halqas_in_area(&self, area_id: &str) -> Vec<&Halqa> {
        self.halqas.iter().filter(|h| h.area_id == area_id).collect()
    }

    /// The active week's meeting for a halqa, if one has been recorded.
    pub fn meeting_for(&self, halqa_id: &str) -> Option<&Meeting> {
        self.meetings.iter().find(|m| m.halqa_id == halqa_id)
    }

    /// Status for the active week; halqas without a record are pending.
    pub fn status_of(&self, halqa_id: &str) -> MeetingStatus {
        self.meeting_for(halqa_id).map(|m| m.status).unwrap_or_default()
    }

    /// A meeting by id, from the cache or else the store.
    pub fn find_meeting(&self, meeting_id: &str) -> TrackerResult<Meeting> {
        if let Some(m) = self.meetings.iter().find(|m| m.id == meeting_id) {
            return Ok(m.clone());
        }
        match self
            .store
            .find_one(Collection::Meetings, &[Filter::id(meeting_id)])?
        {
            Some(record) => Ok(from_record(record)?),
            None => Err(TrackerError::MeetingNotFound(meeting_id.to_string())),
        }
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// The active week's meeting for `halqa_id`, created as pending if absent.
    pub fn get_or_create_meeting(&mut self, halqa_id: &str) -> TrackerResult<Meeting> {
        let week = self.week;
        self.get_or_create_meeting_in(halqa_id, &week)
    }

    /// Finds the `(halqa, week)` meeting or creates it in pending state.
    ///
    /// Idempotent. The store enforces one meeting per `(halqa, week start)`;
    /// losing a creation race re-reads the winner's record.
    pub fn get_or_create_meeting_in(&mut self, halqa_id: &str, week: &Week) -> TrackerResult<Meeting> {
        self.halqa(halqa_id)?;
        let key = week.key();
        let active = *week == self.week;

        if active {
            if let Some(m) = self.meeting_for(halqa_id) {
                return Ok(m.clone());
            }
        }

        let filters = [
            Filter::eq("halqa_id", halqa_id),
            Filter::eq("week_start_date", key.as_str()),
        ];
        let meeting: Meeting = match self.store.find_one(Collection::Meetings, &filters)? {
            Some(record) => from_record(record)?,
            None => {
                let fresh = json!({
                    "halqa_id": halqa_id,
                    "week_start_date": key,
                    "status": MeetingStatus::Pending,
                    "attendance": {},
                    "agenda_status": {},
                });
                match self.store.insert(Collection::Meetings, vec![to_record(&fresh)?]) {
                    Ok(mut inserted) if !inserted.is_empty() => {
                        info!("Created pending meeting for halqa {} week {}", halqa_id, key);
                        from_record(inserted.remove(0))?
                    }
                    Ok(_) => return Err(TrackerError::MeetingNotFound(format!("{halqa_id}@{key}"))),
                    Err(StoreError::Conflict(_)) => {
                        warn!("Meeting for halqa {} week {} created concurrently", halqa_id, key);
                        let record = self
                            .store
                            .find_one(Collection::Meetings, &filters)?
                            .ok_or_else(|| TrackerError::MeetingNotFound(format!("{halqa_id}@{key}")))?;
                        from_record(record)?
                    }
                    Err(e) => {
                        error!("Error creating meeting for halqa {}: {}", halqa_id, e);
                        return Err(e.into());
                    }
                }
            }
        };

        if active && !self.meetings.iter().any(|m| m.id == meeting.id) {
            self.meetings.push(meeting.clone());
        }
        Ok(meeting)
    }

    /// Applies `patch` to the cached meeting immediately, then persists it.
    ///
    /// On a store failure the cached copy keeps the change and the error is
    /// returned; re-issuing the same patch is safe.
    pub fn update_meeting(&mut self, meeting_id: &str, patch: &MeetingPatch) -> TrackerResult<Meeting> {
        let updated = match self.meetings.iter_mut().find(|m| m.id == meeting_id) {
            Some(cached) => {
                cached.apply(patch);
                cached.clone()
            }
            None => {
                let mut fetched = self.find_meeting(meeting_id)?;
                fetched.apply(patch);
                fetched
            }
        };
        if patch.is_empty() {
            return Ok(updated);
        }

        let fields = to_record(patch)?;
        match self
            .store
            .update(Collection::Meetings, &[Filter::id(meeting_id)], &fields)
        {
            Ok(0) => {
                warn!("Meeting {} vanished before update was stored", meeting_id);
                Err(TrackerError::MeetingNotFound(meeting_id.to_string()))
            }
            Ok(_) => Ok(updated),
            Err(e) => {
                error!("Error updating meeting {}: {}", meeting_id, e);
                Err(e.into())
            }
        }
    }

    pub fn toggle_attendance(&mut self, meeting_id: &str, member_id: &str) -> TrackerResult<Meeting> {
        let meeting = self.find_meeting(meeting_id)?;
        let halqa = self.halqa(&meeting.halqa_id)?;
        if halqa.member(member_id).is_none() {
            return Err(TrackerError::InvalidInput(format!(
                "'{}' is not a member of {}",
                member_id, halqa.name
            )));
        }

        let mut attendance = meeting.attendance;
        let present = attendance.get(member_id).copied().unwrap_or(false);
        attendance.insert(member_id.to_string(), !present);
        let patch = MeetingPatch {
            attendance: Some(attendance),
            ..MeetingPatch::default()
        };
        self.update_meeting(meeting_id, &patch)
    }

    pub fn toggle_agenda(&mut self, meeting_id: &str, item_id: &str) -> TrackerResult<Meeting> {
        let meeting = self.find_meeting(meeting_id)?;
        let ordinal = self.week_of(&meeting).ordinal;
        if find_item(ordinal, item_id).is_none() {
            return Err(TrackerError::InvalidInput(format!(
                "'{}' is not on the week {} agenda",
                item_id, ordinal
            )));
        }

        let mut agenda: BTreeMap<String, bool> = meeting.agenda_status;
        let done = agenda.get(item_id).copied().unwrap_or(false);
        agenda.insert(item_id.to_string(), !done);
        let patch = MeetingPatch {
            agenda_status: Some(agenda),
            ..MeetingPatch::default()
        };
        self.update_meeting(meeting_id, &patch)
    }

    /// Any status may follow any other. A reason is not required.
    pub fn set_status(&mut self, meeting_id: &str, status: MeetingStatus) -> TrackerResult<Meeting> {
        self.update_meeting(meeting_id, &MeetingPatch::status(status))
    }

    /// Records why the meeting did not happen, in the field matching its
    /// current status (`cancelled_reason` when cancelled, else `missed_reason`).
    pub fn set_reason(&mut self, meeting_id: &str, reason: &str) -> TrackerResult<Meeting> {
        let meeting = self.find_meeting(meeting_id)?;
        let patch = if meeting.status == MeetingStatus::Cancelled {
            MeetingPatch {
                cancelled_reason: Some(reason.to_string()),
                ..MeetingPatch::default()
            }
        } else {
            MeetingPatch {
                missed_reason: Some(reason.to_string()),
                ..MeetingPatch::default()
            }
        };
        self.update_meeting(meeting_id, &patch)
    }

    pub fn set_notes(&mut self, meeting_id: &str, notes: &str) -> TrackerResult<Meeting> {
        let patch = MeetingPatch {
            notes: Some(notes.to_string()),
            ..MeetingPatch::default()
        };
        self.update_meeting(meeting_id, &patch)
    }

    // ─── Views & aggregation ────────────────────────────────────────────────

    /// The custom week a meeting belongs to, from its stored week key.
    pub fn week_of(&self, meeting: &Meeting) -> Week {
        match parse_week_key(&meeting.week_start_date) {
            Some(start) => resolve_week(start),
            None => {
                warn!(
                    "Meeting {} has unreadable week '{}'",
                    meeting.id, meeting.week_start_date
                );
                self.week
            }
        }
    }

    pub fn meeting_view(&self, meeting: Meeting) -> TrackerResult<MeetingView> {
        let halqa = self.halqa(&meeting.halqa_id)?.clone();
        let week = self.week_of(&meeting);
        Ok(MeetingView {
            halqa,
            agenda: agenda_for(week.ordinal),
            week,
            meeting,
        })
    }

    pub fn area_stats(&self, area_id: &str) -> AreaStats {
        AreaStats::compute(area_id, &self.week.key(), &self.halqas, &self.meetings)
    }

    pub fn all_area_stats(&self) -> Vec<(&Area, AreaStats)> {
        self.areas
            .iter()
            .map(|a| (a, self.area_stats(&a.id)))
            .collect()
    }

    pub fn weekly_report(&self) -> WeeklyReport {
        WeeklyReport::build(&self.week.key(), &self.areas, &self.halqas, &self.meetings)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::db::store::Record;
    use crate::models::Member;
    use std::cell::Cell;

    pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let areas = vec![
            Area { id: "north".into(), name: "North Area".into(), color: "#00f".into() },
            Area { id: "south".into(), name: "South Area".into(), color: "#f00".into() },
        ];
        let halqas = vec![
            halqa("h1", "north", &["m1", "m2", "m3"]),
            halqa("h2", "north", &["m4"]),
            halqa("h3", "south", &["m5", "m6"]),
        ];
        store
            .insert(Collection::Areas, areas.iter().map(|a| to_record(a).unwrap()).collect())
            .unwrap();
        store
            .insert(Collection::Halqas, halqas.iter().map(|h| to_record(h).unwrap()).collect())
            .unwrap();
        store
    }

    fn halqa(id: &str, area: &str, members: &[&str]) -> Halqa {
        Halqa {
            id: id.into(),
            area_id: area.into(),
            name: format!("Halqa {id}"),
            meeting_day: "Thursday".into(),
            members: members
                .iter()
                .map(|m| Member { id: m.to_string(), name: m.to_uppercase(), halqa_id: Some(id.into()) })
                .collect(),
        }
    }

    pub(crate) fn tracker() -> Tracker<SqliteStore> {
        Tracker::load(seeded_store(), resolve_week(d(2024, 10, 17))).unwrap()
    }

    /// Store whose writes can be switched off to exercise failure handling.
    pub(crate) struct FlakyStore {
        pub(crate) inner: SqliteStore,
        pub(crate) fail_writes: Cell<bool>,
    }

    impl RecordStore for FlakyStore {
        fn query(&self, c: Collection, f: &[Filter]) -> crate::error::StoreResult<Vec<Record>> {
            self.inner.query(c, f)
        }

        fn insert(&self, c: Collection, r: Vec<Record>) -> crate::error::StoreResult<Vec<Record>> {
            self.inner.insert(c, r)
        }

        fn update(&self, c: Collection, f: &[Filter], fields: &Record) -> crate::error::StoreResult<usize> {
            if self.fail_writes.get() {
                return Err(StoreError::Decode("store offline".into()));
            }
            self.inner.update(c, f, fields)
        }

        fn delete(&self, c: Collection, f: &[Filter]) -> crate::error::StoreResult<usize> {
            self.inner.delete(c, f)
        }
    }

    /// Another session creates the meeting between our lookup and our insert.
    struct RacingStore {
        inner: SqliteStore,
        raced: Cell<bool>,
    }

    impl RecordStore for RacingStore {
        fn query(&self, c: Collection, f: &[Filter]) -> crate::error::StoreResult<Vec<Record>> {
            let keyed = c == Collection::Meetings
                && f.iter().any(|f| f.column == "halqa_id")
                && f.iter().any(|f| f.column == "week_start_date");
            if keyed && !self.raced.get() {
                self.raced.set(true);
                let rival = json!({
                    "id": "rival",
                    "halqa_id": f.iter().find(|f| f.column == "halqa_id").map(|f| f.value.clone()),
                    "week_start_date": f.iter().find(|f| f.column == "week_start_date").map(|f| f.value.clone()),
                    "status": "completed",
                });
                self.inner.insert(Collection::Meetings, vec![to_record(&rival)?])?;
                return Ok(Vec::new());
            }
            self.inner.query(c, f)
        }

        fn insert(&self, c: Collection, r: Vec<Record>) -> crate::error::StoreResult<Vec<Record>> {
            self.inner.insert(c, r)
        }

        fn update(&self, c: Collection, f: &[Filter], fields: &Record) -> crate::error::StoreResult<usize> {
            self.inner.update(c, f, fields)
        }

        fn delete(&self, c: Collection, f: &[Filter]) -> crate::error::StoreResult<usize> {
            self.inner.delete(c, f)
        }
    }

    #[test]
    fn test_get_or_create_rereads_concurrently_created_meeting() {
        let store = RacingStore { inner: seeded_store(), raced: Cell::new(false) };
        let mut t = Tracker::load(store, resolve_week(d(2024, 10, 17))).unwrap();

        let first = t.get_or_create_meeting("h1").unwrap();
        assert_eq!(first.id, "rival");
        assert_eq!(first.status, MeetingStatus::Completed);

        let second = t.get_or_create_meeting("h1").unwrap();
        assert_eq!(second.id, "rival");
        assert_eq!(t.meetings().len(), 1);
        assert_eq!(t.meetings()[0].id, "rival");
        assert_eq!(t.store().inner.query(Collection::Meetings, &[]).unwrap().len(), 1);
        assert_eq!(t.area_stats("north").completed, 1);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut t = tracker();
        assert!(t.meeting_for("h1").is_none());
        let first = t.get_or_create_meeting("h1").unwrap();
        assert_eq!(first.status, MeetingStatus::Pending);
        assert_eq!(first.week_start_date, "2024-10-15");
        assert!(first.attendance.is_empty());
        assert!(first.agenda_status.is_empty());

        let second = t.get_or_create_meeting("h1").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(t.meetings().len(), 1);
        assert_eq!(t.store().query(Collection::Meetings, &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_get_or_create_finds_record_missing_from_cache() {
        let mut t = tracker();
        let created = t.get_or_create_meeting("h2").unwrap();

        // A second session that loaded before the meeting existed.
        let mut stale = Tracker::load(seeded_store(), *t.week()).unwrap();
        std::mem::swap(&mut stale.store, &mut t.store);
        stale.meetings.clear();
        let found = stale.get_or_create_meeting("h2").unwrap();
        assert_eq!(found.id, created.id);
    }

    #[test]
    fn test_get_or_create_unknown_halqa() {
        let mut t = tracker();
        let err = t.get_or_create_meeting("nope").unwrap_err();
        assert!(matches!(err, TrackerError::HalqaNotFound(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_or_create_in_other_week_leaves_cache() {
        let mut t = tracker();
        let other = resolve_week(d(2024, 10, 29));
        let m = t.get_or_create_meeting_in("h1", &other).unwrap();
        assert_eq!(m.week_start_date, "2024-10-29");
        assert!(t.meetings().is_empty());
    }

    #[test]
    fn test_toggles_and_status() {
        let mut t = tracker();
        let m = t.get_or_create_meeting("h1").unwrap();

        t.toggle_attendance(&m.id, "m1").unwrap();
        t.toggle_attendance(&m.id, "m2").unwrap();
        let m2 = t.toggle_attendance(&m.id, "m2").unwrap();
        assert!(m2.is_present("m1"));
        assert!(!m2.is_present("m2"));

        t.toggle_agenda(&m.id, "target_eval").unwrap_err();
        let m3 = t.toggle_agenda(&m.id, "pothu").unwrap();
        assert!(m3.is_covered("pothu"));

        t.set_status(&m.id, MeetingStatus::Completed).unwrap();

        let stored: Meeting = from_record(
            t.store().find_one(Collection::Meetings, &[Filter::id(&m.id)]).unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(stored.status, MeetingStatus::Completed);
        assert_eq!(stored.participation(), 1);
        assert!(stored.is_covered("pothu"));
        assert_eq!(t.meeting_for("h1"), Some(&stored));
    }

    #[test]
    fn test_toggle_rejects_unknown_member() {
        let mut t = tracker();
        let m = t.get_or_create_meeting("h1").unwrap();
        let err = t.toggle_attendance(&m.id, "m5").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
    }

    #[test]
    fn test_any_status_transition_allowed() {
        let mut t = tracker();
        let m = t.get_or_create_meeting("h3").unwrap();
        for from in MeetingStatus::all() {
            for to in MeetingStatus::all() {
                t.set_status(&m.id, from).unwrap();
                assert_eq!(t.set_status(&m.id, to).unwrap().status, to);
            }
        }
    }

    #[test]
    fn test_reason_follows_status() {
        let mut t = tracker();
        let m = t.get_or_create_meeting("h1").unwrap();
        t.set_status(&m.id, MeetingStatus::Missed).unwrap();
        let missed = t.set_reason(&m.id, "heavy rain").unwrap();
        assert_eq!(missed.missed_reason.as_deref(), Some("heavy rain"));

        t.set_status(&m.id, MeetingStatus::Cancelled).unwrap();
        let cancelled = t.set_reason(&m.id, "venue closed").unwrap();
        assert_eq!(cancelled.cancelled_reason.as_deref(), Some("venue closed"));
        assert_eq!(cancelled.reason(), Some("venue closed"));
        assert_eq!(cancelled.missed_reason.as_deref(), Some("heavy rain"));
    }

    #[test]
    fn test_failed_write_keeps_optimistic_copy() {
        let store = FlakyStore { inner: seeded_store(), fail_writes: Cell::new(false) };
        let mut t = Tracker::load(store, resolve_week(d(2024, 10, 17))).unwrap();
        let m = t.get_or_create_meeting("h1").unwrap();

        t.store().fail_writes.set(true);
        let err = t.set_status(&m.id, MeetingStatus::Completed).unwrap_err();
        assert!(matches!(err, TrackerError::Store(_)));
        assert_eq!(t.status_of("h1"), MeetingStatus::Completed);

        // Retrying once the store is back persists the same change.
        t.store().fail_writes.set(false);
        t.set_status(&m.id, MeetingStatus::Completed).unwrap();
        t.refresh_meetings().unwrap();
        assert_eq!(t.status_of("h1"), MeetingStatus::Completed);
    }

    #[test]
    fn test_update_unknown_meeting() {
        let mut t = tracker();
        let err = t.set_status("missing", MeetingStatus::Missed).unwrap_err();
        assert!(matches!(err, TrackerError::MeetingNotFound(_)));
    }

    #[test]
    fn test_week_navigation_reloads_meetings() {
        let mut t = tracker();
        t.get_or_create_meeting("h1").unwrap();
        assert_eq!(t.meetings().len(), 1);

        let next = t.change_week(1).unwrap();
        assert_eq!(next.start, d(2024, 10, 22));
        assert!(t.meetings().is_empty());
        assert_eq!(t.status_of("h1"), MeetingStatus::Pending);

        let back = t.change_week(-1).unwrap();
        assert_eq!(back.start, d(2024, 10, 15));
        assert_eq!(t.meetings().len(), 1);

        let leap = t.go_to_date(d(2024, 2, 29)).unwrap();
        assert_eq!(leap.ordinal, 5);
        assert_eq!(t.change_week(1).unwrap().start, d(2024, 3, 1));
    }

    #[test]
    fn test_area_stats_for_active_week() {
        let mut t = tracker();
        let m1 = t.get_or_create_meeting("h1").unwrap();
        t.set_status(&m1.id, MeetingStatus::Completed).unwrap();
        let m3 = t.get_or_create_meeting("h3").unwrap();
        t.set_status(&m3.id, MeetingStatus::Missed).unwrap();

        let north = t.area_stats("north");
        assert_eq!((north.total, north.completed, north.missed, north.pending), (2, 1, 0, 1));
        let south = t.area_stats("south");
        assert_eq!((south.total, south.completed, south.missed, south.pending), (1, 0, 1, 0));

        t.change_week(1).unwrap();
        assert_eq!(t.area_stats("north").pending, 2);
        assert_eq!(t.all_area_stats().len(), 2);
    }

    #[test]
    fn test_meeting_view_uses_week_agenda() {
        let mut t = tracker();
        t.go_to_date(d(2024, 10, 2)).unwrap();
        let m = t.get_or_create_meeting("h1").unwrap();
        t.toggle_agenda(&m.id, "target_eval").unwrap();
        let m = t.toggle_agenda(&m.id, "quran").unwrap();
        let view = t.meeting_view(m).unwrap();
        assert_eq!(view.week.ordinal, 1);
        assert_eq!(view.agenda, agenda_for(1));
        assert_eq!(view.agenda_count(), 2);
        assert_eq!(view.halqa.id, "h1");
    }

    #[test]
    fn test_weekly_report_reflects_cache() {
        let mut t = tracker();
        let m = t.get_or_create_meeting("h2").unwrap();
        t.toggle_attendance(&m.id, "m4").unwrap();
        t.set_status(&m.id, MeetingStatus::Completed).unwrap();
        let report = t.weekly_report();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.held, 1);
        let row = report.rows.iter().find(|r| r.halqa_id == "h2").unwrap();
        assert_eq!((row.participation, row.strength), (1, 1));
    }
}
