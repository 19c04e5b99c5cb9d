//! The entry collection and its reducer.
//!
//! Every operation takes `&self` and returns a new `Timetable`; the input is
//! left untouched, so callers can keep the previous value for undo or
//! comparison.

use crate::entry::{EntryDraft, EntryId, EntryPatch, EntryStatus, FieldErrors, ScheduleEntry};
use crate::semester::Semester;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimetableError {
    #[error("invalid schedule entry: {0}")]
    Validation(#[from] FieldErrors),
    #[error("schedule entry {0} not found")]
    NotFound(EntryId),
    #[error("duplicate schedule entry id {0}")]
    DuplicateId(EntryId),
    #[error("schedule entry {id} is invalid: {errors}")]
    InvalidEntry { id: EntryId, errors: FieldErrors },
    #[error("schedule entry ids are exhausted")]
    IdsExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create(EntryDraft),
    Update { id: EntryId, patch: EntryPatch },
    SetStatus { id: EntryId, status: EntryStatus },
    Delete(EntryId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    semester: Semester,
    entries: Vec<ScheduleEntry>,
    next_id: u32,
}

impl Default for Timetable {
    fn default() -> Self {
        Self::new(Semester::default())
    }
}

impl Timetable {
    pub fn new(semester: Semester) -> Self {
        Self {
            semester,
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Adopts entries supplied by the caller, checking id uniqueness and each
    /// entry's invariants against the semester.
    pub fn from_entries(
        semester: Semester,
        entries: Vec<ScheduleEntry>,
    ) -> Result<Self, TimetableError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(TimetableError::DuplicateId(entry.id));
            }
            entry
                .validate(semester.weeks)
                .map_err(|errors| TimetableError::InvalidEntry {
                    id: entry.id,
                    errors,
                })?;
        }
        let next_id = entries
            .iter()
            .map(|e| e.id.0)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(TimetableError::IdsExhausted)?;
        Ok(Self {
            semester,
            entries,
            next_id,
        })
    }

    pub fn semester(&self) -> &Semester {
        &self.semester
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries_for_class<'a>(
        &'a self,
        class_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleEntry> {
        self.entries.iter().filter(move |e| e.class_id == class_id)
    }

    pub fn entries_for_room<'a>(
        &'a self,
        room_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleEntry> {
        self.entries.iter().filter(move |e| e.room_id == room_id)
    }

    pub fn entries_for_teacher<'a>(
        &'a self,
        teacher_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleEntry> {
        self.entries
            .iter()
            .filter(move |e| e.teacher_id.as_deref() == Some(teacher_id))
    }

    fn position(&self, id: EntryId) -> Result<usize, TimetableError> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(TimetableError::NotFound(id))
    }

    /// Validates the draft and appends it as a new active entry with a fresh
    /// id. Ids come from a counter and are never handed out twice.
    pub fn create(&self, draft: EntryDraft) -> Result<(Self, ScheduleEntry), TimetableError> {
        let id = EntryId(self.next_id);
        let following = self
            .next_id
            .checked_add(1)
            .ok_or(TimetableError::IdsExhausted)?;
        let entry = draft
            .build(id, &self.semester.id, self.semester.weeks)
            .inspect_err(|errors| debug!(%errors, "rejected schedule entry draft"))?;

        let mut next = self.clone();
        next.entries.push(entry.clone());
        next.next_id = following;
        info!(
            id = %entry.id,
            course = %entry.course_id,
            class = %entry.class_id,
            day = entry.day_of_week,
            weeks = %entry.weeks,
            "created schedule entry"
        );
        Ok((next, entry))
    }

    pub fn update(&self, id: EntryId, patch: &EntryPatch) -> Result<Self, TimetableError> {
        let idx = self.position(id)?;
        let updated = patch.apply(&self.entries[idx], self.semester.weeks)?;
        let mut next = self.clone();
        next.entries[idx] = updated;
        debug!(%id, "updated schedule entry");
        Ok(next)
    }

    pub fn set_status(&self, id: EntryId, status: EntryStatus) -> Result<Self, TimetableError> {
        self.update(id, &EntryPatch::new().status(status))
    }

    /// Removes the entry outright.
    pub fn delete(&self, id: EntryId) -> Result<Self, TimetableError> {
        let idx = self.position(id)?;
        let mut next = self.clone();
        next.entries.remove(idx);
        info!(%id, "deleted schedule entry");
        Ok(next)
    }

    pub fn reduce(&self, action: Action) -> Result<Self, TimetableError> {
        match action {
            Action::Create(draft) => self.create(draft).map(|(next, _)| next),
            Action::Update { id, patch } => self.update(id, &patch),
            Action::SetStatus { id, status } => self.set_status(id, status),
            Action::Delete(id) => self.delete(id),
        }
    }
}
