//! Step-by-step entry creation.
//!
//! `SelectCourse → SelectSlot → SelectWeeks → Review`. Moving forward is
//! gated on the fields owned by the current step; moving back is always
//! allowed. Field setters work in any step so a form can be pre-filled.

use crate::catalog::Catalog;
use crate::entry::{EntryDraft, EntryField, FieldErrors};
use crate::week_selector::{self, WeekPattern};
use crate::week_set::WeekSetError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SelectCourse,
    SelectSlot,
    SelectWeeks,
    Review,
}

impl WizardStep {
    /// Fields whose validity gates leaving this step.
    pub fn fields(&self) -> &'static [EntryField] {
        match self {
            WizardStep::SelectCourse => &[EntryField::Course, EntryField::Class],
            WizardStep::SelectSlot => &[EntryField::DayOfWeek, EntryField::Time, EntryField::Room],
            WizardStep::SelectWeeks => &[EntryField::Weeks],
            WizardStep::Review => &[
                EntryField::Course,
                EntryField::Class,
                EntryField::DayOfWeek,
                EntryField::Time,
                EntryField::Room,
                EntryField::Weeks,
            ],
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectCourse => Some(WizardStep::SelectSlot),
            WizardStep::SelectSlot => Some(WizardStep::SelectWeeks),
            WizardStep::SelectWeeks => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectCourse => None,
            WizardStep::SelectSlot => Some(WizardStep::SelectCourse),
            WizardStep::SelectWeeks => Some(WizardStep::SelectSlot),
            WizardStep::Review => Some(WizardStep::SelectWeeks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("cannot finish from step {0:?}")]
    NotAtReview(WizardStep),
}

#[derive(Debug, Clone)]
pub struct EntryWizard<'c> {
    catalog: &'c Catalog,
    semester_weeks: u32,
    step: WizardStep,
    draft: EntryDraft,
}

impl<'c> EntryWizard<'c> {
    pub fn new(catalog: &'c Catalog, semester_weeks: u32) -> Self {
        Self {
            catalog,
            semester_weeks,
            step: WizardStep::SelectCourse,
            draft: EntryDraft::new(),
        }
    }

    /// Starts from an existing draft, e.g. when duplicating an entry.
    pub fn with_draft(mut self, draft: EntryDraft) -> Self {
        self.draft = draft;
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    /// Picks the course and fills in its teacher from the catalog.
    pub fn set_course(&mut self, course_id: &str) {
        self.draft.course_id = Some(course_id.to_string());
        self.draft.teacher_id = self
            .catalog
            .course(course_id)
            .and_then(|course| course.teacher_id.clone());
    }

    pub fn set_class(&mut self, class_id: &str) {
        self.draft.class_id = Some(class_id.to_string());
    }

    pub fn set_category(&mut self, category: Option<&str>) {
        self.draft.category = category.map(str::to_string);
    }

    pub fn set_day(&mut self, day_of_week: u8) {
        self.draft.day_of_week = Some(day_of_week);
    }

    /// Copies start and end from the named catalog slot.
    pub fn set_slot(&mut self, slot_id: &str) -> Result<(), FieldErrors> {
        match self.catalog.time_slots().get(slot_id) {
            Some(slot) => {
                self.draft.start = Some(slot.start);
                self.draft.end = Some(slot.end);
                Ok(())
            }
            None => {
                let mut errors = FieldErrors::new();
                errors.insert(EntryField::Time, format!("unknown time slot '{slot_id}'"));
                Err(errors)
            }
        }
    }

    pub fn set_room(&mut self, room_id: &str) {
        self.draft.room_id = Some(room_id.to_string());
    }

    pub fn apply_pattern(&mut self, pattern: WeekPattern) {
        self.draft.weeks = week_selector::select(pattern, self.semester_weeks);
    }

    pub fn toggle_week(&mut self, week: u32) -> Result<(), WeekSetError> {
        self.draft.weeks = week_selector::toggle(&self.draft.weeks, week)?;
        Ok(())
    }

    pub fn clear_weeks(&mut self) {
        self.draft.weeks = week_selector::clear();
    }

    fn step_errors(&self, step: WizardStep) -> FieldErrors {
        let mut errors = self.draft.errors(self.semester_weeks);
        if let Err(reference_errors) = self.draft.check_references(self.catalog) {
            for (field, message) in reference_errors.iter() {
                errors.insert(field, message);
            }
        }
        let owned = step.fields();
        errors.retain(|field| owned.contains(&field));
        errors
    }

    /// Validates the current step and moves to the next one.
    pub fn advance(&mut self) -> Result<WizardStep, FieldErrors> {
        self.step_errors(self.step).into_result()?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// The completed draft, ready for `Timetable::create`.
    pub fn finish(&self) -> Result<EntryDraft, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotAtReview(self.step));
        }
        self.step_errors(WizardStep::Review)
            .into_result()
            .map_err(WizardError::Invalid)?;
        Ok(self.draft.clone())
    }
}
