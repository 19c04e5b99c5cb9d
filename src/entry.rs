use crate::catalog::Catalog;
use crate::time_slot::{TimeSlot, format_time, hhmm};
use crate::week_set::WeekSet;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input.trim().trim_start_matches('#').parse().map(EntryId)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Cancelled,
    Completed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "active",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::Completed => "completed",
        }
    }

    /// Completed entries are final; cancelled ones may be reinstated.
    pub fn can_transition_to(&self, next: EntryStatus) -> bool {
        use EntryStatus::*;
        matches!(
            (*self, next),
            (Active, Active)
                | (Cancelled, Cancelled)
                | (Completed, Completed)
                | (Active, Cancelled)
                | (Cancelled, Active)
                | (Active, Completed)
        )
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EntryStatus::Active),
            "cancelled" | "canceled" => Ok(EntryStatus::Cancelled),
            "completed" => Ok(EntryStatus::Completed),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryField {
    Course,
    Class,
    DayOfWeek,
    Time,
    Room,
    Weeks,
    Status,
    Category,
}

impl EntryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryField::Course => "course",
            EntryField::Class => "class",
            EntryField::DayOfWeek => "day_of_week",
            EntryField::Time => "time",
            EntryField::Room => "room",
            EntryField::Weeks => "weeks",
            EntryField::Status => "status",
            EntryField::Category => "category",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages keyed by field. Only the first message per field is
/// kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<EntryField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: EntryField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: EntryField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: EntryField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(EntryField) -> bool) {
        self.0.retain(|field, _| keep(*field));
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&parts)
    }
}

impl std::error::Error for FieldErrors {}

/// One recurring weekly placement of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub course_id: String,
    pub class_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub room_id: String,
    pub weeks: WeekSet,
    pub semester_id: String,
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ScheduleEntry {
    pub fn weekday(&self) -> Option<Weekday> {
        day_to_weekday(self.day_of_week)
    }

    pub fn meets_in_week(&self, week: u32) -> bool {
        self.weeks.contains(week)
    }

    /// Re-checks the invariants every stored entry must hold.
    pub fn validate(&self, semester_weeks: u32) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, EntryField::Course, Some(&self.course_id));
        check_text(&mut errors, EntryField::Class, Some(&self.class_id));
        check_text(&mut errors, EntryField::Room, Some(&self.room_id));
        check_day(&mut errors, Some(self.day_of_week));
        check_times(&mut errors, Some(self.start), Some(self.end));
        check_weeks(&mut errors, &self.weeks, semester_weeks, self.status);
        errors.into_result()
    }

    pub fn time_range(&self) -> String {
        format!("{}-{}", format_time(self.start), format_time(self.end))
    }
}

pub fn day_to_weekday(day_of_week: u8) -> Option<Weekday> {
    match day_of_week {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_to_day(weekday: Weekday) -> u8 {
    weekday.number_from_monday() as u8
}

fn check_text(errors: &mut FieldErrors, field: EntryField, value: Option<&String>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        errors.insert(field, format!("{} is required", field_label(field)));
    }
}

fn field_label(field: EntryField) -> &'static str {
    match field {
        EntryField::Course => "course",
        EntryField::Class => "class",
        EntryField::Room => "room",
        EntryField::DayOfWeek => "day of week",
        EntryField::Time => "time",
        EntryField::Weeks => "weeks",
        EntryField::Status => "status",
        EntryField::Category => "category",
    }
}

fn check_day(errors: &mut FieldErrors, day: Option<u8>) {
    match day {
        None => errors.insert(EntryField::DayOfWeek, "day of week is required"),
        Some(d) if !(1..=7).contains(&d) => errors.insert(
            EntryField::DayOfWeek,
            format!("day of week must be between 1 and 7 (got {d})"),
        ),
        Some(_) => {}
    }
}

fn check_times(errors: &mut FieldErrors, start: Option<NaiveTime>, end: Option<NaiveTime>) {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => errors.insert(
            EntryField::Time,
            format!(
                "start {} must be before end {}",
                format_time(start),
                format_time(end)
            ),
        ),
        (Some(_), Some(_)) => {}
        _ => errors.insert(EntryField::Time, "start and end time are required"),
    }
}

fn check_weeks(errors: &mut FieldErrors, weeks: &WeekSet, semester_weeks: u32, status: EntryStatus) {
    if weeks.is_empty() && status == EntryStatus::Active {
        errors.insert(EntryField::Weeks, "at least one week must be selected");
    } else if !weeks.fits_within(semester_weeks) {
        errors.insert(
            EntryField::Weeks,
            format!("weeks must lie within 1..={semester_weeks} (got {weeks})"),
        );
    }
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Input for creating an entry. Every required field starts out unset so
/// that missing input can be reported per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default, with = "hhmm::option")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option")]
    pub end: Option<NaiveTime>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub weeks: WeekSet,
    #[serde(default)]
    pub category: Option<String>,
}

impl EntryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    pub fn day(mut self, day_of_week: u8) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Takes start and end from a catalog slot.
    pub fn slot(self, slot: &TimeSlot) -> Self {
        self.times(slot.start, slot.end)
    }

    pub fn room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn weeks(mut self, weeks: WeekSet) -> Self {
        self.weeks = weeks;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn errors(&self, semester_weeks: u32) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, EntryField::Course, self.course_id.as_ref());
        check_text(&mut errors, EntryField::Class, self.class_id.as_ref());
        check_day(&mut errors, self.day_of_week);
        check_times(&mut errors, self.start, self.end);
        check_text(&mut errors, EntryField::Room, self.room_id.as_ref());
        check_weeks(&mut errors, &self.weeks, semester_weeks, EntryStatus::Active);
        errors
    }

    pub fn validate(&self, semester_weeks: u32) -> Result<(), FieldErrors> {
        self.errors(semester_weeks).into_result()
    }

    /// Checks course, class and room ids against the catalog.
    pub fn check_references(&self, catalog: &Catalog) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(course) = &self.course_id {
            if !catalog.knows_course(course) {
                errors.insert(EntryField::Course, format!("unknown course '{course}'"));
            }
        }
        if let Some(class) = &self.class_id {
            if !catalog.knows_class(class) {
                errors.insert(EntryField::Class, format!("unknown class '{class}'"));
            }
        }
        if let Some(room) = &self.room_id {
            if !catalog.knows_classroom(room) {
                errors.insert(EntryField::Room, format!("unknown classroom '{room}'"));
            }
        }
        errors.into_result()
    }

    /// Validates the draft and turns it into an active entry.
    pub(crate) fn build(
        self,
        id: EntryId,
        semester_id: &str,
        semester_weeks: u32,
    ) -> Result<ScheduleEntry, FieldErrors> {
        let errors = self.errors(semester_weeks);
        let fields = (
            normalize_text(self.course_id),
            normalize_text(self.class_id),
            self.day_of_week,
            self.start,
            self.end,
            normalize_text(self.room_id),
        );
        match fields {
            (Some(course_id), Some(class_id), Some(day_of_week), Some(start), Some(end), Some(room_id))
                if errors.is_empty() =>
            {
                Ok(ScheduleEntry {
                    id,
                    course_id,
                    class_id,
                    teacher_id: normalize_text(self.teacher_id),
                    day_of_week,
                    start,
                    end,
                    room_id,
                    weeks: self.weeks,
                    semester_id: semester_id.to_string(),
                    status: EntryStatus::Active,
                    category: normalize_text(self.category),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Partial update of an existing entry. `None` leaves a field untouched.
///
/// `category` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub day_of_week: Option<u8>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub room_id: Option<String>,
    pub weeks: Option<WeekSet>,
    pub status: Option<EntryStatus>,
    pub category: Option<Option<String>>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(mut self, day_of_week: u8) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn slot(self, slot: &TimeSlot) -> Self {
        self.times(slot.start, slot.end)
    }

    pub fn room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn weeks(mut self, weeks: WeekSet) -> Self {
        self.weeks = Some(weeks);
        self
    }

    pub fn status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the patch into a copy of `entry`, validating every touched
    /// field and the invariants of the merged result.
    pub fn apply(&self, entry: &ScheduleEntry, semester_weeks: u32) -> Result<ScheduleEntry, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut next = entry.clone();

        if let Some(day) = self.day_of_week {
            check_day(&mut errors, Some(day));
            next.day_of_week = day;
        }
        if self.start.is_some() || self.end.is_some() {
            next.start = self.start.unwrap_or(entry.start);
            next.end = self.end.unwrap_or(entry.end);
            check_times(&mut errors, Some(next.start), Some(next.end));
        }
        if let Some(room) = &self.room_id {
            check_text(&mut errors, EntryField::Room, Some(room));
            next.room_id = room.trim().to_string();
        }
        if let Some(status) = self.status {
            if !entry.status.can_transition_to(status) {
                errors.insert(
                    EntryField::Status,
                    format!("cannot change status from {} to {}", entry.status, status),
                );
            }
            next.status = status;
        }
        if let Some(weeks) = self.weeks {
            next.weeks = weeks;
        }
        if self.weeks.is_some() || self.status.is_some() {
            check_weeks(&mut errors, &next.weeks, semester_weeks, next.status);
        }
        if let Some(category) = &self.category {
            next.category = normalize_text(category.clone());
        }

        errors.into_result().map(|_| next)
    }
}
