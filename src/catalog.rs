//! Read-only reference data supplied by the surrounding application.

use crate::time_slot::TimeSlotCatalog;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("time slot '{id}' must start before it ends (start {start}, end {end})")]
    InvalidSlotTimes {
        id: String,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("time slots '{first}' and '{second}' share ordinal {ordinal}")]
    DuplicateOrdinal {
        first: String,
        second: String,
        ordinal: u32,
    },
    #[error("time slot '{id}' starts at {start}, which another slot already uses")]
    DuplicateStart { id: String, start: NaiveTime },
}

/// A room schedule entries can be placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default)]
    pub capacity: u32,
}

impl Classroom {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            building: None,
            capacity,
        }
    }
}

/// A class (cohort of students) that attends scheduled sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub student_count: u32,
}

impl ClassInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, student_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            student_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            teacher_id: None,
        }
    }

    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }
}

/// Everything an entry may reference, bundled for lookups.
///
/// An empty list means the provider did not supply that catalog, and
/// references into it are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    time_slots: TimeSlotCatalog,
    classrooms: Vec<Classroom>,
    classes: Vec<ClassInfo>,
    courses: Vec<Course>,
}

fn ensure_unique<'a, I>(kind: &'static str, ids: I) -> Result<(), CatalogError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

impl Catalog {
    pub fn new(
        time_slots: TimeSlotCatalog,
        classrooms: Vec<Classroom>,
        classes: Vec<ClassInfo>,
        courses: Vec<Course>,
    ) -> Result<Self, CatalogError> {
        ensure_unique("classroom", classrooms.iter().map(|r| r.id.as_str()))?;
        ensure_unique("class", classes.iter().map(|c| c.id.as_str()))?;
        ensure_unique("course", courses.iter().map(|c| c.id.as_str()))?;
        Ok(Self {
            time_slots,
            classrooms,
            classes,
            courses,
        })
    }

    /// Standard time slots and no rooms, classes or courses.
    pub fn standard() -> Self {
        Self {
            time_slots: TimeSlotCatalog::standard(),
            ..Self::default()
        }
    }

    pub fn time_slots(&self) -> &TimeSlotCatalog {
        &self.time_slots
    }

    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }

    pub fn classes(&self) -> &[ClassInfo] {
        &self.classes
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn classroom(&self, id: &str) -> Option<&Classroom> {
        self.classrooms.iter().find(|room| room.id == id)
    }

    pub fn class(&self, id: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn knows_classroom(&self, id: &str) -> bool {
        self.classrooms.is_empty() || self.classroom(id).is_some()
    }

    pub fn knows_class(&self, id: &str) -> bool {
        self.classes.is_empty() || self.class(id).is_some()
    }

    pub fn knows_course(&self, id: &str) -> bool {
        self.courses.is_empty() || self.course(id).is_some()
    }
}
