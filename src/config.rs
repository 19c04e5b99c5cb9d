use crate::grid::ConflictPolicy;
use crate::semester::Semester;
use crate::week_set::{DEFAULT_SEMESTER_WEEKS, MAX_SEMESTER_WEEKS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scheduling settings. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub semester_id: String,
    pub semester_name: String,
    pub semester_weeks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_start: Option<NaiveDate>,
    pub conflict_policy: ConflictPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let semester = Semester::default();
        Self {
            semester_id: semester.id,
            semester_name: semester.name,
            semester_weeks: DEFAULT_SEMESTER_WEEKS,
            semester_start: None,
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.semester_weeks == 0 || self.semester_weeks > MAX_SEMESTER_WEEKS {
            return Err(ConfigError::Invalid(format!(
                "semester_weeks must be between 1 and {MAX_SEMESTER_WEEKS} (got {})",
                self.semester_weeks
            )));
        }
        if self.semester_id.trim().is_empty() {
            return Err(ConfigError::Invalid("semester_id must not be empty".into()));
        }
        Ok(())
    }

    pub fn semester(&self) -> Semester {
        let semester = Semester::new(
            self.semester_id.clone(),
            self.semester_name.clone(),
            self.semester_weeks,
        );
        match self.semester_start {
            Some(start) => semester.with_start_date(start),
            None => semester,
        }
    }
}
