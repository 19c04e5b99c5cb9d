use crate::week_set::{DEFAULT_SEMESTER_WEEKS, MAX_SEMESTER_WEEKS};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: String,
    pub name: String,
    /// Number of teaching weeks, at most `MAX_SEMESTER_WEEKS`.
    pub weeks: u32,
    /// First day of week 1. Dates are mapped from the Monday of that week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for Semester {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "Default semester".to_string(),
            weeks: DEFAULT_SEMESTER_WEEKS,
            start_date: None,
        }
    }
}

impl Semester {
    pub fn new(id: impl Into<String>, name: impl Into<String>, weeks: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weeks: weeks.min(MAX_SEMESTER_WEEKS),
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    fn first_monday(&self) -> Option<NaiveDate> {
        self.start_date
            .map(|d| d - Duration::days(d.weekday().num_days_from_monday() as i64))
    }

    /// Semester week containing `date`, or `None` outside the semester.
    pub fn week_of(&self, date: NaiveDate) -> Option<u32> {
        let monday = self.first_monday()?;
        let days = (date - monday).num_days();
        if days < 0 {
            return None;
        }
        let week = u32::try_from(days / 7).ok()? + 1;
        (week <= self.weeks).then_some(week)
    }

    /// Calendar date of `day_of_week` (1 = Monday) in `week`.
    pub fn date_of(&self, week: u32, day_of_week: u8) -> Option<NaiveDate> {
        if week == 0 || week > self.weeks || !(1..=7).contains(&day_of_week) {
            return None;
        }
        let monday = self.first_monday()?;
        Some(monday + Duration::days((week as i64 - 1) * 7 + (day_of_week as i64 - 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_of_counts_from_monday_of_start_week() {
        // 2025-09-03 is a Wednesday; week 1 runs Mon 09-01 .. Sun 09-07.
        let semester = Semester::new("2025f", "Fall 2025", 20).with_start_date(d(2025, 9, 3));
        assert_eq!(semester.week_of(d(2025, 9, 1)), Some(1));
        assert_eq!(semester.week_of(d(2025, 9, 7)), Some(1));
        assert_eq!(semester.week_of(d(2025, 9, 8)), Some(2));
        assert_eq!(semester.week_of(d(2025, 8, 31)), None);
        assert_eq!(semester.week_of(d(2026, 1, 19)), None);
    }

    #[test]
    fn date_of_inverts_week_of() {
        let semester = Semester::new("2025f", "Fall 2025", 20).with_start_date(d(2025, 9, 1));
        let date = semester.date_of(3, 5).unwrap();
        assert_eq!(date, d(2025, 9, 19));
        assert_eq!(semester.week_of(date), Some(3));
        assert_eq!(semester.date_of(21, 1), None);
        assert_eq!(semester.date_of(1, 8), None);
    }

    #[test]
    fn without_start_date_no_dates_are_mapped() {
        let semester = Semester::default();
        assert_eq!(semester.weeks, 20);
        assert_eq!(semester.week_of(d(2025, 9, 1)), None);
        assert_eq!(semester.date_of(1, 1), None);
    }
}
