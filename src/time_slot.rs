use crate::catalog::CatalogError;
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parses a wall-clock time written as `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Result<NaiveTime, chrono::ParseError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Serde adapter storing `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .map_err(|err| serde::de::Error::custom(format!("invalid time '{raw}': {err}")))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::super::parse_time(&raw).map(Some).map_err(|err| {
                    serde::de::Error::custom(format!("invalid time '{raw}': {err}"))
                }),
                None => Ok(None),
            }
        }
    }
}

/// A fixed daily period shared by every weekday.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub label: String,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    /// Position of the slot within the day; determines the grid row.
    pub ordinal: u32,
}

impl TimeSlot {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        start: NaiveTime,
        end: NaiveTime,
        ordinal: u32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start,
            end,
            ordinal,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `time` falls in `[start, end)`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Time slots of a school day, kept sorted by ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<TimeSlot>", try_from = "Vec<TimeSlot>")]
pub struct TimeSlotCatalog {
    slots: Vec<TimeSlot>,
}

impl TimeSlotCatalog {
    const STANDARD_PERIODS: [(u32, u32, u32, u32); 10] = [
        (8, 0, 8, 45),
        (8, 55, 9, 40),
        (10, 0, 10, 45),
        (10, 55, 11, 40),
        (14, 0, 14, 45),
        (14, 55, 15, 40),
        (16, 0, 16, 45),
        (16, 55, 17, 40),
        (19, 0, 19, 45),
        (19, 55, 20, 40),
    ];

    /// Validates and orders the slots.
    ///
    /// Rejects slots whose start is not before their end, and duplicate ids,
    /// ordinals or start times (the start time is how entries find their row).
    pub fn new(mut slots: Vec<TimeSlot>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::with_capacity(slots.len());
        for slot in &slots {
            if slot.start >= slot.end {
                return Err(CatalogError::InvalidSlotTimes {
                    id: slot.id.clone(),
                    start: slot.start,
                    end: slot.end,
                });
            }
            if !ids.insert(slot.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "time slot",
                    id: slot.id.clone(),
                });
            }
        }

        slots.sort_by_key(|slot| slot.ordinal);
        for pair in slots.windows(2) {
            if pair[0].ordinal == pair[1].ordinal {
                return Err(CatalogError::DuplicateOrdinal {
                    first: pair[0].id.clone(),
                    second: pair[1].id.clone(),
                    ordinal: pair[0].ordinal,
                });
            }
        }

        let mut starts = HashSet::with_capacity(slots.len());
        for slot in &slots {
            if !starts.insert(slot.start) {
                return Err(CatalogError::DuplicateStart {
                    id: slot.id.clone(),
                    start: slot.start,
                });
            }
        }

        Ok(Self { slots })
    }

    /// Ten 45-minute periods: four in the morning, four in the afternoon and
    /// two in the evening.
    pub fn standard() -> Self {
        let slots = Self::STANDARD_PERIODS
            .iter()
            .enumerate()
            .filter_map(|(idx, &(sh, sm, eh, em))| {
                let period = idx as u32 + 1;
                Some(TimeSlot::new(
                    format!("p{period}"),
                    format!("Period {period}"),
                    NaiveTime::from_hms_opt(sh, sm, 0)?,
                    NaiveTime::from_hms_opt(eh, em, 0)?,
                    period,
                ))
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TimeSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn slot_at(&self, row: usize) -> Option<&TimeSlot> {
        self.slots.get(row)
    }

    /// Grid row whose slot starts exactly at `start`.
    pub fn row_of_start(&self, start: NaiveTime) -> Option<usize> {
        self.slots.iter().position(|slot| slot.start == start)
    }

    /// Slot covering exactly `[start, end)`.
    pub fn slot_for_range(&self, start: NaiveTime, end: NaiveTime) -> Option<&TimeSlot> {
        self.slots
            .iter()
            .find(|slot| slot.start == start && slot.end == end)
    }
}

impl From<TimeSlotCatalog> for Vec<TimeSlot> {
    fn from(catalog: TimeSlotCatalog) -> Self {
        catalog.slots
    }
}

impl TryFrom<Vec<TimeSlot>> for TimeSlotCatalog {
    type Error = CatalogError;

    fn try_from(slots: Vec<TimeSlot>) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn standard_catalog_is_valid_and_ordered() {
        let standard = TimeSlotCatalog::standard();
        let rebuilt = TimeSlotCatalog::new(standard.slots().to_vec()).unwrap();
        assert_eq!(rebuilt, standard);
        assert_eq!(standard.len(), 10);
        assert_eq!(standard.slot_at(2).unwrap().start, t(10, 0));
        assert_eq!(standard.row_of_start(t(10, 0)), Some(2));
        assert_eq!(standard.row_of_start(t(10, 1)), None);
    }

    #[test]
    fn new_sorts_by_ordinal() {
        let catalog = TimeSlotCatalog::new(vec![
            TimeSlot::new("b", "B", t(9, 0), t(10, 0), 2),
            TimeSlot::new("a", "A", t(8, 0), t(9, 0), 1),
        ])
        .unwrap();
        let ids: Vec<_> = catalog.slots().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn new_rejects_inverted_and_duplicate_slots() {
        let inverted = TimeSlotCatalog::new(vec![TimeSlot::new("x", "X", t(9, 0), t(9, 0), 1)]);
        assert!(matches!(inverted, Err(CatalogError::InvalidSlotTimes { .. })));

        let same_ordinal = TimeSlotCatalog::new(vec![
            TimeSlot::new("a", "A", t(8, 0), t(9, 0), 1),
            TimeSlot::new("b", "B", t(9, 0), t(10, 0), 1),
        ]);
        assert!(matches!(same_ordinal, Err(CatalogError::DuplicateOrdinal { .. })));

        let same_start = TimeSlotCatalog::new(vec![
            TimeSlot::new("a", "A", t(8, 0), t(9, 0), 1),
            TimeSlot::new("b", "B", t(8, 0), t(8, 30), 2),
        ]);
        assert!(matches!(same_start, Err(CatalogError::DuplicateStart { .. })));

        let same_id = TimeSlotCatalog::new(vec![
            TimeSlot::new("a", "A", t(8, 0), t(9, 0), 1),
            TimeSlot::new("a", "B", t(9, 0), t(10, 0), 2),
        ]);
        assert!(matches!(same_id, Err(CatalogError::DuplicateId { .. })));
    }

    #[test]
    fn slot_json_uses_short_times() {
        let slot = TimeSlot::new("p3", "Period 3", t(10, 0), t(10, 45), 3);
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "10:00");
        let back: TimeSlot =
            serde_json::from_str(r#"{"id":"p3","label":"Period 3","start":"10:00:00","end":"10:45","ordinal":3}"#)
                .unwrap();
        assert_eq!(back, slot);
        assert_eq!(slot.duration(), Duration::minutes(45));
        assert!(slot.contains(t(10, 44)));
        assert!(!slot.contains(t(10, 45)));
    }
}
