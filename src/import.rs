//! Loading catalogs supplied as files.
//!
//! A catalog JSON file has the shape
//! `{"time_slots": [...], "classrooms": [...], "classes": [...], "courses": [...]}`;
//! every key is optional and missing time slots fall back to the standard day.
//! Time slot tables can also be read from CSV with the header
//! `id,label,start,end,ordinal`.

use crate::catalog::{Catalog, CatalogError, ClassInfo, Classroom, Course};
use crate::time_slot::{TimeSlot, TimeSlotCatalog, format_time, parse_time};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    time_slots: Vec<TimeSlot>,
    classrooms: Vec<Classroom>,
    classes: Vec<ClassInfo>,
    courses: Vec<Course>,
}

impl CatalogFile {
    fn into_catalog(self) -> ImportResult<Catalog> {
        let time_slots = if self.time_slots.is_empty() {
            TimeSlotCatalog::standard()
        } else {
            TimeSlotCatalog::new(self.time_slots)?
        };
        Ok(Catalog::new(
            time_slots,
            self.classrooms,
            self.classes,
            self.courses,
        )?)
    }
}

pub fn catalog_from_json_str(input: &str) -> ImportResult<Catalog> {
    let file: CatalogFile = serde_json::from_str(input)?;
    file.into_catalog()
}

pub fn load_catalog_from_json<P: AsRef<Path>>(path: P) -> ImportResult<Catalog> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let raw: CatalogFile = serde_json::from_reader(file)?;
    let catalog = raw.into_catalog()?;
    debug!(
        path = %path.display(),
        slots = catalog.time_slots().len(),
        rooms = catalog.classrooms().len(),
        "loaded catalog"
    );
    Ok(catalog)
}

#[derive(Serialize, Deserialize)]
struct TimeSlotCsvRecord {
    id: String,
    label: String,
    start: String,
    end: String,
    ordinal: u32,
}

impl From<&TimeSlot> for TimeSlotCsvRecord {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            id: slot.id.clone(),
            label: slot.label.clone(),
            start: format_time(slot.start),
            end: format_time(slot.end),
            ordinal: slot.ordinal,
        }
    }
}

impl TimeSlotCsvRecord {
    fn into_slot(self) -> ImportResult<TimeSlot> {
        let start = parse_time(&self.start).map_err(|e| {
            ImportError::InvalidData(format!("slot '{}' has invalid start '{}': {e}", self.id, self.start))
        })?;
        let end = parse_time(&self.end).map_err(|e| {
            ImportError::InvalidData(format!("slot '{}' has invalid end '{}': {e}", self.id, self.end))
        })?;
        Ok(TimeSlot::new(self.id, self.label, start, end, self.ordinal))
    }
}

pub fn load_time_slots_from_csv<P: AsRef<Path>>(path: P) -> ImportResult<TimeSlotCatalog> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut slots = Vec::new();
    for record in reader.deserialize::<TimeSlotCsvRecord>() {
        slots.push(record?.into_slot()?);
    }
    if slots.is_empty() {
        return Err(ImportError::InvalidData(
            "CSV file contained no time slots".into(),
        ));
    }
    Ok(TimeSlotCatalog::new(slots)?)
}

pub fn save_time_slots_to_csv<P: AsRef<Path>>(
    slots: &TimeSlotCatalog,
    path: P,
) -> ImportResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for slot in slots.slots() {
        writer.serialize(TimeSlotCsvRecord::from(slot))?;
    }
    writer.flush()?;
    Ok(())
}
