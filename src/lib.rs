pub mod catalog;
pub mod config;
pub mod entry;
pub mod grid;
pub mod import;
pub mod semester;
pub mod time_slot;
pub mod timetable;
pub mod week_selector;
pub mod week_set;
pub mod wizard;

pub use catalog::{Catalog, CatalogError, ClassInfo, Classroom, Course};
pub use config::{ConfigError, SchedulerConfig};
pub use entry::{
    EntryDraft, EntryField, EntryId, EntryPatch, EntryStatus, FieldErrors, ScheduleEntry,
};
pub use grid::{
    ConflictPolicy, DAYS_PER_WEEK, GridBuilder, GridConflict, GridView, ScheduleGrid, build_grid,
};
pub use import::{
    ImportError, catalog_from_json_str, load_catalog_from_json, load_time_slots_from_csv,
    save_time_slots_to_csv,
};
pub use semester::Semester;
pub use time_slot::{TimeSlot, TimeSlotCatalog};
pub use timetable::{Action, Timetable, TimetableError};
pub use week_selector::WeekPattern;
pub use week_set::{DEFAULT_SEMESTER_WEEKS, MAX_SEMESTER_WEEKS, WeekSet, WeekSetError};
pub use wizard::{EntryWizard, WizardError, WizardStep};
