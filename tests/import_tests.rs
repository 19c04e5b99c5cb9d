use chrono::NaiveTime;
use course_schedule::{
    CatalogError, ImportError, TimeSlotCatalog, catalog_from_json_str, load_catalog_from_json,
    load_time_slots_from_csv, save_time_slots_to_csv,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn catalog_json_loads_all_sections() {
    let file = write_temp(
        r#"{
            "time_slots": [
                {"id": "am", "label": "Morning", "start": "09:00", "end": "10:30", "ordinal": 1},
                {"id": "pm", "label": "Afternoon", "start": "14:00", "end": "15:30", "ordinal": 2}
            ],
            "classrooms": [{"id": "lab-a", "name": "Lab A", "building": "North", "capacity": 40}],
            "classes": [{"id": "ee-1", "name": "EE 2025 Class 1", "student_count": 32}],
            "courses": [{"id": "circuits", "name": "Circuits", "teacher_id": "t1"}]
        }"#,
    );
    let catalog = load_catalog_from_json(file.path()).unwrap();
    assert_eq!(catalog.time_slots().len(), 2);
    assert_eq!(
        catalog.time_slots().row_of_start(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
        Some(1)
    );
    assert_eq!(catalog.classroom("lab-a").unwrap().building.as_deref(), Some("North"));
    assert_eq!(catalog.class("ee-1").unwrap().student_count, 32);
    assert_eq!(catalog.course("circuits").unwrap().teacher_id.as_deref(), Some("t1"));
}

#[test]
fn missing_time_slots_fall_back_to_standard_day() {
    let catalog = catalog_from_json_str(r#"{"classrooms": []}"#).unwrap();
    assert_eq!(catalog.time_slots(), &TimeSlotCatalog::standard());
}

#[test]
fn invalid_catalogs_are_rejected() {
    let duplicate_rooms = catalog_from_json_str(
        r#"{"classrooms": [{"id": "r1", "name": "A"}, {"id": "r1", "name": "B"}]}"#,
    );
    assert!(matches!(
        duplicate_rooms,
        Err(ImportError::Catalog(CatalogError::DuplicateId { .. }))
    ));

    let inverted_slot = catalog_from_json_str(
        r#"{"time_slots": [{"id": "x", "label": "X", "start": "10:00", "end": "09:00", "ordinal": 1}]}"#,
    );
    assert!(inverted_slot.is_err());

    let bad_time = catalog_from_json_str(
        r#"{"time_slots": [{"id": "x", "label": "X", "start": "ten", "end": "11:00", "ordinal": 1}]}"#,
    );
    assert!(matches!(bad_time, Err(ImportError::Json(_))));
}

#[test]
fn time_slot_csv_round_trip() {
    let standard = TimeSlotCatalog::standard();
    let file = NamedTempFile::new().unwrap();
    save_time_slots_to_csv(&standard, file.path()).unwrap();
    let loaded = load_time_slots_from_csv(file.path()).unwrap();
    assert_eq!(loaded, standard);
}

#[test]
fn time_slot_csv_reports_bad_rows() {
    let file = write_temp("id,label,start,end,ordinal\np1,Period 1,8am,08:45,1\n");
    let err = load_time_slots_from_csv(file.path()).unwrap_err();
    assert!(
        matches!(&err, ImportError::InvalidData(msg) if msg.contains("p1")),
        "{err}"
    );

    let empty = write_temp("id,label,start,end,ordinal\n");
    assert!(matches!(
        load_time_slots_from_csv(empty.path()),
        Err(ImportError::InvalidData(_))
    ));
}
