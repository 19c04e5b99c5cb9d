use chrono::NaiveTime;
use course_schedule::week_selector::{select_all, select_first_half};
use course_schedule::{
    Action, EntryDraft, EntryField, EntryId, EntryPatch, EntryStatus, Semester, TimeSlotCatalog,
    Timetable, TimetableError, WeekSet,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn semester() -> Semester {
    Semester::new("2025f", "Fall 2025", 20)
}

fn draft() -> EntryDraft {
    let slots = TimeSlotCatalog::standard();
    EntryDraft::new()
        .course("circuits")
        .class("ee-1")
        .day(3)
        .slot(slots.get("p3").unwrap())
        .room("lab-a")
        .weeks(select_all(20))
}

#[test]
fn create_with_empty_weeks_reports_weeks_and_leaves_collection_alone() {
    let timetable = Timetable::new(semester());
    let err = timetable.create(draft().weeks(WeekSet::new())).unwrap_err();
    match err {
        TimetableError::Validation(errors) => {
            assert!(errors.contains(EntryField::Weeks));
            assert_eq!(errors.len(), 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(timetable.is_empty());
}

#[test]
fn create_returns_active_entry_with_unique_id() {
    let timetable = Timetable::new(semester());
    let (timetable, first) = timetable.create(draft()).unwrap();
    let (timetable, second) = timetable.create(draft().day(4)).unwrap();

    assert_eq!(first.status, EntryStatus::Active);
    assert_eq!(second.status, EntryStatus::Active);
    assert_ne!(first.id, second.id);
    assert_eq!(first.semester_id, "2025f");
    assert_eq!(first.start, t(10, 0));
    assert_eq!(timetable.len(), 2);
    assert_eq!(timetable.get(second.id), Some(&second));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let (timetable, first) = Timetable::new(semester()).create(draft()).unwrap();
    let timetable = timetable.delete(first.id).unwrap();
    let (_, second) = timetable.create(draft()).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn reducers_leave_the_input_untouched() {
    let (before, entry) = Timetable::new(semester()).create(draft()).unwrap();
    let snapshot = before.clone();

    let moved = before
        .update(entry.id, &EntryPatch::new().room("lab-b"))
        .unwrap();
    let deleted = before.delete(entry.id).unwrap();

    assert_eq!(before, snapshot);
    assert_eq!(moved.get(entry.id).unwrap().room_id, "lab-b");
    assert!(deleted.get(entry.id).is_none());
}

#[test]
fn update_validates_touched_fields() {
    let (timetable, entry) = Timetable::new(semester()).create(draft()).unwrap();
    let err = timetable
        .update(entry.id, &EntryPatch::new().times(t(12, 0), t(11, 0)).room(""))
        .unwrap_err();
    let TimetableError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.contains(EntryField::Time));
    assert!(errors.contains(EntryField::Room));
    assert!(!errors.contains(EntryField::Weeks));
}

#[test]
fn unknown_ids_are_reported() {
    let timetable = Timetable::new(semester());
    assert_eq!(
        timetable.delete(EntryId(7)),
        Err(TimetableError::NotFound(EntryId(7)))
    );
    assert_eq!(
        timetable.set_status(EntryId(7), EntryStatus::Cancelled),
        Err(TimetableError::NotFound(EntryId(7)))
    );
}

#[test]
fn reduce_applies_a_sequence_of_actions() {
    let actions = vec![
        Action::Create(draft()),
        Action::Create(draft().day(5).weeks(select_first_half(20))),
        Action::Update {
            id: EntryId(2),
            patch: EntryPatch::new().category(Some("lab".into())),
        },
        Action::SetStatus {
            id: EntryId(1),
            status: EntryStatus::Cancelled,
        },
        Action::Delete(EntryId(1)),
    ];
    let timetable = actions
        .into_iter()
        .try_fold(Timetable::new(semester()), |tt, action| tt.reduce(action))
        .unwrap();

    assert_eq!(timetable.len(), 1);
    let remaining = &timetable.entries()[0];
    assert_eq!(remaining.id, EntryId(2));
    assert_eq!(remaining.category.as_deref(), Some("lab"));
    assert_eq!(remaining.weeks.to_vec(), (1..=10).collect::<Vec<_>>());
}

#[test]
fn from_entries_rejects_duplicates_and_continues_numbering() {
    let (timetable, entry) = Timetable::new(semester()).create(draft()).unwrap();
    let dup = Timetable::from_entries(semester(), vec![entry.clone(), entry.clone()]);
    assert_eq!(dup, Err(TimetableError::DuplicateId(entry.id)));

    let mut later = entry.clone();
    later.id = EntryId(41);
    let adopted = Timetable::from_entries(semester(), vec![later]).unwrap();
    let (_, created) = adopted.create(draft()).unwrap();
    assert_eq!(created.id, EntryId(42));
    assert_eq!(timetable.len(), 1);
}

#[test]
fn from_entries_checks_entry_invariants() {
    let (_, mut entry) = Timetable::new(semester()).create(draft()).unwrap();
    entry.weeks = WeekSet::new();
    let err = Timetable::from_entries(semester(), vec![entry]).unwrap_err();
    assert!(matches!(err, TimetableError::InvalidEntry { .. }));
}

#[test]
fn lookups_by_class_room_and_teacher() {
    let timetable = Timetable::new(semester());
    let (timetable, _) = timetable.create(draft().teacher("t1")).unwrap();
    let (timetable, _) = timetable
        .create(draft().class("ee-2").room("lab-b").day(1))
        .unwrap();
    assert_eq!(timetable.entries_for_class("ee-1").count(), 1);
    assert_eq!(timetable.entries_for_room("lab-b").count(), 1);
    assert_eq!(timetable.entries_for_teacher("t1").count(), 1);
    assert_eq!(timetable.entries_for_teacher("t2").count(), 0);
}

#[test]
fn id_counter_stops_at_the_top_of_the_range() {
    let (_, entry) = Timetable::new(semester()).create(draft()).unwrap();

    let mut last = entry.clone();
    last.id = EntryId(u32::MAX);
    assert_eq!(
        Timetable::from_entries(semester(), vec![last]),
        Err(TimetableError::IdsExhausted)
    );

    let mut near = entry;
    near.id = EntryId(u32::MAX - 1);
    let timetable = Timetable::from_entries(semester(), vec![near]).unwrap();
    assert_eq!(
        timetable.create(draft()).unwrap_err(),
        TimetableError::IdsExhausted
    );
    assert_eq!(timetable.len(), 1);
}
