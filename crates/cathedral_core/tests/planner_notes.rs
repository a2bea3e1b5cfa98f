use cathedral_core::{MemoryKvStore, Planner, PlannerError, PlannerOptions, ValidationError};

fn planner() -> Planner<MemoryKvStore> {
    Planner::load(MemoryKvStore::new(), PlannerOptions::default())
}

#[test]
fn add_note_always_inserts_at_front() {
    let mut planner = planner();
    let mut added = Vec::new();
    for index in 0..5 {
        let note = planner.add_note(&format!("note #{index}")).unwrap();
        assert_eq!(planner.notes()[0].id, note.id);
        added.push(note.id);
    }
    assert_eq!(Some(&planner.notes()[0].id), added.last());
    assert_eq!(planner.notes()[0].content, "note #4");
    assert_eq!(planner.notes().len(), 7);
    assert_eq!(planner.notes()[6].id, "note2");
}

#[test]
fn add_note_rejects_whitespace_only_content() {
    let mut planner = planner();
    let before = planner.notes().to_vec();

    let err = planner.add_note(" \n ").unwrap_err();
    assert_eq!(err, PlannerError::Validation(ValidationError::EmptyContent));
    assert_eq!(planner.notes(), before.as_slice());
}

#[test]
fn note_ids_stay_unique() {
    let mut planner = planner();
    for _ in 0..20 {
        planner.add_note("same text").unwrap();
    }
    let mut ids: Vec<&str> = planner.notes().iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), planner.notes().len());
}

#[test]
fn update_note_replaces_content_and_keeps_position_and_timestamp() {
    let mut planner = planner();
    let original = planner.note("note2").cloned().unwrap();

    let updated = planner.update_note("note2", "  Stretch for ten minutes ").unwrap();
    assert_eq!(updated.content, "Stretch for ten minutes");
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(planner.notes()[1], updated);
}

#[test]
fn update_unknown_note_is_not_found() {
    let mut planner = planner();
    let err = planner.update_note("ghost", "text").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "note not found: ghost");
}

#[test]
fn delete_note_is_idempotent() {
    let mut planner = planner();
    planner.delete_note("note1");
    let after_first = planner.notes().to_vec();
    planner.delete_note("note1");
    assert_eq!(planner.notes(), after_first.as_slice());
    assert_eq!(planner.notes().len(), 1);
}
