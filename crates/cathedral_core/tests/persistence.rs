use cathedral_core::{
    seed_state, AppState, CalendarDate, KeyValueStore, MemoryKvStore, PersistentStore, Planner,
    PlannerOptions, SqliteKvStore, TaskDraft, TaskPatch, DEFAULT_STORAGE_KEY,
};

fn options() -> PlannerOptions {
    PlannerOptions::default()
}

fn mutated_planner() -> Planner<MemoryKvStore> {
    let mut planner = Planner::load(MemoryKvStore::new(), options());
    let task = planner
        .add_task(
            TaskDraft::new("Draft chapter", 45, "2024-02-29")
                .scheduled_in("3")
                .with_notes("outline first"),
        )
        .unwrap();
    planner.toggle_task_completion(&task.id).unwrap();
    planner
        .update_task(
            "task1",
            TaskPatch {
                schedule_id: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    planner.delete_task("task3");
    planner.add_note("Evening walk helps sleep.").unwrap();
    planner.set_dark_mode(true);
    planner
}

#[test]
fn reloading_reproduces_state_field_for_field() {
    let planner = mutated_planner();
    let backend = planner.backend().clone();

    let reloaded = Planner::load(backend, options());
    assert_eq!(reloaded.state(), planner.state());
}

#[test]
fn persistent_store_round_trips_app_state() {
    let planner = mutated_planner();
    let mut store = PersistentStore::new(MemoryKvStore::new());
    store.save("slot", planner.state()).unwrap();

    let fallback = seed_state(
        CalendarDate::from_ymd(2000, 1, 1).unwrap(),
        chrono::Utc::now(),
        false,
    );
    let loaded: AppState = store.load("slot", fallback);
    assert_eq!(&loaded, planner.state());
}

#[test]
fn sqlite_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.db");

    let expected = {
        let mut planner = Planner::load(SqliteKvStore::open(&path).unwrap(), options());
        planner
            .add_task(TaskDraft::new("Renew passport", 30, "2024-12-31"))
            .unwrap();
        planner.add_note("Bring photos.").unwrap();
        planner.state().clone()
    };

    let reopened = Planner::load(SqliteKvStore::open(&path).unwrap(), options());
    assert_eq!(reopened.state(), &expected);
}

#[test]
fn blob_uses_camel_case_wire_layout() {
    let mut planner = Planner::load(MemoryKvStore::new(), options());
    planner.set_dark_mode(true);

    let raw = planner.backend().raw(DEFAULT_STORAGE_KEY).unwrap();
    let json: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(json["darkMode"], true);
    assert_eq!(json["dailySchedule"].as_array().unwrap().len(), 17);
    assert_eq!(json["dailySchedule"][16]["locked"], true);
    assert_eq!(json["dailyRhythm"][4]["blocks"], serde_json::json!(["16", "17"]));
    assert_eq!(json["tasks"][0]["scheduleId"], "5");
    assert_eq!(json["tasks"][0]["time"], 60);
    assert!(json["notes"][0]["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn corrupt_blob_falls_back_to_seed() {
    let mut backend = MemoryKvStore::new();
    backend.set(DEFAULT_STORAGE_KEY, "{\"darkMode\": tru").unwrap();

    let planner = Planner::load(backend, options());
    assert_eq!(planner.schedule().len(), 17);
    assert_eq!(planner.tasks().len(), 3);
    assert!(planner.task("task1").is_some());
}

#[test]
fn blob_with_invalid_date_or_duplicate_ids_falls_back_to_seed() {
    let bad_date = serde_json::json!({
        "tasks": [{ "id": "a", "title": "x", "time": 10, "date": "2024-02-30" }]
    });
    let duplicate_ids = serde_json::json!({
        "tasks": [
            { "id": "a", "title": "x", "time": 10, "date": "2024-01-01" },
            { "id": "a", "title": "y", "time": 10, "date": "2024-01-02" }
        ]
    });

    for blob in [bad_date, duplicate_ids] {
        let mut backend = MemoryKvStore::new();
        backend.set(DEFAULT_STORAGE_KEY, &blob.to_string()).unwrap();
        let planner = Planner::load(backend, options());
        assert!(planner.task("a").is_none());
        assert!(planner.task("task1").is_some());
    }
}

#[test]
fn missing_fields_are_defaulted_on_load() {
    let blob = serde_json::json!({
        "tasks": [{ "id": "legacy", "title": "Old", "time": 25, "date": "2023-07-04" }]
    });
    let mut backend = MemoryKvStore::new();
    backend.set(DEFAULT_STORAGE_KEY, &blob.to_string()).unwrap();

    let planner = Planner::load(backend, options());
    assert!(!planner.dark_mode());
    assert_eq!(planner.schedule().len(), 17);
    assert_eq!(planner.rhythm().len(), 5);
    assert!(planner.notes().is_empty());

    let task = planner.task("legacy").unwrap();
    assert_eq!(task.schedule_id, None);
    assert!(!task.completed);
    assert_eq!(task.notes, "");
}

#[test]
fn failed_commit_keeps_memory_state_and_next_commit_catches_up() {
    let mut planner = Planner::load(MemoryKvStore::new(), options());
    planner.backend_mut().set_unavailable(true);

    let task = planner
        .add_task(TaskDraft::new("Offline task", 20, "2024-01-01"))
        .unwrap();
    assert!(planner.task(&task.id).is_some());
    assert!(planner.has_unsaved_changes());
    assert_eq!(planner.backend().write_count(), 0);

    planner.backend_mut().set_unavailable(false);
    planner.add_note("back online").unwrap();
    assert!(!planner.has_unsaved_changes());

    let reloaded = Planner::load(planner.backend().clone(), options());
    assert!(reloaded.task(&task.id).is_some());
    assert_eq!(reloaded.notes()[0].content, "back online");
}

#[test]
fn failed_commit_leaves_previous_blob_in_place() {
    let mut planner = Planner::load(MemoryKvStore::new(), options());
    planner.set_dark_mode(true);
    let stored_before = planner.backend().raw(DEFAULT_STORAGE_KEY).map(str::to_string);

    planner.backend_mut().set_unavailable(true);
    assert!(!planner.commit());
    planner.set_dark_mode(false);

    planner.backend_mut().set_unavailable(false);
    assert_eq!(
        planner.backend().raw(DEFAULT_STORAGE_KEY).map(str::to_string),
        stored_before
    );
}

#[test]
fn last_save_wins_between_two_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");

    let mut first = Planner::load(SqliteKvStore::open(&path).unwrap(), options());
    let mut second = Planner::load(SqliteKvStore::open(&path).unwrap(), options());

    let from_first = first
        .add_task(TaskDraft::new("from first tab", 10, "2024-01-01"))
        .unwrap();
    let from_second = second.add_note("from second tab").unwrap();

    let reloaded = Planner::load(SqliteKvStore::open(&path).unwrap(), options());
    assert!(reloaded.task(&from_first.id).is_none());
    assert!(reloaded.note(&from_second.id).is_some());
}

#[test]
fn storage_keys_are_isolated() {
    let mut planner = Planner::load(MemoryKvStore::new(), options());
    planner.set_dark_mode(true);
    let backend = planner.backend().clone();

    let other = PlannerOptions {
        storage_key: "other_profile".to_string(),
        prefers_dark: false,
    };
    let planner = Planner::load(backend, other);
    assert!(!planner.dark_mode());
    assert_eq!(planner.storage_key(), "other_profile");
}

#[test]
fn reset_to_defaults_overwrites_stored_state() {
    let mut planner = mutated_planner();
    planner.reset_to_defaults();
    assert_eq!(planner.tasks().len(), 3);
    assert!(!planner.dark_mode());

    let reloaded = Planner::load(planner.backend().clone(), options());
    assert_eq!(reloaded.state(), planner.state());
}

#[test]
fn reset_with_storage_down_keeps_seed_in_memory() {
    let mut planner = mutated_planner();
    planner.backend_mut().set_unavailable(true);
    planner.reset_to_defaults();

    assert_eq!(planner.tasks().len(), 3);
    assert!(planner.has_unsaved_changes());

    planner.backend_mut().set_unavailable(false);
    assert!(planner.commit());
    let reloaded = Planner::load(planner.backend().clone(), options());
    assert_eq!(reloaded.state(), planner.state());
}

#[test]
fn sub_millisecond_timestamps_survive_commit_and_reload() {
    let blob = serde_json::json!({
        "notes": [{
            "id": "fine_grained",
            "content": "Stored by another client.",
            "createdAt": "2024-01-01T08:30:00.123456Z"
        }]
    });
    let mut backend = MemoryKvStore::new();
    backend.set(DEFAULT_STORAGE_KEY, &blob.to_string()).unwrap();

    let mut loaded = Planner::load(backend, options());
    assert!(loaded.commit());

    let reloaded = Planner::load(loaded.backend().clone(), options());
    assert_eq!(reloaded.state(), loaded.state());
    assert_eq!(
        reloaded.note("fine_grained").unwrap().created_at.to_rfc3339(),
        "2024-01-01T08:30:00.123+00:00"
    );
}

#[test]
fn removed_slot_loads_as_default() {
    let mut store = PersistentStore::new(MemoryKvStore::new());
    store.save("slot", &true).unwrap();
    store.remove("slot").unwrap();
    store.remove("slot").unwrap();

    assert!(!store.load("slot", false));
    assert_eq!(store.backend().raw("slot"), None);
}
