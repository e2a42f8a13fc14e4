use allowance_core::{
    add_task, set_completion, set_weekly_allowance, AllowanceSession, Document, DocumentStore,
    JsonFileStore, StoreError, DEFAULT_WEEKLY_ALLOWANCE, MAX_AMOUNT,
};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::fs;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

#[test]
fn missing_file_initializes_and_persists_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    let store = JsonFileStore::new(&path);

    let outcome = store.load(today());

    let recovery = outcome.recovery.as_ref().unwrap();
    assert!(recovery.cause.is_missing());
    assert!(recovery.backup_path.is_none());
    assert!(recovery.persist_error.is_none());
    assert_eq!(outcome.document, Document::with_defaults(today()));
    assert_eq!(outcome.document.weekly_allowance(), DEFAULT_WEEKLY_ALLOWANCE);
    assert!(path.exists());

    let reloaded = store.load(today());
    assert!(!reloaded.is_recovered());
    assert_eq!(reloaded.document, outcome.document);
}

#[test]
fn corrupt_file_is_backed_up_and_replaced_with_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    fs::write(&path, "{ \"tasks\": [").unwrap();
    let store = JsonFileStore::new(&path);

    let outcome = store.load(today());

    let recovery = outcome.recovery.as_ref().unwrap();
    assert!(matches!(recovery.cause, StoreError::Parse { .. }));
    let backup = recovery.backup_path.as_ref().unwrap();
    assert_eq!(fs::read_to_string(backup).unwrap(), "{ \"tasks\": [");
    assert!(outcome.document.tasks().is_empty());
    assert!(outcome.document.history().is_empty());

    store.save(&outcome.document).unwrap();
    let reloaded = store.load(today());
    assert!(!reloaded.is_recovered());
    assert_eq!(reloaded.document, outcome.document);
}

#[test]
fn repeated_corruption_keeps_every_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    let store = JsonFileStore::new(&path);

    fs::write(&path, "first broken").unwrap();
    let first = store.load(today()).recovery.unwrap().backup_path.unwrap();
    fs::write(&path, "second broken").unwrap();
    let second = store.load(today()).recovery.unwrap().backup_path.unwrap();

    assert_eq!(first, dir.path().join("allowance.json.corrupt"));
    assert_eq!(second, dir.path().join("allowance.json.corrupt.1"));
    assert_eq!(fs::read_to_string(&first).unwrap(), "first broken");
    assert_eq!(fs::read_to_string(&second).unwrap(), "second broken");
    assert!(!store.load(today()).is_recovered());
}

#[test]
fn non_utf8_file_is_backed_up_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let outcome = JsonFileStore::new(&path).load(today());

    let recovery = outcome.recovery.unwrap();
    assert!(recovery.cause.is_corrupt());
    assert!(!recovery.read_only);
    let backup = recovery.backup_path.unwrap();
    assert_eq!(fs::read(backup).unwrap(), vec![0xff, 0xfe, 0x00, 0x7b]);
    assert!(path.is_file());
}

#[test]
fn unreadable_path_is_left_untouched_and_never_saved_over() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    fs::create_dir(&path).unwrap();

    let outcome = JsonFileStore::new(&path).load(today());

    let recovery = outcome.recovery.as_ref().unwrap();
    assert!(matches!(recovery.cause, StoreError::Io { .. }));
    assert!(!recovery.cause.is_corrupt());
    assert!(recovery.read_only);
    assert!(recovery.backup_path.is_none());
    assert!(recovery.persist_error.is_none());
    assert_eq!(outcome.document, Document::with_defaults(today()));
    assert!(path.is_dir());
    assert!(!dir.path().join("allowance.json.corrupt").exists());

    let mut session = AllowanceSession::open(JsonFileStore::new(&path), today());
    let added = session.add_task("Dishes", dec!(1)).unwrap();
    assert!(matches!(added.save_error, Some(StoreError::ReadOnly)));
    assert_eq!(session.document().tasks().len(), 1);
    assert!(path.is_dir());
}

#[test]
fn invalid_document_is_treated_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    fs::write(
        &path,
        r#"{"tasks": [], "next_id": 1, "completions": [5], "week": "2024-01-08",
            "weekly_allowance": 5.0, "history": []}"#,
    )
    .unwrap();

    let outcome = JsonFileStore::new(&path).load(today());

    let recovery = outcome.recovery.unwrap();
    assert!(recovery.cause.to_string().contains("unknown task id 5"));
    assert!(outcome.document.completions().is_empty());
}

#[test]
fn save_then_load_preserves_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("allowance.json"));
    let mut doc = Document::new(today(), dec!(10));
    let task = add_task(&mut doc, "Clean Room", dec!(2.5)).unwrap();
    set_completion(&mut doc, task.id, true).unwrap();

    store.save(&doc).unwrap();
    let outcome = store.load(today());

    assert!(!outcome.is_recovered());
    assert_eq!(outcome.document, doc);
}

#[test]
fn amounts_survive_save_and_load_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    let store = JsonFileStore::new(&path);
    let mut doc = Document::with_defaults(today());
    add_task(&mut doc, "Fine print", dec!(0.1234567890123456789)).unwrap();
    add_task(&mut doc, "Lottery", MAX_AMOUNT).unwrap();
    set_weekly_allowance(&mut doc, dec!(999999999.99)).unwrap();

    store.save(&doc).unwrap();
    let outcome = store.load(today());

    assert!(!outcome.is_recovered());
    assert_eq!(outcome.document, doc);
    assert_eq!(outcome.document.tasks()[0].value.to_string(), "0.1234567890123456789");
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"value\": 0.1234567890123456789\n"));
    assert!(raw.contains("\"weekly_allowance\": 999999999.99,"));
}

#[test]
fn save_creates_parent_directories_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("allowance.json");
    let store = JsonFileStore::new(&path);

    store.save(&Document::with_defaults(today())).unwrap();

    assert!(path.exists());
    let names = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["allowance.json".to_string()]);
}

#[test]
fn saved_file_is_human_readable_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    JsonFileStore::new(&path)
        .save(&Document::with_defaults(today()))
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n  \"weekly_allowance\": 5.00,\n"));
    assert!(raw.ends_with('\n'));
}

#[test]
fn save_failure_is_reported_and_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("allowance.json");
    let store = JsonFileStore::new(&path);
    store.save(&Document::with_defaults(today())).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    // A directory squatting on the temp path makes the write fail.
    fs::create_dir(dir.path().join("allowance.json.tmp")).unwrap();
    let mut doc = Document::with_defaults(today());
    add_task(&mut doc, "Dishes", dec!(1)).unwrap();

    let err = store.save(&doc).unwrap_err();

    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}
