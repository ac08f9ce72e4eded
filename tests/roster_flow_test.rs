use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use rosterbot::error::AppError;
use rosterbot::export::CsvRosterCodec;
use rosterbot::gateway::RosterDelivery;
use rosterbot::models::{SchoolClass, Student};
use rosterbot::services::RosterService;
use rosterbot::store::FixtureRosterStore;

const USER: i64 = 42;
const ADMIN: i64 = 777;

/// Delivery stub that records (chat_id, file_name) pairs.
struct RecordingDelivery {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingDelivery {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().expect("delivery lock").clone()
    }
}

#[async_trait]
impl RosterDelivery for RecordingDelivery {
    async fn send_document(
        &self,
        chat_id: i64,
        file: &Path,
        _caption: &str,
    ) -> Result<(), AppError> {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name")
            .to_string();
        self.sent.lock().expect("delivery lock").push((chat_id, name));
        Ok(())
    }
}

fn fixture_store() -> Arc<FixtureRosterStore> {
    Arc::new(FixtureRosterStore::new(vec![
        (
            SchoolClass {
                class_id: 1,
                class_name: "5А".to_string(),
            },
            vec![
                Student::new("Иванов", "Пётр"),
                Student::new("Сидорова", "Анна"),
            ],
        ),
        (
            SchoolClass {
                class_id: 2,
                class_name: "6Б".to_string(),
            },
            vec![],
        ),
    ]))
}

fn service(export_dir: &TempDir) -> (RosterService, Arc<RecordingDelivery>) {
    let delivery = Arc::new(RecordingDelivery::new());
    let svc = RosterService::new(
        fixture_store(),
        Arc::new(CsvRosterCodec::new(export_dir.path())),
        delivery.clone(),
        ADMIN,
    );
    (svc, delivery)
}

fn ivanov() -> Student {
    Student::new("Иванов", "Пётр")
}

#[tokio::test]
async fn select_unknown_class_leaves_session_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, ivanov()).expect("add");

    let err = svc.select_class(USER, "11В").await.unwrap_err();
    assert!(matches!(err, AppError::ClassNotFound(_)));

    let view = svc.view_current(USER);
    assert_eq!(view.class_name.as_deref(), Some("5А"));
    assert_eq!(view.students, vec![ivanov()]);
}

#[tokio::test]
async fn add_without_class_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    let err = svc.add_student(USER, ivanov()).unwrap_err();
    assert!(matches!(err, AppError::NoClassSelected));
    assert!(svc.view_current(USER).students.is_empty());
}

#[tokio::test]
async fn add_is_idempotent_and_remove_is_its_inverse() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, ivanov()).expect("first add");
    svc.add_student(USER, ivanov()).expect("duplicate add");
    assert_eq!(svc.view_current(USER).students.len(), 1);

    svc.remove_student(USER, &ivanov()).expect("remove");
    assert!(svc.view_current(USER).students.is_empty());

    // Empty again, so sending must be refused.
    let err = svc.persist_and_send(USER).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyRoster));
    assert_eq!(dir.path().read_dir().expect("read dir").count(), 0);
}

#[tokio::test]
async fn names_differing_only_by_case_are_distinct() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, Student::new("Иванов", "Пётр")).expect("add");
    svc.add_student(USER, Student::new("иванов", "Пётр")).expect("add");
    assert_eq!(svc.view_current(USER).students.len(), 2);
}

#[tokio::test]
async fn remove_missing_student_reports_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    let err = svc.remove_student(USER, &ivanov()).unwrap_err();
    assert!(matches!(err, AppError::StudentNotFound));
}

#[tokio::test]
async fn send_writes_file_delivers_twice_and_resets_roster() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, delivery) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, Student::new("Иванов", "Пётр")).expect("add");
    svc.add_student(USER, Student::new("Сидорова", "Анна")).expect("add");

    let report = svc.persist_and_send(USER).await.expect("send");
    let today = chrono::Local::now().date_naive();
    let expected_name = format!("5А_{}.csv", today.format("%Y-%m-%d"));
    assert_eq!(report.file_name, expected_name);
    assert_eq!(report.students_sent, 2);

    let content =
        std::fs::read_to_string(dir.path().join(&expected_name)).expect("read export");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec!["Фамилия;Имя", "Иванов;Пётр", "Сидорова;Анна", "Итого;2"]
    );

    // One copy to the requester, one to the administrator chat.
    assert_eq!(
        delivery.sent(),
        vec![(USER, expected_name.clone()), (ADMIN, expected_name)]
    );

    // Roster emptied, class retained.
    let view = svc.view_current(USER);
    assert_eq!(view.class_name.as_deref(), Some("5А"));
    assert!(view.students.is_empty());
}

#[tokio::test]
async fn same_day_send_overwrites_previous_export() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, Student::new("Иванов", "Пётр")).expect("add");
    svc.persist_and_send(USER).await.expect("first send");

    svc.add_student(USER, Student::new("Сидорова", "Анна")).expect("add");
    let report = svc.persist_and_send(USER).await.expect("second send");

    assert_eq!(dir.path().read_dir().expect("read dir").count(), 1);
    let content =
        std::fs::read_to_string(dir.path().join(&report.file_name)).expect("read export");
    assert!(content.contains("Сидорова;Анна"));
    assert!(content.contains("Итого;1"));
    assert!(!content.contains("Иванов"));
}

#[tokio::test]
async fn exported_roster_round_trips_through_load() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, Student::new("Иванов", "Пётр")).expect("add");
    svc.add_student(USER, Student::new("Сидорова", "Анна")).expect("add");
    let report = svc.persist_and_send(USER).await.expect("send");

    // A different user re-opens the exported file.
    let view = svc
        .load_previous_roster(7, &report.file_name)
        .await
        .expect("load");
    assert_eq!(view.class_name.as_deref(), Some("5А"));
    assert_eq!(
        view.students,
        vec![Student::new("Иванов", "Пётр"), Student::new("Сидорова", "Анна")]
    );
}

#[tokio::test]
async fn round_trip_keeps_names_verbatim_including_whitespace() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    // A trailing space is part of the name; export and re-import must not
    // swallow it.
    let padded = Student::new("Иванов ", "Пётр");
    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, padded.clone()).expect("add");
    let report = svc.persist_and_send(USER).await.expect("send");

    let view = svc
        .load_previous_roster(USER, &report.file_name)
        .await
        .expect("load");
    assert_eq!(view.students, vec![padded]);
}

#[tokio::test]
async fn load_filters_summary_row_by_marker_not_position() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    // Hand-edited file: summary row in the middle with stray padding,
    // duplicate student row.
    let today = chrono::Local::now().date_naive();
    let file_name = format!("5А_{}.csv", today.format("%Y-%m-%d"));
    std::fs::write(
        dir.path().join(&file_name),
        "Фамилия;Имя\nИванов;Пётр\n Итого ;1\nСидорова;Анна\nИванов;Пётр\n",
    )
    .expect("write file");

    let view = svc
        .load_previous_roster(USER, &file_name)
        .await
        .expect("load");
    assert_eq!(
        view.students,
        vec![Student::new("Иванов", "Пётр"), Student::new("Сидорова", "Анна")]
    );
}

#[tokio::test]
async fn load_rejects_files_without_students() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    let today = chrono::Local::now().date_naive();
    let file_name = format!("6Б_{}.csv", today.format("%Y-%m-%d"));
    std::fs::write(dir.path().join(&file_name), "Фамилия;Имя\nИтого;0\n")
        .expect("write file");

    let err = svc.load_previous_roster(USER, &file_name).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyExport(_)));
}

#[tokio::test]
async fn load_rejects_missing_and_malformed_names() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    let err = svc
        .load_previous_roster(USER, "5А_2026-01-01.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FileNotFound(_)));

    let err = svc
        .load_previous_roster(USER, "../etc/passwd")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = svc.load_previous_roster(USER, "notes.txt").await.unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
}

#[tokio::test]
async fn send_without_any_session_reports_no_class() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, delivery) = service(&dir);

    let err = svc.persist_and_send(USER).await.unwrap_err();
    assert!(matches!(err, AppError::NoClassSelected));
    assert!(delivery.sent().is_empty());
}

#[tokio::test]
async fn sessions_are_isolated_per_user() {
    let dir = TempDir::new().expect("tempdir");
    let (svc, _) = service(&dir);

    svc.select_class(USER, "5А").await.expect("select");
    svc.add_student(USER, ivanov()).expect("add");
    svc.select_class(99, "6Б").await.expect("select");

    assert_eq!(svc.view_current(USER).students.len(), 1);
    assert_eq!(svc.view_current(99).class_name.as_deref(), Some("6Б"));
    assert!(svc.view_current(99).students.is_empty());
}
