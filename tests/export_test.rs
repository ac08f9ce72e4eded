use chrono::{Days, NaiveDate};
use tempfile::TempDir;

use rosterbot::error::AppError;
use rosterbot::export::{CsvRosterCodec, RosterCodec, export_file_name, parse_export_file_name};
use rosterbot::models::Student;
use rosterbot::services::CleanupScheduler;

#[test]
fn file_name_round_trips_through_the_parser() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 29).expect("date");

    for class in ["5А", "11Б", "группа_продлёнка"] {
        let name = export_file_name(class, date);
        let (parsed_class, parsed_date) =
            parse_export_file_name(&name).expect("parse back");
        assert_eq!(parsed_class, class);
        assert_eq!(parsed_date, date);
    }
}

#[test]
fn parser_rejects_foreign_files() {
    for name in [
        "notes.txt",
        "5А.csv",
        "5А_29-08-2026.csv",
        "_2026-08-29.csv",
        "5А_2026-08-29",
    ] {
        assert!(parse_export_file_name(name).is_none(), "accepted {}", name);
    }
}

#[tokio::test]
async fn encode_rejects_class_names_that_break_the_file_name() {
    let dir = TempDir::new().expect("tempdir");
    let codec = CsvRosterCodec::new(dir.path());
    let date = NaiveDate::from_ymd_opt(2026, 8, 29).expect("date");
    let students = vec![Student::new("Иванов", "Пётр")];

    for class in ["5/А", "..", "", "5\\А"] {
        let err = codec.encode(class, date, &students).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "accepted {:?}", class);
    }
    // Nothing may be written for a rejected name.
    assert_eq!(dir.path().read_dir().expect("read dir").count(), 0);

    codec.encode("5А", date, &students).await.expect("encode");
    assert!(dir.path().join("5А_2026-08-29.csv").exists());
}

#[tokio::test]
async fn sweep_removes_only_expired_exports() {
    let dir = TempDir::new().expect("tempdir");
    let today = chrono::Local::now().date_naive();
    let fresh = export_file_name("5А", today);
    let on_boundary = export_file_name(
        "6Б",
        today.checked_sub_days(Days::new(7)).expect("date"),
    );
    let expired = export_file_name(
        "7В",
        today.checked_sub_days(Days::new(8)).expect("date"),
    );

    for name in [&fresh, &on_boundary, &expired] {
        std::fs::write(dir.path().join(name), "Фамилия;Имя\n").expect("write");
    }
    // Not produced by the exporter, must survive any sweep.
    std::fs::write(dir.path().join("notes.txt"), "keep me").expect("write");

    let scheduler = CleanupScheduler::new(dir.path(), 7, 3600);
    let removed = scheduler.sweep().await.expect("sweep");

    assert_eq!(removed, 1);
    assert!(dir.path().join(&fresh).exists());
    assert!(dir.path().join(&on_boundary).exists());
    assert!(!dir.path().join(&expired).exists());
    assert!(dir.path().join("notes.txt").exists());
}

#[tokio::test]
async fn sweep_on_missing_directory_is_a_no_op() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("never-created");

    let scheduler = CleanupScheduler::new(&missing, 7, 3600);
    assert_eq!(scheduler.sweep().await.expect("sweep"), 0);
}
