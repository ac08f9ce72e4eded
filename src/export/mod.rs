pub mod naming;

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::models::Student;

pub use naming::{HEADER_MARKER, SUMMARY_MARKER, export_file_name, parse_export_file_name};

/// An export file on disk, with the class and date parsed from its name.
#[derive(Debug, Clone, Serialize)]
pub struct ExportEntry {
    pub file_name: String,
    pub class_name: String,
    pub date: NaiveDate,
}

/// Spreadsheet boundary: turns a roster into a downloadable file and a
/// previously produced file back into raw rows. Rows come back unfiltered
/// (header and summary included); filtering is the session core's job.
#[async_trait]
pub trait RosterCodec: Send + Sync {
    async fn encode(
        &self,
        class_name: &str,
        date: NaiveDate,
        students: &[Student],
    ) -> Result<PathBuf, AppError>;

    async fn decode(&self, file_name: &str) -> Result<Vec<(String, String)>, AppError>;

    async fn list_files(&self) -> Result<Vec<String>, AppError>;
}

/// Semicolon-separated writer/reader over a flat export directory.
pub struct CsvRosterCodec {
    export_dir: PathBuf,
}

impl CsvRosterCodec {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    fn file_path(&self, file_name: &str) -> PathBuf {
        self.export_dir.join(file_name)
    }
}

#[async_trait]
impl RosterCodec for CsvRosterCodec {
    async fn encode(
        &self,
        class_name: &str,
        date: NaiveDate,
        students: &[Student],
    ) -> Result<PathBuf, AppError> {
        // Every produced name must parse back (the cleanup sweep relies on
        // it) and must stay inside the export directory.
        let file_name = export_file_name(class_name, date);
        let round_trips = parse_export_file_name(&file_name)
            .is_some_and(|(parsed, _)| parsed == class_name);
        if !is_plain_file_name(&file_name) || !round_trips {
            return Err(AppError::BadRequest(format!(
                "class name {:?} cannot be used in an export file name",
                class_name
            )));
        }

        let mut body = String::new();
        let _ = writeln!(body, "{};Имя", HEADER_MARKER);
        for student in students {
            let _ = writeln!(body, "{};{}", student.last_name, student.first_name);
        }
        let _ = writeln!(body, "{};{}", SUMMARY_MARKER, students.len());

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| AppError::ExternalIo(format!("create export dir: {}", e)))?;

        // Same class + same day overwrites the previous export.
        let path = self.file_path(&file_name);
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| AppError::ExternalIo(format!("write {}: {}", path.display(), e)))?;

        info!("exported roster to {}", path.display());
        Ok(path)
    }

    async fn decode(&self, file_name: &str) -> Result<Vec<(String, String)>, AppError> {
        let path = self.file_path(file_name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::FileNotFound(file_name.to_string()));
            }
            Err(e) => {
                return Err(AppError::ExternalIo(format!(
                    "read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rows = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (col1, col2) = line.split_once(';').ok_or_else(|| {
                AppError::Parse(format!("{}: no column separator on line {}", file_name, idx + 1))
            })?;
            // Columns are handed back verbatim: names keep their exact
            // spelling, whitespace included.
            rows.push((col1.to_string(), col2.to_string()));
        }
        Ok(rows)
    }

    async fn list_files(&self) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.export_dir).await {
            Ok(dir) => dir,
            // No exports yet.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(AppError::ExternalIo(format!("list exports: {}", e))),
        };
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| AppError::ExternalIo(format!("list exports: {}", e)))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if parse_export_file_name(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

/// True if the bare file name stays inside the export directory.
pub fn is_plain_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.contains(['/', '\\'])
        && file_name != "."
        && !file_name.contains("..")
        && Path::new(file_name).file_name().is_some()
}
