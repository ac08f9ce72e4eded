use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::export::{self, ExportEntry, RosterCodec};
use crate::gateway::RosterDelivery;
use crate::models::{SchoolClass, Student};
use crate::session::{SessionState, SessionTable};
use crate::store::RosterStore;

/// Single dispatch point for every roster operation the conversation
/// router can trigger. Holds the session table; everything else is an
/// injected collaborator.
pub struct RosterService {
    store: Arc<dyn RosterStore>,
    codec: Arc<dyn RosterCodec>,
    delivery: Arc<dyn RosterDelivery>,
    sessions: SessionTable,
    admin_chat_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RosterView {
    pub class_name: Option<String>,
    pub students: Vec<Student>,
}

impl RosterView {
    fn of(state: &SessionState) -> Self {
        Self {
            class_name: state.class_name().map(str::to_string),
            students: state.students().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendReport {
    pub file_name: String,
    pub students_sent: usize,
}

impl RosterService {
    pub fn new(
        store: Arc<dyn RosterStore>,
        codec: Arc<dyn RosterCodec>,
        delivery: Arc<dyn RosterDelivery>,
        admin_chat_id: i64,
    ) -> Self {
        Self {
            store,
            codec,
            delivery,
            sessions: SessionTable::new(),
            admin_chat_id,
        }
    }

    pub async fn list_classes(&self) -> Result<Vec<SchoolClass>, AppError> {
        self.store.list_classes().await
    }

    pub async fn class_students(&self, class_id: i64) -> Result<Vec<Student>, AppError> {
        self.store.list_students(class_id).await
    }

    pub fn view_current(&self, user_id: i64) -> RosterView {
        RosterView::of(&self.sessions.snapshot(user_id))
    }

    /// Starts a fresh roster for a known class. An unknown name leaves the
    /// existing session untouched.
    pub async fn select_class(&self, user_id: i64, class_name: &str) -> Result<RosterView, AppError> {
        let class = self
            .store
            .find_class_by_name(class_name)
            .await?
            .ok_or_else(|| AppError::ClassNotFound(class_name.to_string()))?;

        info!("user {} selected class {}", user_id, class.class_name);
        let state = self.sessions.update(user_id, |s| {
            s.select_class(class.class_name.clone());
            s.clone()
        });
        Ok(RosterView::of(&state))
    }

    pub fn add_student(&self, user_id: i64, student: Student) -> Result<RosterView, AppError> {
        if student.last_name.trim().is_empty() || student.first_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "last name and first name are required".to_string(),
            ));
        }

        let state = self.sessions.update(user_id, |s| {
            let added = s.add_student(student.clone())?;
            if !added {
                debug!(
                    "user {}: {} {} already on the roster",
                    user_id, student.last_name, student.first_name
                );
            }
            Ok::<_, AppError>(s.clone())
        })?;
        Ok(RosterView::of(&state))
    }

    pub fn remove_student(&self, user_id: i64, student: &Student) -> Result<RosterView, AppError> {
        let state = self.sessions.update(user_id, |s| {
            s.remove_student(student)?;
            Ok::<_, AppError>(s.clone())
        })?;
        Ok(RosterView::of(&state))
    }

    /// Re-opens a previously exported roster for editing. The session is
    /// replaced wholesale; the class comes from the file name, the
    /// students from the file body minus the header and summary rows.
    pub async fn load_previous_roster(
        &self,
        user_id: i64,
        file_name: &str,
    ) -> Result<RosterView, AppError> {
        if !export::is_plain_file_name(file_name) {
            return Err(AppError::BadRequest("invalid file name".to_string()));
        }
        let (class_name, _date) = export::parse_export_file_name(file_name)
            .ok_or_else(|| AppError::Parse(format!("{}: not an exported roster", file_name)))?;

        let rows = self.codec.decode(file_name).await?;

        let mut students: Vec<Student> = Vec::new();
        for (col1, col2) in rows {
            // Marker rows are matched loosely so hand-edited padding does
            // not leak them in; name columns stay untouched.
            let marker = col1.trim();
            if marker == export::HEADER_MARKER || marker == export::SUMMARY_MARKER {
                continue;
            }
            let student = Student::new(col1, col2);
            // Hand-edited files may carry duplicates; the session never does.
            if students.contains(&student) {
                warn!("{}: dropping duplicate row for {} {}", file_name, student.last_name, student.first_name);
                continue;
            }
            students.push(student);
        }
        if students.is_empty() {
            return Err(AppError::EmptyExport(file_name.to_string()));
        }

        info!(
            "user {} loaded {} with {} students",
            user_id,
            file_name,
            students.len()
        );
        let state = self.sessions.update(user_id, |s| {
            s.load_roster(class_name.clone(), students.clone());
            s.clone()
        });
        Ok(RosterView::of(&state))
    }

    /// Encodes the current roster, delivers the file to the requesting
    /// user and to the administrator chat, then empties the roster while
    /// keeping the class selected.
    pub async fn persist_and_send(&self, user_id: i64) -> Result<SendReport, AppError> {
        let snapshot = self.sessions.snapshot(user_id);
        let (class_name, students) = snapshot.roster_for_send()?;

        let today = chrono::Local::now().date_naive();
        let path = self.codec.encode(class_name, today, students).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let caption = format!("Список класса {}", class_name);
        self.delivery
            .send_document(user_id, &path, &caption)
            .await?;
        self.delivery
            .send_document(self.admin_chat_id, &path, &caption)
            .await?;

        self.sessions.update(user_id, |s| s.finish_send());
        info!(
            "user {} sent {} ({} students)",
            user_id,
            file_name,
            students.len()
        );
        Ok(SendReport {
            file_name,
            students_sent: students.len(),
        })
    }

    /// Exported files still on disk, newest first.
    pub async fn list_exports(&self) -> Result<Vec<ExportEntry>, AppError> {
        let mut entries: Vec<ExportEntry> = Vec::new();
        for file_name in self.codec.list_files().await? {
            if let Some((class_name, date)) = export::parse_export_file_name(&file_name) {
                entries.push(ExportEntry {
                    file_name,
                    class_name,
                    date,
                });
            }
        }
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.file_name.cmp(&b.file_name)));
        Ok(entries)
    }
}
