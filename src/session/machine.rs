use crate::error::AppError;
use crate::models::Student;

/// Per-user roster session, expressed as an explicit state machine instead
/// of a bag of optional fields.
///
/// `Idle → ClassSelected → Reviewing`, with a successful send landing back
/// in `ClassSelected`: the class survives the reset so the next roster for
/// the same class starts with one step less.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    ClassSelected { class_name: String },
    Reviewing { class_name: String, students: Vec<Student> },
}

impl SessionState {
    pub fn class_name(&self) -> Option<&str> {
        match self {
            SessionState::Idle => None,
            SessionState::ClassSelected { class_name }
            | SessionState::Reviewing { class_name, .. } => Some(class_name),
        }
    }

    pub fn students(&self) -> &[Student] {
        match self {
            SessionState::Reviewing { students, .. } => students,
            _ => &[],
        }
    }

    /// Starts a fresh roster for `class_name`, discarding whatever was in
    /// progress. Validation that the class exists happens in the service.
    pub fn select_class(&mut self, class_name: String) {
        *self = SessionState::ClassSelected { class_name };
    }

    /// Appends `student` unless an equal entry is already present.
    /// Returns whether the roster actually changed.
    pub fn add_student(&mut self, student: Student) -> Result<bool, AppError> {
        match self {
            SessionState::Idle => Err(AppError::NoClassSelected),
            SessionState::ClassSelected { class_name } => {
                *self = SessionState::Reviewing {
                    class_name: std::mem::take(class_name),
                    students: vec![student],
                };
                Ok(true)
            }
            SessionState::Reviewing { students, .. } => {
                if students.contains(&student) {
                    Ok(false)
                } else {
                    students.push(student);
                    Ok(true)
                }
            }
        }
    }

    /// Removes the single entry equal to `student`. Removing the last one
    /// drops the session back to `ClassSelected`.
    pub fn remove_student(&mut self, student: &Student) -> Result<(), AppError> {
        match self {
            SessionState::Reviewing { class_name, students } => {
                let idx = students
                    .iter()
                    .position(|s| s == student)
                    .ok_or(AppError::StudentNotFound)?;
                students.remove(idx);
                if students.is_empty() {
                    *self = SessionState::ClassSelected {
                        class_name: std::mem::take(class_name),
                    };
                }
                Ok(())
            }
            _ => Err(AppError::StudentNotFound),
        }
    }

    /// Replaces the whole session with a previously exported roster.
    pub fn load_roster(&mut self, class_name: String, students: Vec<Student>) {
        *self = SessionState::Reviewing { class_name, students };
    }

    /// Checks that the session can be exported right now.
    pub fn roster_for_send(&self) -> Result<(&str, &[Student]), AppError> {
        match self {
            SessionState::Idle => Err(AppError::NoClassSelected),
            SessionState::ClassSelected { .. } => Err(AppError::EmptyRoster),
            SessionState::Reviewing { class_name, students } => {
                Ok((class_name, students))
            }
        }
    }

    /// Reset after a successful send: roster emptied, class retained.
    pub fn finish_send(&mut self) {
        if let SessionState::Reviewing { class_name, .. } = self {
            *self = SessionState::ClassSelected {
                class_name: std::mem::take(class_name),
            };
        }
    }
}
