use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identity is the name pair as written: no case or whitespace
/// normalization, so "Иванов" and "иванов" are distinct students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub last_name: String,
    pub first_name: String,
}

impl Student {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
        }
    }
}
