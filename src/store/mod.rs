use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{SchoolClass, Student};

/// Read-only view over the school's class and student rosters.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn list_classes(&self) -> Result<Vec<SchoolClass>, AppError>;
    async fn list_students(&self, class_id: i64) -> Result<Vec<Student>, AppError>;
    async fn find_class_by_name(&self, name: &str) -> Result<Option<SchoolClass>, AppError>;
}

pub struct SqliteRosterStore {
    db: SqlitePool,
}

impl SqliteRosterStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RosterStore for SqliteRosterStore {
    async fn list_classes(&self) -> Result<Vec<SchoolClass>, AppError> {
        let classes = sqlx::query_as::<_, SchoolClass>(
            r#"
            SELECT class_id, class_name
            FROM classes
            ORDER BY class_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(classes)
    }

    async fn list_students(&self, class_id: i64) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT last_name, first_name
            FROM students
            WHERE class_id = ?1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.db)
        .await?;
        Ok(students)
    }

    async fn find_class_by_name(&self, name: &str) -> Result<Option<SchoolClass>, AppError> {
        let class = sqlx::query_as::<_, SchoolClass>(
            r#"
            SELECT class_id, class_name
            FROM classes
            WHERE class_name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(class)
    }
}

/// In-memory store over a fixed class list, for tests.
pub struct FixtureRosterStore {
    classes: Vec<(SchoolClass, Vec<Student>)>,
}

impl FixtureRosterStore {
    pub fn new(classes: Vec<(SchoolClass, Vec<Student>)>) -> Self {
        Self { classes }
    }
}

#[async_trait]
impl RosterStore for FixtureRosterStore {
    async fn list_classes(&self) -> Result<Vec<SchoolClass>, AppError> {
        Ok(self.classes.iter().map(|(c, _)| c.clone()).collect())
    }

    async fn list_students(&self, class_id: i64) -> Result<Vec<Student>, AppError> {
        Ok(self
            .classes
            .iter()
            .find(|(c, _)| c.class_id == class_id)
            .map(|(_, students)| students.clone())
            .unwrap_or_default())
    }

    async fn find_class_by_name(&self, name: &str) -> Result<Option<SchoolClass>, AppError> {
        Ok(self
            .classes
            .iter()
            .find(|(c, _)| c.class_name == name)
            .map(|(c, _)| c.clone()))
    }
}
