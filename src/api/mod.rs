use axum::Json;
use axum::extract::Path;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::error::AppError;
use crate::export::ExportEntry;
use crate::models::{SchoolClass, Student};
use crate::services::{RosterView, SendReport};
use crate::state::AppState;

#[derive(Deserialize)]
struct SelectClassRequest {
    class_name: String,
}

#[derive(Deserialize)]
struct LoadRosterRequest {
    file_name: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classes", get(list_classes))
        .route("/classes/{id}/students", get(class_students))
        .route("/exports", get(list_exports))
        .route("/sessions/{user_id}", get(view_roster))
        .route("/sessions/{user_id}/class", post(select_class))
        .route(
            "/sessions/{user_id}/students",
            post(add_student).delete(remove_student),
        )
        .route("/sessions/{user_id}/load", post(load_roster))
        .route("/sessions/{user_id}/send", post(send_roster))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<SchoolClass>>, AppError> {
    let classes = state.roster.list_classes().await?;
    Ok(Json(classes))
}

async fn class_students(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = state.roster.class_students(id).await?;
    Ok(Json(students))
}

async fn list_exports(State(state): State<AppState>) -> Result<Json<Vec<ExportEntry>>, AppError> {
    let exports = state.roster.list_exports().await?;
    Ok(Json(exports))
}

async fn view_roster(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<RosterView>, AppError> {
    Ok(Json(state.roster.view_current(user_id)))
}

async fn select_class(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<SelectClassRequest>,
) -> Result<Json<RosterView>, AppError> {
    let view = state.roster.select_class(user_id, &req.class_name).await?;
    Ok(Json(view))
}

async fn add_student(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(student): Json<Student>,
) -> Result<Json<RosterView>, AppError> {
    let view = state.roster.add_student(user_id, student)?;
    Ok(Json(view))
}

async fn remove_student(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(student): Json<Student>,
) -> Result<Json<RosterView>, AppError> {
    let view = state.roster.remove_student(user_id, &student)?;
    Ok(Json(view))
}

async fn load_roster(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<LoadRosterRequest>,
) -> Result<Json<RosterView>, AppError> {
    let view = state
        .roster
        .load_previous_roster(user_id, &req.file_name)
        .await?;
    Ok(Json(view))
}

async fn send_roster(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<SendReport>, AppError> {
    let report = state.roster.persist_and_send(user_id).await?;
    Ok(Json(report))
}
