use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppError, models::course::Course, state::AppState};

pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let catalog = state.catalog();
    let courses = catalog.list().await?;
    tracing::debug!(source = catalog.source_name(), count = courses.len(), "Listed courses");
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Course>, AppError> {
    state
        .catalog()
        .find_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}
