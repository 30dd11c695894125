use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

use super::{
    dto::{CreateTaskRequest, TaskResponse, TaskStats, UpdateTaskRequest},
    repo,
};

pub fn routes() -> Router<AppState> {
    // Literal segments are registered ahead of the `:id` routes so
    // `get_stats` and `delete_completed_tasks` never parse as task ids.
    Router::new()
        .route("/todos", get(list_tasks).post(create_task))
        .route("/todos/get_stats", get(get_stats))
        .route("/todos/delete_completed_tasks", delete(delete_completed))
        .route(
            "/todos/:id",
            get(get_task)
                .put(update_task)
                .patch(toggle_task)
                .delete(delete_task),
        )
}

fn parse_task_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|e| ApiError::InvalidId(e.to_string()))
}

#[instrument(skip(state))]
async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let mut tasks = repo::list_by_owner(&state.db, user_id).await?;
    // Newest first; stable in-memory sort over the full result set.
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let items = tasks
        .into_iter()
        .map(TaskResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let (title, description) = match (payload.title, payload.description) {
        (Some(t), Some(d)) if !t.is_empty() && !d.is_empty() => (t, d),
        _ => {
            return Err(ApiError::Validation(
                "Please provide title and description.".to_string(),
            ))
        }
    };

    let task = repo::insert(&state.db, user_id, title, description).await?;
    info!(%user_id, task_id = ?task.id, "task created");
    Ok((StatusCode::CREATED, Json(TaskResponse::try_from(task)?)))
}

#[instrument(skip(state))]
async fn get_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TaskStats>, ApiError> {
    let total = repo::count_by_owner(&state.db, user_id).await?;
    let completed = repo::count_completed(&state.db, user_id).await?;
    Ok(Json(TaskStats::from_counts(total, completed)))
}

#[instrument(skip(state))]
async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let task = repo::find_by_id_and_owner(&state.db, task_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
    Ok(Json(TaskResponse::try_from(task)?))
}

#[instrument(skip(state, payload))]
async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let result = repo::apply_patch(&state.db, task_id, user_id, &payload).await?;
    if result.matched_count == 0 && result.modified_count == 0 {
        warn!(%user_id, %task_id, "update matched nothing");
        return Err(ApiError::NotFound("Todo not found".to_string()));
    }

    // Re-fetch with the owner filter; a racing delete surfaces as 404.
    let task = repo::find_by_id_and_owner(&state.db, task_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
    info!(%user_id, %task_id, "task updated");
    Ok(Json(TaskResponse::try_from(task)?))
}

#[instrument(skip(state))]
async fn toggle_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let task = repo::find_by_id_and_owner(&state.db, task_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    repo::set_completed(&state.db, task_id, user_id, !task.completed).await?;

    let updated = repo::find_by_id_and_owner(&state.db, task_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    info!(%user_id, %task_id, completed = updated.completed, "task toggled");
    Ok(Json(TaskResponse::try_from(updated)?))
}

#[instrument(skip(state))]
async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let result = repo::delete_by_id_and_owner(&state.db, task_id, user_id).await?;
    if result.deleted_count == 0 {
        // Nonexistent and not-owned look identical on purpose.
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    info!(%user_id, %task_id, "task deleted");
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

#[instrument(skip(state))]
async fn delete_completed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = repo::delete_completed(&state.db, user_id).await?;
    info!(%user_id, deleted = result.deleted_count, "completed tasks deleted");
    Ok(Json(json!({
        "message": format!("{} completed todos deleted", result.deleted_count)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_hex_id_parses() {
        let id = ObjectId::new().to_hex();
        assert!(parse_task_id(&id).is_ok());
    }

    #[test]
    fn malformed_id_is_invalid_not_missing() {
        let err = parse_task_id("get_stats-is-not-an-id").expect_err("should fail");
        assert!(matches!(err, ApiError::InvalidId(_)));
    }

    #[test]
    fn short_hex_is_rejected() {
        assert!(parse_task_id("abc123").is_err());
    }
}
