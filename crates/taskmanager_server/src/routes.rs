//! Task HTTP Routes
//!
//! `/tasks` collection and `/tasks/:task_id` item endpoints. Every handler
//! validates its input before opening a storage session.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use taskmanager_core::validation::{
    decode_body, parse_completed_filter, parse_full_params, parse_partial_params, parse_task_id,
};
use taskmanager_core::{Database, Task};

use crate::error::{ApiError, ApiResult};
use crate::session::with_session;

// ==================
// Shared State
// ==================

/// State shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub database: Database,
}

impl AppState {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

// ==================
// Routes
// ==================

/// Build the task routes
pub fn task_routes(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:task_id",
            get(get_task)
                .put(replace_task)
                .patch(patch_task)
                .delete(delete_task),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let params = parse_full_params(&decode_body(&body)?)?;
    let task = with_session(&state.database, move |service| service.create_task(&params)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Task>>> {
    let completed = parse_completed_filter(last_query_value(&pairs, "completed"))?;
    let tasks = with_session(&state.database, move |service| service.list_tasks(completed)).await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&raw_id)?;
    let task = with_session(&state.database, move |service| service.get_task(id)).await?;
    Ok(Json(task))
}

async fn replace_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&raw_id)?;
    let params = parse_full_params(&decode_body(&body)?)?;
    let task = with_session(&state.database, move |service| {
        service.replace_task(id, &params)
    })
    .await?;
    Ok(Json(task))
}

async fn patch_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&raw_id)?;
    let patch = parse_partial_params(&decode_body(&body)?)?;
    let task = with_session(&state.database, move |service| service.patch_task(id, &patch)).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&raw_id)?;
    with_session(&state.database, move |service| service.delete_task(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown routes
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Fallback for a known path hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// A repeated query key resolves to its last occurrence.
fn last_query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::last_query_value;

    #[test]
    fn test_last_query_value_prefers_last_occurrence() {
        let pairs = vec![
            ("completed".to_string(), "true".to_string()),
            ("page".to_string(), "2".to_string()),
            ("completed".to_string(), "false".to_string()),
        ];
        assert_eq!(last_query_value(&pairs, "completed"), Some("false"));
        assert_eq!(last_query_value(&pairs, "missing"), None);
    }
}
