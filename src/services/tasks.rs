//! Recurring-task board and its activity log, both partitioned by
//! category. The category rides in the body on mutations, including
//! deletes — the backend routes on it.

use serde_json::json;

use super::MessageResponse;
use crate::api::{with_query, ApiClient};
use crate::error::ApiError;
use crate::models::{DashboardStatistics, LogEntry, Task, TaskCategory};

pub async fn add(
    client: &ApiClient,
    title: &str,
    description: Option<&str>,
    category: TaskCategory,
) -> Result<Task, ApiError> {
    client
        .post_json(
            "/tasks/",
            &json!({ "title": title, "description": description, "category": category }),
        )
        .await
}

pub async fn list(client: &ApiClient, category: TaskCategory) -> Result<Vec<Task>, ApiError> {
    client
        .get(&with_query("/tasks/", &[("category", category.as_str())]))
        .await
}

pub async fn complete(
    client: &ApiClient,
    task_id: i64,
    category: TaskCategory,
) -> Result<Task, ApiError> {
    client
        .put_json(
            &format!("/tasks/{task_id}/complete"),
            &json!({ "category": category }),
        )
        .await
}

/// Re-open a completed task for its next recurrence.
pub async fn reset(
    client: &ApiClient,
    task_id: i64,
    category: TaskCategory,
) -> Result<Task, ApiError> {
    client
        .put_json(
            &format!("/tasks/{task_id}/reset"),
            &json!({ "category": category }),
        )
        .await
}

pub async fn delete(
    client: &ApiClient,
    task_id: i64,
    category: TaskCategory,
) -> Result<MessageResponse, ApiError> {
    client
        .delete_json(&format!("/tasks/{task_id}"), &json!({ "category": category }))
        .await
}

pub async fn logs(client: &ApiClient, category: TaskCategory) -> Result<Vec<LogEntry>, ApiError> {
    client
        .get(&with_query("/tasks/logs", &[("category", category.as_str())]))
        .await
}

pub async fn clear_logs(
    client: &ApiClient,
    category: TaskCategory,
) -> Result<MessageResponse, ApiError> {
    client
        .delete_json("/tasks/logs/clear", &json!({ "category": category }))
        .await
}

/// Direct-download link for the category's log export.
pub fn logs_download_url(client: &ApiClient, category: TaskCategory) -> String {
    client.absolute_url(&with_query(
        "/tasks/logs/download",
        &[("category", category.as_str())],
    ))
}

pub async fn statistics(client: &ApiClient) -> Result<DashboardStatistics, ApiError> {
    client.get("/tasks/statistics").await
}
