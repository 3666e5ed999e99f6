use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use contracts::shared::logger::{CreateLogRequest, LogEntry};
use serde::Deserialize;

use crate::shared::logger;

#[derive(Debug, Deserialize)]
pub struct ListLogsQuery {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/logs
pub async fn list_all(Query(query): Query<ListLogsQuery>) -> Result<Json<Vec<LogEntry>>, StatusCode> {
    let logs = logger::repository::get_all_logs().await.map_err(|e| {
        tracing::error!("Failed to read system log: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let limit = query.limit.unwrap_or(500);
    let logs = logs
        .into_iter()
        .filter(|entry| {
            query
                .category
                .as_deref()
                .map_or(true, |category| entry.category == category)
        })
        .take(limit)
        .collect();
    Ok(Json(logs))
}

/// POST /api/logs
pub async fn create(Json(req): Json<CreateLogRequest>) -> StatusCode {
    if let Err(e) = req.validate() {
        tracing::warn!("Rejected log entry: {}", e);
        return StatusCode::BAD_REQUEST;
    }
    match logger::repository::log_event(req.source, &req.category, &req.message).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> StatusCode {
    match logger::repository::clear_all_logs().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
