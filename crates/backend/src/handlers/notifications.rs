use axum::http::StatusCode;
use axum::Json;
use contracts::shared::notifications::{
    EmailNotificationRequest, NotificationResponse, SmsNotificationRequest,
};

use crate::shared::config;
use crate::shared::notifications::{email, sms, NotificationError};

fn error_response(e: NotificationError) -> (StatusCode, Json<NotificationResponse>) {
    let status = match &e {
        NotificationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        NotificationError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        NotificationError::Provider { .. } | NotificationError::Network(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    if status.is_server_error() {
        tracing::error!("Notification failed: {}", e);
    }
    (
        status,
        Json(NotificationResponse {
            success: false,
            simulated: false,
            message: e.to_string(),
            provider_id: None,
        }),
    )
}

/// POST /api/notifications/email
pub async fn send_email(
    Json(req): Json<EmailNotificationRequest>,
) -> Result<Json<NotificationResponse>, (StatusCode, Json<NotificationResponse>)> {
    email::send_ready_email(&config::get().notifications, &req)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /api/notifications/sms
pub async fn send_sms(
    Json(req): Json<SmsNotificationRequest>,
) -> Result<Json<NotificationResponse>, (StatusCode, Json<NotificationResponse>)> {
    sms::send_sms(&req).map(Json).map_err(error_response)
}
