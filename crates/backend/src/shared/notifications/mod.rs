//! Уведомления клиентов о готовности заказа.

pub mod email;
pub mod sms;

use thiserror::Error;

/// Ошибки отправки уведомлений
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Email delivery is not configured")]
    NotConfigured,

    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for NotificationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NotificationError::Network(format!("timeout: {}", e))
        } else {
            NotificationError::Network(e.to_string())
        }
    }
}
