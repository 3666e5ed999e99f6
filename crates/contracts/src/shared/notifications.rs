use serde::{Deserialize, Serialize};

/// Запрос на отправку письма "заказ готов"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailNotificationRequest {
    #[serde(rename = "clientEmail", default)]
    pub client_email: String,
    #[serde(rename = "orderNumber", default)]
    pub order_number: String,
}

/// Запрос на отправку SMS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsNotificationRequest {
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "orderNumber", default)]
    pub order_number: String,
}

/// Ответ сервиса уведомлений
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub success: bool,
    /// Доставка не выполнялась, только журналирование
    #[serde(default)]
    pub simulated: bool,
    pub message: String,
    /// ID письма/сообщения у провайдера, если он его вернул
    #[serde(rename = "providerId", default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}
