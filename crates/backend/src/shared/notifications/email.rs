use contracts::shared::notifications::{EmailNotificationRequest, NotificationResponse};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::NotificationError;
use crate::shared::config::NotificationsConfig;
use crate::shared::logger;

/// Тело запроса к HTTP API почтового сервиса
#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    id: Option<String>,
}

/// Письмо по фиксированному шаблону "заказ готов"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyEmail {
    pub subject: String,
    pub html: String,
}

pub fn render_ready_email(order_number: &str) -> ReadyEmail {
    let order_number = escape_html(order_number);
    ReadyEmail {
        subject: format!("Votre commande {} est prête", order_number),
        html: format!(
            "<p>Bonjour,</p>\
             <p>Votre commande <strong>{}</strong> est prête et peut être retirée au comptoir.</p>\
             <p>Merci de votre confiance.</p>",
            order_number
        ),
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn validate(request: &EmailNotificationRequest) -> Result<(), NotificationError> {
    let email = request.client_email.trim();
    if email.is_empty() || request.order_number.trim().is_empty() {
        return Err(NotificationError::InvalidRequest(
            "clientEmail and orderNumber are required".into(),
        ));
    }
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(NotificationError::InvalidRequest(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(())
}

/// Отправить письмо "заказ готов" через почтовый HTTP API
pub async fn send_ready_email(
    config: &NotificationsConfig,
    request: &EmailNotificationRequest,
) -> Result<NotificationResponse, NotificationError> {
    validate(request)?;
    if config.email_api_key.trim().is_empty() {
        return Err(NotificationError::NotConfigured);
    }

    let to = request.client_email.trim();
    let order_number = request.order_number.trim();
    let rendered = render_ready_email(order_number);
    let body = OutgoingEmail {
        from: &config.email_from,
        to: vec![to],
        subject: rendered.subject,
        html: rendered.html,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let response = client
        .post(&config.email_api_url)
        .bearer_auth(config.email_api_key.trim())
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Email provider returned {} for order {}: {}", status, order_number, body);
        return Err(NotificationError::Provider {
            status: status.as_u16(),
            body,
        });
    }

    let provider_id = response
        .json::<ProviderResponse>()
        .await
        .ok()
        .and_then(|r| r.id);

    logger::log(
        "notifications",
        &format!("Ready email sent to {} for order {}", to, order_number),
    );

    Ok(NotificationResponse {
        success: true,
        simulated: false,
        message: format!("Email sent to {}", to),
        provider_id,
    })
}
