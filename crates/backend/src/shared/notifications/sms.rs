use contracts::shared::notifications::{NotificationResponse, SmsNotificationRequest};

use super::NotificationError;
use crate::shared::logger;

const MIN_PHONE_DIGITS: usize = 8;

pub fn validate(request: &SmsNotificationRequest) -> Result<(), NotificationError> {
    let phone = request.phone_number.trim();
    if phone.is_empty() || request.message.trim().is_empty() {
        return Err(NotificationError::InvalidRequest(
            "phoneNumber and message are required".into(),
        ));
    }
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '.' || (c == '+' && i == 0));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !allowed || digits < MIN_PHONE_DIGITS {
        return Err(NotificationError::InvalidRequest(format!(
            "Invalid phone number: {}",
            phone
        )));
    }
    Ok(())
}

/// SMS не отправляется: запрос проверяется и записывается в журнал,
/// ответ помечен как `simulated`.
pub fn send_sms(request: &SmsNotificationRequest) -> Result<NotificationResponse, NotificationError> {
    validate(request)?;

    let phone = request.phone_number.trim();
    tracing::info!(
        phone,
        order = request.order_number.as_str(),
        "Simulated SMS delivery: {}",
        request.message
    );
    logger::log(
        "notifications",
        &format!(
            "Simulated SMS to {} for order {}: {}",
            phone, request.order_number, request.message
        ),
    );

    Ok(NotificationResponse {
        success: true,
        simulated: true,
        message: format!("SMS to {} simulated", phone),
        provider_id: None,
    })
}
