pub mod repository;

use contracts::shared::logger::LogSource;
use repository::log_event_internal;

/// Логирование события на сервере
///
/// # Примеры
/// ```ignore
/// logger::log("startup", "Сервер запущен");
/// logger::log("a001_order", "Заказ CMD-001 удалён");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal(LogSource::Server, category, message);
}
