use serde::{Deserialize, Serialize};

/// Откуда пришло событие журнала
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Server,
    /// Приложение на стороне клиента (прилавок, админка)
    #[default]
    Client,
}

impl LogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Server => "server",
            LogSource::Client => "client",
        }
    }
}

impl From<&str> for LogSource {
    fn from(value: &str) -> Self {
        match value {
            "server" => LogSource::Server,
            _ => LogSource::Client,
        }
    }
}

/// Событие системного журнала
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    /// UTC, `%Y-%m-%d %H:%M:%S%.3f`
    pub timestamp: String,
    pub source: LogSource,
    /// Обычно полное имя агрегата (`a001_order`) или `notifications`
    pub category: String,
    pub message: String,
}

/// Запись события из клиентского приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogRequest {
    #[serde(default)]
    pub source: LogSource,
    pub category: String,
    pub message: String,
}

impl CreateLogRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("category is required".into());
        }
        if self.message.trim().is_empty() {
            return Err("message is required".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_defaults_to_client() {
        let req: CreateLogRequest =
            serde_json::from_str(r#"{"category": "a001_order", "message": "Impression bon"}"#)
                .unwrap();
        assert_eq!(req.source, LogSource::Client);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_blank_message_is_rejected() {
        let req = CreateLogRequest {
            source: LogSource::Server,
            category: "startup".into(),
            message: "  ".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_source_from_stored_text() {
        assert_eq!(LogSource::from("server"), LogSource::Server);
        assert_eq!(LogSource::from("client"), LogSource::Client);
        assert_eq!(LogSource::Server.as_str(), "server");
    }
}
