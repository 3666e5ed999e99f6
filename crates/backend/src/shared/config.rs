use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

/// Настройки HTTP API для отправки писем
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    #[serde(default = "default_email_api_url")]
    pub email_api_url: String,
    /// Пустой ключ означает, что отправка писем не настроена
    #[serde(default)]
    pub email_api_key: String,
    #[serde(default = "default_email_from")]
    pub email_from: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            email_api_url: default_email_api_url(),
            email_api_key: String::new(),
            email_from: default_email_from(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_email_api_url() -> String {
    "https://api.resend.com/emails".into()
}

fn default_email_from() -> String {
    "Commandes <commandes@example.com>".into()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000

[notifications]
email_api_url = "https://api.resend.com/emails"
email_api_key = ""
email_from = "Commandes <commandes@example.com>"
timeout_secs = 10
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `EMAIL_API_KEY` from the environment overrides the configured key.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    if let Ok(key) = std::env::var("EMAIL_API_KEY") {
        if !key.trim().is_empty() {
            config.notifications.email_api_key = key.trim().to_string();
        }
    }
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Сохранить загруженную конфигурацию для остальных модулей
pub fn install(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already installed, keeping the first one");
    }
}

/// Текущая конфигурация (встроенная по умолчанию, если `install` не вызывался)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Config {
            database: DatabaseConfig {
                path: "target/db/app.db".into(),
            },
            server: ServerConfig::default(),
            notifications: NotificationsConfig::default(),
        })
    })
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    // If absolute path, use as is
    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    // If relative path, resolve it relative to the executable directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved_path = exe_dir.join(db_path);
            return Ok(resolved_path);
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert!(config.notifications.email_api_key.is_empty());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str(
            r#"
[database]
path = "/var/lib/commandes/app.db"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.notifications.email_api_url,
            "https://api.resend.com/emails"
        );
        assert_eq!(config.notifications.timeout_secs, 10);
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/var/lib/commandes/app.db")
        );
    }
}
