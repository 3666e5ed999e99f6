use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

use crate::shared::config::{self, Config};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const CREATE_ORDER_TABLE: &str = r#"
    CREATE TABLE a001_order (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        comment TEXT,
        client_name TEXT NOT NULL,
        display_title TEXT NOT NULL,
        articles_json TEXT NOT NULL DEFAULT '[]',
        status TEXT NOT NULL DEFAULT 'Non',
        supplier_message TEXT NOT NULL DEFAULT '',
        client_email TEXT,
        client_phone TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_ORDER_CODE_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a001_order_code ON a001_order (code);";

const CREATE_PRODUCT_TABLE: &str = r#"
    CREATE TABLE a002_product (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        description TEXT NOT NULL,
        comment TEXT,
        category TEXT NOT NULL,
        subcategory TEXT,
        unit TEXT NOT NULL DEFAULT '',
        price REAL,
        stock_quantity REAL NOT NULL DEFAULT 0,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_SYSTEM_LOG_TABLE: &str = r#"
    CREATE TABLE system_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        source TEXT NOT NULL,
        category TEXT NOT NULL,
        message TEXT NOT NULL
    );
"#;

/// Подключиться к SQLite по пути из конфигурации и создать недостающие таблицы
pub async fn initialize_database(config: &Config) -> anyhow::Result<()> {
    let db_file = config::get_database_path(config)?;
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_url = build_sqlite_url(&db_file)?;
    tracing::info!("Connecting to database: {}", db_url);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database connection already initialized"))?;
    Ok(())
}

fn build_sqlite_url(path: &Path) -> anyhow::Result<String> {
    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

/// Минимальная инициализация схемы: таблица создаётся, только если её нет
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    ensure_table(conn, "a001_order", CREATE_ORDER_TABLE).await?;
    execute(conn, CREATE_ORDER_CODE_INDEX).await?;
    ensure_table(conn, "a002_product", CREATE_PRODUCT_TABLE).await?;
    ensure_table(conn, "system_log", CREATE_SYSTEM_LOG_TABLE).await?;
    Ok(())
}

async fn ensure_table(
    conn: &DatabaseConnection,
    table_name: &str,
    create_sql: &str,
) -> anyhow::Result<()> {
    let check_sql = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        table_name
    );
    let existing = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check_sql))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", table_name);
        execute(conn, create_sql).await?;
    }
    Ok(())
}

async fn execute(conn: &DatabaseConnection, sql: &str) -> anyhow::Result<()> {
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        sql.to_string(),
    ))
    .await?;
    Ok(())
}

/// Подключение, если БД уже инициализирована
pub fn try_get_connection() -> Option<&'static DatabaseConnection> {
    DB_CONN.get()
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_for_absolute_path() {
        let url = build_sqlite_url(Path::new("/var/lib/app/app.db")).unwrap();
        assert_eq!(url, "sqlite:///var/lib/app/app.db?mode=rwc");
    }
}
