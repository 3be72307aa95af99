//! PostgreSQL driver implementation

use async_trait::async_trait;
use std::sync::Arc;
use tabsink_core::{
    Connection, ConnectionConfig, DatabaseDriver, Result, SqlDialect, TabsinkError,
};

use crate::{PostgresConnection, PostgresDialect};

/// PostgreSQL database driver
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new PostgreSQL driver instance
    pub fn new() -> Self {
        tracing::debug!("PostgreSQL driver initialized");
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn default_port(&self) -> Option<u16> {
        Some(5432)
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let host = if config.host.is_empty() {
            "localhost".to_string()
        } else {
            config.host.clone()
        };
        let port = if config.port > 0 { config.port } else { 5432 };
        let database = config
            .database
            .clone()
            .unwrap_or_else(|| "postgres".to_string());

        let conn = PostgresConnection::connect(
            &host,
            port,
            &database,
            config.username.as_deref(),
            config.password.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to connect to PostgreSQL database");
            TabsinkError::Connection(format!("Failed to connect to PostgreSQL database: {}", e))
        })?;

        Ok(Arc::new(conn))
    }

    #[tracing::instrument(skip(self, config))]
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        let conn = self.connect(config).await?;
        conn.query("SELECT 1", &[]).await?;
        conn.close().await
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let host = if config.host.is_empty() {
            "localhost"
        } else {
            &config.host
        };
        let port = if config.port > 0 { config.port } else { 5432 };

        let mut conn_str = String::from("postgres://");

        if let Some(u) = &config.username {
            conn_str.push_str(u);
            if let Some(p) = &config.password {
                conn_str.push(':');
                conn_str.push_str(p);
            }
            conn_str.push('@');
        }

        conn_str.push_str(&format!("{}:{}", host, port));

        if let Some(db) = &config.database {
            conn_str.push('/');
            conn_str.push_str(db);
        }

        conn_str
    }

    fn sql_dialect(&self) -> Option<Arc<dyn SqlDialect>> {
        Some(Arc::new(PostgresDialect::new()))
    }
}
