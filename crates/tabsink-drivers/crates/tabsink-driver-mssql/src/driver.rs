//! MS SQL Server driver implementation

use async_trait::async_trait;
use std::sync::Arc;
use tabsink_core::{
    Connection, ConnectionConfig, DatabaseDriver, Result, SqlDialect, TabsinkError,
};

use crate::{MssqlConnection, MssqlDialect};

/// MS SQL Server database driver
pub struct MssqlDriver;

impl MssqlDriver {
    /// Create a new MS SQL Server driver instance
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server driver initialized");
        Self
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MssqlDriver {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn display_name(&self) -> &'static str {
        "MS SQL Server"
    }

    fn default_port(&self) -> Option<u16> {
        Some(1433)
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let host = if config.host.is_empty() {
            "localhost".to_string()
        } else {
            config.host.clone()
        };
        let port = if config.port > 0 { config.port } else { 1433 };
        let trust_cert = config
            .params
            .get("trust_cert")
            .map(|v| v == "true")
            .unwrap_or(true);

        let conn = MssqlConnection::connect(
            &host,
            port,
            config.database.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
            trust_cert,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to connect to MS SQL Server");
            TabsinkError::Connection(format!("Failed to connect to MS SQL Server: {}", e))
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
        let port = if config.port > 0 { config.port } else { 1433 };

        let mut conn_str = format!("Server={},{}", host, port);

        if let Some(db) = &config.database {
            conn_str.push_str(&format!(";Database={}", db));
        }
        if let Some(u) = &config.username {
            conn_str.push_str(&format!(";User Id={}", u));
        }
        if config.password.is_some() {
            conn_str.push_str(";Password=***");
        }

        conn_str
    }

    fn sql_dialect(&self) -> Option<Arc<dyn SqlDialect>> {
        Some(Arc::new(MssqlDialect::new()))
    }
}
