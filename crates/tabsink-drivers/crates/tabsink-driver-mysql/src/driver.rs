//! MySQL driver implementation

use async_trait::async_trait;
use std::sync::Arc;
use tabsink_core::{
    Connection, ConnectionConfig, DatabaseDriver, Result, SqlDialect, TabsinkError,
};

use crate::{MySqlConnection, MySqlDialect};

/// MySQL database driver
pub struct MySqlDriver;

impl MySqlDriver {
    /// Create a new MySQL driver instance
    pub fn new() -> Self {
        tracing::debug!("MySQL driver initialized");
        Self
    }
}

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn display_name(&self) -> &'static str {
        "MySQL"
    }

    fn default_port(&self) -> Option<u16> {
        Some(3306)
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let host = if config.host.is_empty() {
            "localhost".to_string()
        } else {
            config.host.clone()
        };
        let port = if config.port > 0 { config.port } else { 3306 };

        let conn = MySqlConnection::connect(
            &host,
            port,
            config.database.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to connect to MySQL database");
            TabsinkError::Connection(format!("Failed to connect to MySQL database: {}", e))
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
        let port = if config.port > 0 { config.port } else { 3306 };

        let mut conn_str = String::from("mysql://");

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
        Some(Arc::new(MySqlDialect::new()))
    }
}
