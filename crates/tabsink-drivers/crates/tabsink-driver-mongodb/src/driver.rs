//! MongoDB driver implementation

use async_trait::async_trait;
use mongodb::{options::ClientOptions, Client};
use std::sync::Arc;
use tabsink_core::{Connection, ConnectionConfig, DatabaseDriver, Result, TabsinkError};

use crate::MongoConnection;

/// MongoDB database driver
pub struct MongoDriver;

impl MongoDriver {
    /// Create a new MongoDB driver instance
    pub fn new() -> Self {
        tracing::debug!("MongoDB driver initialized");
        Self
    }

    /// Connect and return the concrete connection type.
    ///
    /// The NoSQL writer works against the document API, which the
    /// `Connection` trait object does not expose.
    pub async fn connect_mongo(&self, config: &ConnectionConfig) -> Result<MongoConnection> {
        let connection_string = self.build_connection_string(config);

        let client_options = ClientOptions::parse(&connection_string)
            .await
            .map_err(|e| {
                TabsinkError::Connection(format!("Failed to parse MongoDB options: {}", e))
            })?;

        let client = Client::with_options(client_options).map_err(|e| {
            TabsinkError::Connection(format!("Failed to create MongoDB client: {}", e))
        })?;

        // Verify connectivity; the client itself connects lazily
        client.list_database_names().await.map_err(|e| {
            TabsinkError::Connection(format!("Failed to connect to MongoDB: {}", e))
        })?;

        let database = config
            .database
            .clone()
            .unwrap_or_else(|| "admin".to_string());

        tracing::info!(database = %database, "MongoDB connection established");
        Ok(MongoConnection::new(client, database))
    }
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MongoDriver {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn display_name(&self) -> &'static str {
        "MongoDB"
    }

    fn default_port(&self) -> Option<u16> {
        Some(27017)
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let conn = self.connect_mongo(config).await?;
        Ok(Arc::new(conn))
    }

    #[tracing::instrument(skip(self, config))]
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        let conn = self.connect_mongo(config).await?;
        conn.list_databases().await?;
        conn.close().await
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let host = if config.host.is_empty() {
            "localhost"
        } else {
            &config.host
        };
        let port = if config.port > 0 { config.port } else { 27017 };

        let mut conn_str = String::from("mongodb://");

        if let Some(u) = &config.username {
            conn_str.push_str(u);
            if let Some(p) = &config.password {
                conn_str.push(':');
                conn_str.push_str(p);
            }
            conn_str.push('@');
        }

        conn_str.push_str(&format!("{}:{}", host, port));

        conn_str
    }
}
