//! Database driver trait definition

use crate::{Connection, Result, SqlDialect};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Driver ID or public dialect name (e.g. "postgres", "postgresql")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 = driver default)
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Additional connection parameters
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            host: String::new(),
            port: 0,
            database: None,
            username: None,
            password: None,
            params: HashMap::new(),
        }
    }

    /// Set the host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the database name
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Set the username
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Set the password
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Get a string parameter, falling back to the known fields
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }
}

/// Core driver trait that all database drivers implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g. "postgres", "mysql")
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Driver name
    fn name(&self) -> &'static str;

    /// Human-readable name (e.g. "PostgreSQL", "MySQL")
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Default connection port
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Test connectivity with a throwaway connection
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()>;

    /// Build a connection string from configuration
    fn build_connection_string(&self, config: &ConnectionConfig) -> String;

    /// SQL dialect for this driver; `None` for non-SQL databases
    fn sql_dialect(&self) -> Option<Arc<dyn SqlDialect>> {
        None
    }
}
