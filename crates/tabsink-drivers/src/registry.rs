//! Driver registry for managing available database drivers

use std::collections::HashMap;
use std::sync::Arc;
use tabsink_core::DatabaseDriver;

/// Map a public dialect name to the internal driver id.
///
/// Callers configure writers with the database product name; drivers
/// register under their own ids. Returns `None` for unsupported names.
pub fn resolve_driver_id(dialect: &str) -> Option<&'static str> {
    match dialect.to_lowercase().as_str() {
        "mysql" | "mariadb" => Some("mysql"),
        "postgres" | "postgresql" => Some("postgres"),
        "mssql" | "sqlserver" => Some("mssql"),
        "mongo" | "mongodb" => Some("mongodb"),
        _ => None,
    }
}

/// Registry of available database drivers
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // SQL databases
        #[cfg(feature = "postgres")]
        registry.register(Arc::new(crate::postgres::PostgresDriver::new()));
        #[cfg(feature = "mysql")]
        registry.register(Arc::new(crate::mysql::MySqlDriver::new()));
        #[cfg(feature = "mssql")]
        registry.register(Arc::new(crate::mssql::MssqlDriver::new()));

        // NoSQL databases
        #[cfg(feature = "mongodb")]
        registry.register(Arc::new(crate::mongodb::MongoDriver::new()));

        registry
    }

    /// Register a new driver
    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        let name = driver.name().to_string();
        tracing::info!(driver = %name, "registering database driver");
        self.drivers.insert(name, driver);
    }

    /// Get a driver by its registered id
    pub fn get(&self, name: &str) -> Option<Arc<dyn DatabaseDriver>> {
        let driver = self.drivers.get(name).cloned();
        if driver.is_none() {
            tracing::warn!(driver = %name, "driver not found in registry");
        }
        driver
    }

    /// Get a driver by public dialect name, resolving aliases
    pub fn resolve(&self, dialect: &str) -> Option<Arc<dyn DatabaseDriver>> {
        resolve_driver_id(dialect).and_then(|id| self.get(id))
    }

    /// List all registered driver ids
    pub fn list(&self) -> Vec<&str> {
        self.drivers.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a driver is registered
    pub fn has(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_public_dialect_names() {
        assert_eq!(resolve_driver_id("mysql"), Some("mysql"));
        assert_eq!(resolve_driver_id("postgresql"), Some("postgres"));
        assert_eq!(resolve_driver_id("SQLServer"), Some("mssql"));
        assert_eq!(resolve_driver_id("mongo"), Some("mongodb"));
        assert_eq!(resolve_driver_id("oracle"), None);
    }

    #[test]
    fn default_registry_contains_all_drivers() {
        let registry = DriverRegistry::with_defaults();
        assert!(registry.has("postgres"));
        assert!(registry.has("mysql"));
        assert!(registry.has("mssql"));
        assert!(registry.has("mongodb"));
    }

    #[test]
    fn resolve_goes_through_aliases() {
        let registry = DriverRegistry::with_defaults();
        assert!(registry.resolve("sqlserver").is_some());
        assert!(registry.resolve("postgresql").is_some());
        assert!(registry.resolve("dbase").is_none());
    }
}
