//! Connection trait

use crate::{QueryResult, Result, SchemaIntrospection, StatementResult, Value};
use async_trait::async_trait;

/// A database connection.
///
/// One handle per writer instance, exclusively owned; `close` must be
/// called on every exit path or the underlying network resource leaks.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g. "postgres", "mysql", "mssql")
    fn driver_name(&self) -> &str;

    /// Get the dialect identifier for this connection, if it speaks SQL
    fn dialect_id(&self) -> Option<&'static str> {
        None
    }

    /// Execute a statement that modifies data or schema
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Check whether a table exists in the connection's default schema
    async fn has_table(&self, table: &str) -> Result<bool>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get schema introspection interface if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }
}
