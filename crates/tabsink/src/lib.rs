//! Tabsink - write tabular data to databases, inferring the schema on
//! demand
//!
//! The SQL path infers a column type per dataset column, synthesizes a
//! table definition with a server-generated key, creates the table
//! idempotently, then reconciles the data against the schema the database
//! actually reports before issuing one bulk insert:
//!
//! ```no_run
//! use tabsink::{SqlWriter, WriteOptions};
//! use tabsink_core::{ConnectionConfig, Dataset, Value};
//!
//! # async fn run() -> tabsink_core::Result<()> {
//! let config = ConnectionConfig::new("postgresql")
//!     .host("localhost")
//!     .database("warehouse")
//!     .username("loader")
//!     .password("secret");
//!
//! let data = Dataset::from_columns(vec![
//!     ("name", vec![Value::String("A".into()), Value::String("B".into())]),
//!     ("y", vec![Value::Float64(1.5), Value::Float64(f64::NAN)]),
//! ])?;
//!
//! let writer = SqlWriter::connect(config).await?;
//! let outcome = writer.write(&data, "people", &WriteOptions::default()).await;
//! writer.dispose().await?;
//! let (result, _table) = outcome?;
//! assert_eq!(result.rows_written, 2);
//! # Ok(())
//! # }
//! ```
//!
//! The NoSQL path ([`NoSqlWriter`]) is a passthrough: rows become
//! documents, one `insert_many` per write.

mod infer;
mod nosql;
mod reconcile;
mod sql;

#[cfg(test)]
mod infer_tests;
#[cfg(test)]
mod reconcile_tests;
#[cfg(test)]
mod sql_tests;

pub use infer::{infer_column, DEFAULT_MAX_TEXT_LENGTH};
pub use nosql::{MongoWriter, NoSqlWriter};
pub use reconcile::reconcile;
pub use sql::{SqlWriter, WriteOptions};

pub use tabsink_core::{
    ColumnDef, ColumnInfo, ColumnKind, ConnectionConfig, Dataset, InsertResult, Result,
    TableDefinition, TabsinkError, Value,
};
pub use tabsink_drivers::DriverRegistry;
