//! Tabsink Core - shared abstractions for the tabular database writer
//!
//! This crate provides the vocabulary the writer and every driver crate
//! depend on:
//!
//! - `Connection` - trait for database connections
//! - `DatabaseDriver` - trait for driver implementations
//! - `SqlDialect` - per-dialect SQL rendering
//! - `SchemaIntrospection` - live-schema lookup after table creation
//! - `Dataset` - in-memory tabular data
//! - Common types like `Value`, `Row`, `ColumnKind`, `TableDefinition`

mod connection;
mod dataset;
mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use dataset::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
