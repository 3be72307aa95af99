//! Tabsink Drivers - driver registry and re-exports
//!
//! One crate to depend on for "give me a driver by dialect name". Each
//! driver lives in its own crate and is compiled in through a feature
//! flag; all four are on by default.

mod registry;

pub use registry::{DriverRegistry, resolve_driver_id};

#[cfg(feature = "postgres")]
pub use tabsink_driver_postgres as postgres;

#[cfg(feature = "mysql")]
pub use tabsink_driver_mysql as mysql;

#[cfg(feature = "mssql")]
pub use tabsink_driver_mssql as mssql;

#[cfg(feature = "mongodb")]
pub use tabsink_driver_mongodb as mongodb;
