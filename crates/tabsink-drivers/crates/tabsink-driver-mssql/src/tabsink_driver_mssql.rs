//! MS SQL Server driver for the tabsink tabular writer

mod connection;
mod dialect;
mod driver;

#[cfg(test)]
mod dialect_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MssqlConnection, MssqlConnectionError};
pub use dialect::MssqlDialect;
pub use driver::MssqlDriver;
