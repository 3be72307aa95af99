//! MongoDB driver for the tabsink tabular writer

mod connection;
mod documents;
mod driver;

#[cfg(test)]
mod documents_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::MongoConnection;
pub use documents::{dataset_to_documents, value_to_bson};
pub use driver::MongoDriver;
