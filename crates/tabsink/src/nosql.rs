//! NoSQL writer: document passthrough for MongoDB

use tabsink_core::{
    Connection, ConnectionConfig, Dataset, InsertResult, Result, TabsinkError,
};
use tabsink_drivers::mongodb::{MongoConnection, MongoDriver};

use crate::sql::validate_credentials;

/// Writes tabular data into document collections.
///
/// The backing store is picked once at construction from the `dbtype`
/// string; operations never re-dispatch.
pub enum NoSqlWriter {
    /// MongoDB backend
    Mongo(MongoWriter),
}

impl std::fmt::Debug for NoSqlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoSqlWriter::Mongo(_) => f.debug_tuple("Mongo").finish(),
        }
    }
}

impl NoSqlWriter {
    /// Connect to a NoSQL database by type name (`mongo`)
    pub async fn connect(dbtype: &str, config: ConnectionConfig) -> Result<Self> {
        match dbtype.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(NoSqlWriter::Mongo(MongoWriter::connect(config).await?)),
            other => Err(TabsinkError::Configuration(format!(
                "unsupported NoSQL database type `{}`; expected mongo",
                other
            ))),
        }
    }

    /// List database names on the server
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.list_databases().await,
        }
    }

    /// List collection names in the configured database
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.list_collections().await,
        }
    }

    /// Write every dataset row into a collection as one batch
    pub async fn write_to_collection(
        &self,
        collection: &str,
        data: &Dataset,
    ) -> Result<InsertResult> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.write_to_collection(collection, data).await,
        }
    }

    /// Count documents in a collection
    pub async fn document_count(&self, collection: &str) -> Result<u64> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.document_count(collection).await,
        }
    }

    /// Delete a collection; a no-op when absent
    pub async fn delete_collection(&self, collection: &str) -> Result<()> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.delete_collection(collection).await,
        }
    }

    /// Delete the configured database
    pub async fn delete_database(&self) -> Result<()> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.delete_database().await,
        }
    }

    /// Release the underlying connection. Required on every exit path.
    pub async fn dispose(&self) -> Result<()> {
        match self {
            NoSqlWriter::Mongo(writer) => writer.dispose().await,
        }
    }
}

/// MongoDB writer: rows become documents, inserted in one batch
pub struct MongoWriter {
    connection: MongoConnection,
}

impl MongoWriter {
    /// Connect to MongoDB
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        validate_credentials(&config)?;
        let connection = MongoDriver::new().connect_mongo(&config).await?;
        Ok(Self { connection })
    }

    /// List database names on the server
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.connection.list_databases().await
    }

    /// List collection names in the configured database
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.connection.list_collections().await
    }

    /// Write every dataset row into a collection as one batch.
    ///
    /// Collections are created implicitly on first insert; null values
    /// are dropped per document rather than stored.
    #[tracing::instrument(skip(self, data), fields(collection = %collection, rows = data.row_count()))]
    pub async fn write_to_collection(
        &self,
        collection: &str,
        data: &Dataset,
    ) -> Result<InsertResult> {
        let written = self.connection.insert_dataset(collection, data).await?;
        tracing::info!(rows_written = written, "collection write completed");
        Ok(InsertResult::new(written))
    }

    /// Count documents in a collection
    pub async fn document_count(&self, collection: &str) -> Result<u64> {
        self.connection.count_documents(collection).await
    }

    /// Delete a collection; a no-op when absent
    pub async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.connection.drop_collection(collection).await
    }

    /// Delete the configured database
    pub async fn delete_database(&self) -> Result<()> {
        self.connection.drop_database().await
    }

    /// Release the underlying connection
    pub async fn dispose(&self) -> Result<()> {
        self.connection.close().await
    }
}
