//! MongoDB connection wrapper

use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use tabsink_core::{
    Connection, Dataset, QueryResult, Result, SchemaIntrospection, StatementResult, TabsinkError,
    Value,
};

use crate::documents::dataset_to_documents;

/// MongoDB connection: one client scoped to one database
pub struct MongoConnection {
    client: Client,
    database: String,
    closed: AtomicBool,
}

impl MongoConnection {
    /// Create a connection from an established client
    pub fn new(client: Client, database: String) -> Self {
        Self {
            client,
            database,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.is_closed() {
            return Err(TabsinkError::Connection(
                "MongoDB connection is closed".into(),
            ));
        }
        Ok(())
    }

    /// The database this connection is scoped to
    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// List database names on the server
    #[tracing::instrument(skip(self))]
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.ensure_not_closed()?;
        self.client
            .list_database_names()
            .await
            .map_err(|e| TabsinkError::Query(format!("Failed to list databases: {}", e)))
    }

    /// List collection names in the scoped database
    #[tracing::instrument(skip(self))]
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.ensure_not_closed()?;
        self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(|e| TabsinkError::Query(format!("Failed to list collections: {}", e)))
    }

    /// Insert every dataset row into a collection as one batch.
    ///
    /// The collection is created implicitly on first insert, which is the
    /// document-store analogue of create-on-demand.
    #[tracing::instrument(skip(self, data), fields(rows = data.row_count()))]
    pub async fn insert_dataset(&self, collection: &str, data: &Dataset) -> Result<u64> {
        self.ensure_not_closed()?;
        let documents = dataset_to_documents(data);
        if documents.is_empty() {
            return Ok(0);
        }

        let result = self
            .client
            .database(&self.database)
            .collection::<Document>(collection)
            .insert_many(documents)
            .await
            .map_err(|e| TabsinkError::Insert(format!("Failed to insert documents: {}", e)))?;

        let inserted = result.inserted_ids.len() as u64;
        tracing::debug!(inserted = inserted, "documents inserted");
        Ok(inserted)
    }

    /// Count documents in a collection
    #[tracing::instrument(skip(self))]
    pub async fn count_documents(&self, collection: &str) -> Result<u64> {
        self.ensure_not_closed()?;
        self.client
            .database(&self.database)
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(|e| TabsinkError::Query(format!("Failed to count documents: {}", e)))
    }

    /// Drop a collection; a no-op when the collection does not exist
    #[tracing::instrument(skip(self))]
    pub async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.ensure_not_closed()?;
        self.client
            .database(&self.database)
            .collection::<Document>(collection)
            .drop()
            .await
            .map_err(|e| TabsinkError::Schema(format!("Failed to drop collection: {}", e)))
    }

    /// Drop the scoped database
    #[tracing::instrument(skip(self))]
    pub async fn drop_database(&self) -> Result<()> {
        self.ensure_not_closed()?;
        self.client
            .database(&self.database)
            .drop()
            .await
            .map_err(|e| TabsinkError::Schema(format!("Failed to drop database: {}", e)))
    }
}

#[async_trait]
impl Connection for MongoConnection {
    fn driver_name(&self) -> &str {
        "mongodb"
    }

    async fn execute(&self, _sql: &str, _params: &[Value]) -> Result<StatementResult> {
        Err(TabsinkError::NotSupported(
            "MongoDB does not execute SQL statements".into(),
        ))
    }

    async fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        Err(TabsinkError::NotSupported(
            "MongoDB does not execute SQL queries".into(),
        ))
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        let collections = self.list_collections().await?;
        Ok(collections.iter().any(|c| c == table))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("MongoDB connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }
}
