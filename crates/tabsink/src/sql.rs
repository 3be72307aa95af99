//! SQL writer: schema synthesis, idempotent create/drop, and the write
//! orchestration

use std::sync::Arc;
use tabsink_core::{
    ColumnDef, ColumnInfo, Connection, ConnectionConfig, Dataset, InsertResult, Result,
    SchemaIntrospection, SqlDialect, TableDefinition, TabsinkError,
};
use tabsink_drivers::{resolve_driver_id, DriverRegistry};

use crate::infer::{infer_column, DEFAULT_MAX_TEXT_LENGTH};
use crate::reconcile::reconcile;

/// Options for a single write call
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Name of the key column; dropped from the data and re-synthesized
    /// as a server-generated key
    pub identifier: String,
    /// Drop any existing table of the same name before creating
    pub drop_first: bool,
    /// Clean column names (trim whitespace, strip double quotes)
    pub clean_columns: bool,
    /// Maximum length for inferred text columns
    pub max_text_length: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            identifier: "id".to_string(),
            drop_first: false,
            clean_columns: true,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

/// Check dialect name and credentials before any network call
pub(crate) fn validate_credentials(config: &ConnectionConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        return Err(TabsinkError::Configuration("missing host".into()));
    }
    if config
        .username
        .as_deref()
        .map(|u| u.trim().is_empty())
        .unwrap_or(true)
    {
        return Err(TabsinkError::Configuration("missing username".into()));
    }
    if config.password.is_none() {
        return Err(TabsinkError::Configuration("missing password".into()));
    }
    if config
        .database
        .as_deref()
        .map(|d| d.trim().is_empty())
        .unwrap_or(true)
    {
        return Err(TabsinkError::Configuration("missing database name".into()));
    }
    Ok(())
}

/// Writes tabular data into SQL database tables, creating the schema on
/// demand.
///
/// One writer owns one connection for its whole lifetime. Callers must
/// release it with [`SqlWriter::dispose`] on every exit path; there is no
/// implicit cleanup of the network resource. Calls against the same table
/// name from several writers race; serialization is the caller's job.
pub struct SqlWriter {
    connection: Arc<dyn Connection>,
    dialect: Arc<dyn SqlDialect>,
}

impl std::fmt::Debug for SqlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlWriter").finish_non_exhaustive()
    }
}

impl SqlWriter {
    /// Connect to a database by public dialect name (`mysql`,
    /// `postgresql`, `sqlserver`).
    ///
    /// Fails with [`TabsinkError::Configuration`] for unknown dialects or
    /// missing credentials before any connection attempt.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let Some(driver_id) = resolve_driver_id(&config.driver) else {
            return Err(TabsinkError::Configuration(format!(
                "unsupported dialect `{}`; expected one of mysql, postgresql, sqlserver",
                config.driver
            )));
        };
        validate_credentials(&config)?;

        let registry = DriverRegistry::with_defaults();
        let driver = registry.get(driver_id).ok_or_else(|| {
            TabsinkError::Configuration(format!("driver `{}` is not compiled in", driver_id))
        })?;
        let dialect = driver.sql_dialect().ok_or_else(|| {
            TabsinkError::Configuration(format!("`{}` is not a SQL dialect", config.driver))
        })?;

        let connection = driver.connect(&config).await?;
        Ok(Self::from_parts(connection, dialect))
    }

    /// Build a writer from an already established connection and dialect
    pub fn from_parts(connection: Arc<dyn Connection>, dialect: Arc<dyn SqlDialect>) -> Self {
        Self {
            connection,
            dialect,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.connection.is_closed() {
            return Err(TabsinkError::Schema("connection is closed".into()));
        }
        Ok(())
    }

    fn introspection(&self) -> Result<&dyn SchemaIntrospection> {
        self.connection.as_schema_introspection().ok_or_else(|| {
            TabsinkError::NotSupported(format!(
                "driver `{}` does not support schema introspection",
                self.connection.driver_name()
            ))
        })
    }

    /// Synthesize a table definition from the dataset.
    ///
    /// The identifier column goes first as a server-generated key; if the
    /// data carries a column of that name it is dropped; its values are
    /// never trusted. The returned dataset is the identifier-stripped copy
    /// the caller should reconcile and insert.
    pub fn synthesize(
        &self,
        dataset: &Dataset,
        table_name: &str,
        identifier: &str,
        max_text_length: u32,
    ) -> Result<(TableDefinition, Dataset)> {
        self.ensure_open()?;

        let mut data = dataset.clone();
        if data.contains_column(identifier) {
            tracing::debug!(
                column = %identifier,
                "identifier column present in data; replaced by a generated key"
            );
            data.drop_column(identifier);
        }

        let mut columns = vec![ColumnDef::key(identifier)];
        for column in data.columns() {
            let (kind, nullable) = infer_column(column.values(), max_text_length);
            columns.push(ColumnDef::new(column.name(), kind, nullable));
        }

        Ok((TableDefinition::new(table_name, columns), data))
    }

    /// Create the table if it does not exist yet; no error when present
    #[tracing::instrument(skip(self, table), fields(table = %table.name))]
    pub async fn create_table(&self, table: &TableDefinition) -> Result<()> {
        self.ensure_open()?;
        if self.connection.has_table(&table.name).await? {
            tracing::debug!("table already exists; create skipped");
            return Ok(());
        }

        let sql = self.dialect.create_table_sql(table);
        self.connection
            .execute(&sql, &[])
            .await
            .map_err(as_schema_error)?;
        tracing::info!("table created");
        Ok(())
    }

    /// Drop the table; a no-op when it does not exist
    #[tracing::instrument(skip(self))]
    pub async fn drop_table(&self, table: &str) -> Result<()> {
        self.ensure_open()?;
        if !self.connection.has_table(table).await? {
            tracing::debug!("table does not exist; drop skipped");
            return Ok(());
        }

        let sql = self.dialect.drop_table_sql(table);
        self.connection
            .execute(&sql, &[])
            .await
            .map_err(as_schema_error)?;
        tracing::info!("table dropped");
        Ok(())
    }

    /// Fetch the authoritative post-creation schema for a table, with
    /// primary-key flags merged in
    pub async fn live_schema(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let introspection = self.introspection()?;

        let mut columns = introspection.get_columns(None, table).await?;
        if columns.is_empty() {
            return Err(TabsinkError::Schema(format!(
                "table `{}` not found during schema introspection",
                table
            )));
        }

        if let Some(pk) = introspection.get_primary_key(None, table).await? {
            for column in &mut columns {
                if pk.columns.iter().any(|c| c == &column.name) {
                    column.is_primary_key = true;
                }
            }
        }

        Ok(columns)
    }

    async fn bulk_insert(&self, table: &str, data: &Dataset) -> Result<InsertResult> {
        if data.column_count() == 0 || data.row_count() == 0 {
            tracing::debug!("nothing to insert after reconciliation");
            return Ok(InsertResult::new(0));
        }

        let sql = self.dialect.insert_sql(table, data);
        let result = self
            .connection
            .execute(&sql, &[])
            .await
            .map_err(as_insert_error)?;

        if result.affected_rows != data.row_count() as u64 {
            return Err(TabsinkError::Insert(format!(
                "bulk insert wrote {} rows, expected {}",
                result.affected_rows,
                data.row_count()
            )));
        }

        Ok(InsertResult::new(result.affected_rows))
    }

    /// Write the dataset into a table, creating the schema on demand.
    ///
    /// Sequence: clean names → normalize missing values → synthesize →
    /// optional drop → idempotent create → fetch live schema → reconcile
    /// → single bulk insert. Reconciliation failures abort before any row
    /// is written. Returns the insert outcome plus the definition used,
    /// which the caller may keep to drop the table later.
    #[tracing::instrument(skip(self, dataset, options), fields(table = %table_name, rows = dataset.row_count()))]
    pub async fn write(
        &self,
        dataset: &Dataset,
        table_name: &str,
        options: &WriteOptions,
    ) -> Result<(InsertResult, TableDefinition)> {
        let mut data = dataset.clone();
        if options.clean_columns {
            data.clean_column_names();
        }
        data.normalize_missing();

        let (table, data) =
            self.synthesize(&data, table_name, &options.identifier, options.max_text_length)?;

        if options.drop_first {
            self.drop_table(table_name).await?;
        }
        self.create_table(&table).await?;

        let live = self.live_schema(table_name).await?;
        let reconciled = reconcile(&data, &live)?;
        let result = self.bulk_insert(table_name, &reconciled).await?;

        tracing::info!(rows_written = result.rows_written, "write completed");
        Ok((result, table))
    }

    /// List database names visible on the server
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.introspection()?.list_databases().await
    }

    /// List tables in the connection's default schema
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.introspection()?.list_tables(None).await
    }

    /// Release the underlying connection. Required on every exit path.
    pub async fn dispose(&self) -> Result<()> {
        self.connection.close().await
    }

    /// Whether the underlying connection has been released
    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }
}

fn as_schema_error(err: TabsinkError) -> TabsinkError {
    match err {
        TabsinkError::Query(msg) => TabsinkError::Schema(msg),
        other => other,
    }
}

fn as_insert_error(err: TabsinkError) -> TabsinkError {
    match err {
        TabsinkError::Query(msg) => TabsinkError::Insert(msg),
        other => other,
    }
}
