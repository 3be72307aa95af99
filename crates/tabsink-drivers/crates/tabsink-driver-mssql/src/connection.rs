//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Row as TiberiusRow};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tabsink_core::{
    ColumnInfo, Connection, PrimaryKeyInfo, QueryResult, Result, Row, SchemaIntrospection,
    StatementResult, TabsinkError, Value,
};

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for TabsinkError {
    fn from(err: MssqlConnectionError) -> Self {
        match err {
            MssqlConnectionError::ConnectionFailed(_)
            | MssqlConnectionError::AuthenticationFailed(_)
            | MssqlConnectionError::ConnectionClosed => TabsinkError::Connection(err.to_string()),
            MssqlConnectionError::Io(e) => TabsinkError::Io(e),
            other => TabsinkError::Query(other.to_string()),
        }
    }
}

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: Mutex<Client<Compat<TcpStream>>>,
    closed: AtomicBool,
}

impl MssqlConnection {
    /// Create a new MS SQL Server connection
    #[tracing::instrument(skip(password))]
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        trust_cert: bool,
    ) -> std::result::Result<Self, MssqlConnectionError> {
        tracing::debug!("connecting to MS SQL Server at {}:{}", host, port);

        let mut config = Config::new();
        config.host(host);
        config.port(port);

        if let Some(db) = database {
            config.database(db);
        }

        if trust_cert {
            config.trust_cert();
        }

        config.encryption(EncryptionLevel::Required);

        match (username, password) {
            (Some(user), Some(pass)) => {
                config.authentication(AuthMethod::sql_server(user, pass));
            }
            (Some(user), None) => {
                config.authentication(AuthMethod::sql_server(user, ""));
            }
            (None, _) => {
                return Err(MssqlConnectionError::AuthenticationFailed(
                    "SQL Server authentication requires a username".to_string(),
                ));
            }
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("successfully connected to MS SQL Server");
        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.is_closed() {
            return Err(MssqlConnectionError::ConnectionClosed.into());
        }
        Ok(())
    }
}

/// Container for tiberius parameter values
#[derive(Debug)]
enum TiberiusParam {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl tiberius::ToSql for TiberiusParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            TiberiusParam::Null => ColumnData::I32(None),
            TiberiusParam::Bool(v) => ColumnData::Bit(Some(*v)),
            TiberiusParam::I64(v) => ColumnData::I64(Some(*v)),
            TiberiusParam::F64(v) => ColumnData::F64(Some(*v)),
            TiberiusParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
            TiberiusParam::Bytes(v) => {
                ColumnData::Binary(Some(std::borrow::Cow::Borrowed(v.as_slice())))
            }
        }
    }
}

/// Convert tabsink values to tiberius parameters
fn values_to_tiberius_params(values: &[Value]) -> Vec<TiberiusParam> {
    values
        .iter()
        .map(|v| match v {
            Value::Null => TiberiusParam::Null,
            Value::Bool(b) => TiberiusParam::Bool(*b),
            Value::Int64(i) => TiberiusParam::I64(*i),
            Value::Float64(f) => TiberiusParam::F64(*f),
            Value::String(s) => TiberiusParam::String(s.clone()),
            Value::Bytes(b) => TiberiusParam::Bytes(b.clone()),
            Value::Date(d) => TiberiusParam::String(d.to_string()),
            Value::DateTime(dt) => TiberiusParam::String(dt.to_string()),
        })
        .collect()
}

/// Convert tiberius ColumnData to a tabsink value
fn column_data_to_value(col_data: ColumnData<'static>) -> Value {
    match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::U8(v) => v.map(|n| Value::Int64(n as i64)).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(|n| Value::Int64(n as i64)).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(|n| Value::Int64(n as i64)).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::Int64).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|n| Value::Float64(n as f64)).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::Float64).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|s| Value::String(s.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .map(|b| Value::Bytes(b.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .map(|n| Value::String(n.to_string()))
            .unwrap_or(Value::Null),
        // Temporal and exotic types are not produced by the catalog
        // queries this crate issues
        _ => Value::Null,
    }
}

fn tiberius_row_to_values(row: TiberiusRow) -> Vec<Value> {
    row.into_iter().map(column_data_to_value).collect()
}

#[async_trait]
impl Connection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        Some("mssql")
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_not_closed()?;
        let mut client = self.client.lock().await;

        let tiberius_params = values_to_tiberius_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> = tiberius_params
            .iter()
            .map(|p| p as &dyn tiberius::ToSql)
            .collect();

        let result = client
            .execute(sql, &param_refs[..])
            .await
            .map_err(|e| TabsinkError::Query(e.to_string()))?;

        let affected_rows: u64 = result.rows_affected().iter().sum();
        tracing::debug!(affected_rows = affected_rows, "statement executed");
        Ok(StatementResult::new(affected_rows))
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_not_closed()?;
        let mut client = self.client.lock().await;

        let tiberius_params = values_to_tiberius_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> = tiberius_params
            .iter()
            .map(|p| p as &dyn tiberius::ToSql)
            .collect();

        let stream = client
            .query(sql, &param_refs[..])
            .await
            .map_err(|e| TabsinkError::Query(e.to_string()))?;

        let tib_rows = stream
            .into_first_result()
            .await
            .map_err(|e| TabsinkError::Query(e.to_string()))?;

        let column_names: Vec<String> = tib_rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut rows = Vec::new();
        for tib_row in tib_rows {
            let values = tiberius_row_to_values(tib_row);
            rows.push(Row::new(column_names.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query completed");
        Ok(QueryResult::new(column_names, rows))
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT 1 FROM INFORMATION_SCHEMA.TABLES
                 WHERE TABLE_SCHEMA = SCHEMA_NAME() AND TABLE_NAME = @P1",
                &[Value::String(table.to_string())],
            )
            .await?;
        Ok(result.has_rows())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("MS SQL Server connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

#[async_trait]
impl SchemaIntrospection for MssqlConnection {
    #[tracing::instrument(skip(self))]
    async fn list_databases(&self) -> Result<Vec<String>> {
        let result = self
            .query("SELECT name FROM sys.databases ORDER BY name", &[])
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let schema = schema.unwrap_or("dbo");
        let result = self
            .query(
                "SELECT t.name FROM sys.tables t
                 INNER JOIN sys.schemas s ON t.schema_id = s.schema_id
                 WHERE s.name = @P1
                 ORDER BY t.name",
                &[Value::String(schema.to_string())],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        let schema = schema.unwrap_or("dbo");
        let result = self
            .query(
                "SELECT
                    c.name AS column_name,
                    c.column_id AS ordinal,
                    TYPE_NAME(c.user_type_id) AS data_type,
                    c.is_nullable,
                    c.max_length,
                    c.is_identity,
                    CASE WHEN pk.column_id IS NOT NULL THEN 1 ELSE 0 END AS is_primary_key
                 FROM sys.columns c
                 INNER JOIN sys.tables t ON c.object_id = t.object_id
                 INNER JOIN sys.schemas s ON t.schema_id = s.schema_id
                 LEFT JOIN (
                     SELECT ic.object_id, ic.column_id
                     FROM sys.index_columns ic
                     INNER JOIN sys.indexes i
                        ON ic.object_id = i.object_id AND ic.index_id = i.index_id
                     WHERE i.is_primary_key = 1
                 ) pk ON c.object_id = pk.object_id AND c.column_id = pk.column_id
                 WHERE s.name = @P1 AND t.name = @P2
                 ORDER BY c.column_id",
                &[
                    Value::String(schema.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?;

        let columns = result
            .rows
            .iter()
            .map(|row| {
                let name = row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let ordinal = row.get(1).and_then(|v| v.as_i64()).unwrap_or(0) as usize;
                let data_type = row
                    .get(2)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let nullable = row.get(3).and_then(|v| v.as_bool()).unwrap_or(true);
                let max_length = row.get(4).and_then(|v| v.as_i64());
                let is_identity = row.get(5).and_then(|v| v.as_bool()).unwrap_or(false);
                let is_primary_key = row.get(6).and_then(|v| v.as_i64()).unwrap_or(0) == 1;

                ColumnInfo {
                    name,
                    ordinal,
                    data_type,
                    nullable,
                    is_primary_key,
                    is_auto_increment: is_identity,
                    max_length,
                }
            })
            .collect();

        Ok(columns)
    }

    #[tracing::instrument(skip(self))]
    async fn get_primary_key(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>> {
        let schema = schema.unwrap_or("dbo");
        let result = self
            .query(
                "SELECT col.name, i.name
                 FROM sys.indexes i
                 INNER JOIN sys.index_columns ic
                    ON i.object_id = ic.object_id AND i.index_id = ic.index_id
                 INNER JOIN sys.columns col
                    ON ic.object_id = col.object_id AND ic.column_id = col.column_id
                 INNER JOIN sys.tables t ON i.object_id = t.object_id
                 INNER JOIN sys.schemas s ON t.schema_id = s.schema_id
                 WHERE i.is_primary_key = 1 AND s.name = @P1 AND t.name = @P2
                 ORDER BY ic.key_ordinal",
                &[
                    Value::String(schema.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?;

        if result.rows.is_empty() {
            return Ok(None);
        }

        let columns: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect();
        let name = result
            .rows
            .first()
            .and_then(|row| row.get(1))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(Some(PrimaryKeyInfo { name, columns }))
    }
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
