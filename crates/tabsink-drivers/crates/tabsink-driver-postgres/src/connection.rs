//! PostgreSQL connection implementation

use async_trait::async_trait;
use bytes::BytesMut;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_postgres::{
    types::{FromSql, ToSql},
    Client, NoTls, Row as PgRow,
};
use tabsink_core::{
    ColumnInfo, Connection, PrimaryKeyInfo, QueryResult, Result, Row, SchemaIntrospection,
    StatementResult, TabsinkError, Value,
};

fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let code = db_error.code();
    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail() {
        if !detail.trim().is_empty() {
            message.push_str(&format!(" (detail: {})", detail));
        }
    }

    if let Some(column) = db_error.column() {
        if !column.trim().is_empty() {
            message.push_str(&format!(" (column: {})", column));
        }
    }

    match code.code() {
        "23502" => format!("null value violates not-null constraint: {}", message),
        "23505" => format!("duplicate value violates unique constraint: {}", message),
        "22001" => format!("value too long for column type: {}", message),
        "22P02" => format!("invalid input syntax: {}", message),
        _ => format!("{} (code: {:?})", message, code),
    }
}

/// PostgreSQL connection wrapper
pub struct PostgresConnection {
    client: Mutex<Client>,
    closed: AtomicBool,
}

impl PostgresConnection {
    /// Connect to a PostgreSQL database
    pub async fn connect(
        host: &str,
        port: u16,
        database: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        tracing::info!(host = %host, port = %port, database = %database, "connecting to PostgreSQL database");

        let mut config = tokio_postgres::Config::new();
        config.host(host).port(port).dbname(database);

        if let Some(u) = user {
            config.user(u);
        }
        if let Some(p) = password {
            config.password(p);
        }

        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            TabsinkError::Connection(format!("Failed to connect to PostgreSQL: {}", e))
        })?;

        // The connection object drives the socket; it runs until the client
        // is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        tracing::info!(host = %host, port = %port, database = %database, "PostgreSQL connection established");
        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.is_closed() {
            return Err(TabsinkError::Connection(
                "PostgreSQL connection is closed".into(),
            ));
        }
        Ok(())
    }
}

/// Wrapper enum for converting tabsink values to types implementing ToSql
#[derive(Debug)]
enum PgValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(chrono::NaiveDate),
    DateTime(chrono::NaiveDateTime),
}

impl PgValue {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => PgValue::Null,
            Value::Bool(v) => PgValue::Bool(*v),
            Value::Int64(v) => PgValue::Int64(*v),
            Value::Float64(v) => PgValue::Float64(*v),
            Value::String(v) => PgValue::String(v.clone()),
            Value::Bytes(v) => PgValue::Bytes(v.clone()),
            Value::Date(v) => PgValue::Date(*v),
            Value::DateTime(v) => PgValue::DateTime(*v),
        }
    }
}

impl ToSql for PgValue {
    fn to_sql(
        &self,
        ty: &tokio_postgres::types::Type,
        out: &mut BytesMut,
    ) -> std::result::Result<postgres_types::IsNull, Box<dyn std::error::Error + Sync + Send>>
    {
        match self {
            PgValue::Null => Ok(postgres_types::IsNull::Yes),
            PgValue::Bool(v) => v.to_sql(ty, out),
            PgValue::Int64(v) => v.to_sql(ty, out),
            PgValue::Float64(v) => v.to_sql(ty, out),
            PgValue::String(v) => v.to_sql(ty, out),
            PgValue::Bytes(v) => v.to_sql(ty, out),
            PgValue::Date(v) => v.to_sql(ty, out),
            PgValue::DateTime(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_: &tokio_postgres::types::Type) -> bool {
        true
    }

    postgres_types::to_sql_checked!();
}

/// Text fallback for types without a dedicated mapping
#[derive(Debug)]
struct PgFallbackString(String);

impl<'a> FromSql<'a> for PgFallbackString {
    fn from_sql(
        _: &tokio_postgres::types::Type,
        raw: &'a [u8],
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let text = String::from_utf8(raw.to_vec())?;
        Ok(Self(text))
    }

    fn accepts(_: &tokio_postgres::types::Type) -> bool {
        true
    }
}

fn postgres_to_value(row: &PgRow, idx: usize) -> Value {
    let col = &row.columns()[idx];
    let type_name = col.type_().name();

    match type_name {
        "bool" => row
            .try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "int2" | "smallint" => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Int64(v as i64))
            .unwrap_or(Value::Null),
        "int4" | "int" | "integer" => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Int64(v as i64))
            .unwrap_or(Value::Null),
        "int8" | "bigint" => row
            .try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(Value::Int64)
            .unwrap_or(Value::Null),
        "float4" | "real" => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Float64(v as f64))
            .unwrap_or(Value::Null),
        "float8" | "double precision" => row
            .try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .map(Value::Float64)
            .unwrap_or(Value::Null),
        "text" | "varchar" | "char" | "bpchar" | "name" => row
            .try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        "date" => row
            .try_get::<_, Option<chrono::NaiveDate>>(idx)
            .ok()
            .flatten()
            .map(Value::Date)
            .unwrap_or(Value::Null),
        "timestamp" => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<_, Option<PgFallbackString>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.0))
            .unwrap_or(Value::Null),
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgres"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        Some("postgres")
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_not_closed()?;
        let client = self.client.lock().await;

        let statement = client.prepare(sql).await.map_err(|e| {
            TabsinkError::Query(format!(
                "Failed to prepare statement: {}",
                format_postgres_error(&e)
            ))
        })?;

        let pg_params: Vec<PgValue> = params.iter().map(PgValue::from_value).collect();
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            pg_params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let affected_rows = client.execute(&statement, &param_refs).await.map_err(|e| {
            TabsinkError::Query(format!(
                "Failed to execute statement: {}",
                format_postgres_error(&e)
            ))
        })?;

        tracing::debug!(affected_rows = affected_rows, "statement executed");
        Ok(StatementResult::new(affected_rows))
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_not_closed()?;
        let client = self.client.lock().await;

        let statement = client.prepare(sql).await.map_err(|e| {
            TabsinkError::Query(format!(
                "Failed to prepare query: {}",
                format_postgres_error(&e)
            ))
        })?;

        let pg_params: Vec<PgValue> = params.iter().map(PgValue::from_value).collect();
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            pg_params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let pg_rows = client.query(&statement, &param_refs).await.map_err(|e| {
            TabsinkError::Query(format!(
                "Failed to execute query: {}",
                format_postgres_error(&e)
            ))
        })?;

        // Column names come from the prepared statement so empty result
        // sets still carry them.
        let column_names: Vec<String> = statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();

        let mut rows = Vec::new();
        for pg_row in &pg_rows {
            let values: Vec<Value> = (0..column_names.len())
                .map(|idx| postgres_to_value(pg_row, idx))
                .collect();
            rows.push(Row::new(column_names.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query executed");
        Ok(QueryResult::new(column_names, rows))
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT 1 FROM information_schema.tables
                 WHERE table_schema = current_schema() AND table_name = $1",
                &[Value::String(table.to_string())],
            )
            .await?;
        Ok(result.has_rows())
    }

    async fn close(&self) -> Result<()> {
        // tokio-postgres tears the socket down when the client drops; the
        // flag stops any further use of this handle.
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!("PostgreSQL connection closed");
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
impl SchemaIntrospection for PostgresConnection {
    #[tracing::instrument(skip(self))]
    async fn list_databases(&self) -> Result<Vec<String>> {
        let result = self
            .query(
                "SELECT datname FROM pg_database WHERE datistemplate = false ORDER BY datname",
                &[],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let result = if let Some(schema) = schema {
            self.query(
                "SELECT tablename FROM pg_catalog.pg_tables WHERE schemaname = $1 ORDER BY tablename",
                &[Value::String(schema.to_string())],
            )
            .await?
        } else {
            self.query(
                "SELECT tablename FROM pg_catalog.pg_tables WHERE schemaname = current_schema() ORDER BY tablename",
                &[],
            )
            .await?
        };

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        let schema = schema.unwrap_or("public");
        let result = self
            .query(
                "SELECT
                    column_name,
                    ordinal_position,
                    data_type,
                    is_nullable,
                    character_maximum_length,
                    is_identity
                 FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
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
                let nullable = row.get(3).and_then(|v| v.as_str()).unwrap_or("NO") == "YES";
                let max_length = row.get(4).and_then(|v| v.as_i64());
                let is_identity = row.get(5).and_then(|v| v.as_str()).unwrap_or("NO") == "YES";

                ColumnInfo {
                    name,
                    ordinal,
                    data_type,
                    nullable,
                    // Filled in by get_primary_key
                    is_primary_key: false,
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
        let schema = schema.unwrap_or("public");
        let result = self
            .query(
                "SELECT kcu.column_name, tc.constraint_name
                 FROM information_schema.table_constraints tc
                 JOIN information_schema.key_column_usage kcu
                   ON tc.constraint_name = kcu.constraint_name
                  AND tc.table_schema = kcu.table_schema
                 WHERE tc.constraint_type = 'PRIMARY KEY'
                   AND tc.table_schema = $1 AND tc.table_name = $2
                 ORDER BY kcu.ordinal_position",
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
