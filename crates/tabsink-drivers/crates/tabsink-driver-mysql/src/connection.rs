//! MySQL connection implementation

use async_trait::async_trait;
use mysql_async::{
    consts::ColumnType, prelude::*, Conn, Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts,
    Row as MySqlRow,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tabsink_core::{
    ColumnInfo, Connection, PrimaryKeyInfo, QueryResult, Result, Row, SchemaIntrospection,
    SqlDialect, StatementResult, TabsinkError, Value,
};

use crate::MySqlDialect;

/// MySQL connection wrapper.
///
/// The pool is pinned to a single connection; it exists for mysql_async's
/// connection management, not for concurrency.
pub struct MySqlConnection {
    pool: Pool,
    /// Stored at connect time so introspection can resolve `schema: None`
    /// to a concrete database name instead of relying on `DATABASE()`.
    database_name: Option<String>,
    closed: AtomicBool,
}

impl MySqlConnection {
    /// Connect to a MySQL database
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        tracing::info!(host = %host, port = %port, database = ?database, "connecting to MySQL database");

        let mut opts_builder = OptsBuilder::from_opts(Opts::default())
            .ip_or_hostname(host)
            .tcp_port(port);

        if let Some(db) = database {
            opts_builder = opts_builder.db_name(Some(db));
        }
        if let Some(u) = user {
            opts_builder = opts_builder.user(Some(u));
        }
        if let Some(p) = password {
            opts_builder = opts_builder.pass(Some(p));
        }

        let constraints = PoolConstraints::new(1, 1).ok_or_else(|| {
            TabsinkError::Connection("Failed to configure MySQL pool constraints".into())
        })?;
        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_reset_connection(false);
        opts_builder = opts_builder.pool_opts(pool_opts);

        let pool = Pool::new(Opts::from(opts_builder));

        // Verify connectivity by acquiring and releasing a connection
        let _conn = pool
            .get_conn()
            .await
            .map_err(|e| TabsinkError::Connection(format!("Failed to connect to MySQL: {}", e)))?;

        tracing::info!(host = %host, port = %port, database = ?database, "MySQL connection established");
        Ok(Self {
            pool,
            database_name: database.map(|db| db.to_string()),
            closed: AtomicBool::new(false),
        })
    }

    async fn get_conn(&self) -> Result<Conn> {
        self.ensure_not_closed()?;
        self.pool
            .get_conn()
            .await
            .map_err(|e| TabsinkError::Connection(format!("Failed to get MySQL connection: {}", e)))
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.is_closed() {
            return Err(TabsinkError::Connection("MySQL connection is closed".into()));
        }
        Ok(())
    }

    /// The connected database, used to resolve `schema: None` in
    /// introspection queries
    pub fn default_database(&self) -> Option<&str> {
        self.database_name.as_deref()
    }

    /// Inline parameter values as escaped literals.
    ///
    /// The text protocol is used throughout, matching statement rendering
    /// elsewhere in the crate.
    fn bind_params(sql: &str, params: &[Value]) -> String {
        if params.is_empty() {
            return sql.to_string();
        }
        let dialect = MySqlDialect::new();
        let mut bound = sql.to_string();
        for param in params {
            bound = bound.replacen('?', &dialect.literal(param), 1);
        }
        bound
    }
}

/// Convert a mysql_async value to a tabsink value, using column type
/// metadata to interpret byte strings from the text protocol.
fn mysql_value_to_value(val: mysql_async::Value, col_type: ColumnType) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => {
            if let Ok(s) = String::from_utf8(bytes.clone()) {
                match col_type {
                    ColumnType::MYSQL_TYPE_TINY
                    | ColumnType::MYSQL_TYPE_SHORT
                    | ColumnType::MYSQL_TYPE_LONG
                    | ColumnType::MYSQL_TYPE_LONGLONG
                    | ColumnType::MYSQL_TYPE_INT24
                    | ColumnType::MYSQL_TYPE_YEAR => s
                        .parse::<i64>()
                        .map(Value::Int64)
                        .unwrap_or(Value::String(s)),
                    ColumnType::MYSQL_TYPE_FLOAT
                    | ColumnType::MYSQL_TYPE_DOUBLE
                    | ColumnType::MYSQL_TYPE_DECIMAL
                    | ColumnType::MYSQL_TYPE_NEWDECIMAL => s
                        .parse::<f64>()
                        .map(Value::Float64)
                        .unwrap_or(Value::String(s)),
                    _ => Value::String(s),
                }
            } else {
                Value::Bytes(bytes)
            }
        }
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => {
            if u <= i64::MAX as u64 {
                Value::Int64(u as i64)
            } else {
                Value::String(u.to_string())
            }
        }
        mysql_async::Value::Float(f) => Value::Float64(f as f64),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                if let Some(date) =
                    chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                {
                    Value::Date(date)
                } else {
                    Value::String(format!("{:04}-{:02}-{:02}", year, month, day))
                }
            } else if let Some(dt) =
                chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                    .and_then(|d| d.and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro))
            {
                Value::DateTime(dt)
            } else {
                Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                ))
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = (days as u32) * 24 + (hours as u32);
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, mins, secs, micros
            ))
        }
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        Some("mysql")
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let mut conn = self.get_conn().await?;
        let bound = Self::bind_params(sql, params);

        conn.query_drop(&bound)
            .await
            .map_err(|e| TabsinkError::Query(format!("Failed to execute statement: {}", e)))?;
        let affected_rows = conn.affected_rows();

        tracing::debug!(affected_rows = affected_rows, "statement executed");
        Ok(StatementResult::new(affected_rows))
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut conn = self.get_conn().await?;
        let bound = Self::bind_params(sql, params);

        let mysql_rows: Vec<MySqlRow> = conn
            .query(&bound)
            .await
            .map_err(|e| TabsinkError::Query(format!("Failed to execute query: {}", e)))?;

        let mut column_names = Vec::new();
        let mut column_types = Vec::new();
        if let Some(first_row) = mysql_rows.first() {
            for col in first_row.columns_ref() {
                column_names.push(col.name_str().to_string());
                column_types.push(col.column_type());
            }
        }

        let mut rows = Vec::new();
        for mysql_row in mysql_rows {
            let values: Vec<Value> = (0..column_names.len())
                .map(|idx| {
                    let mysql_val: mysql_async::Value =
                        mysql_row.as_ref(idx).cloned().unwrap_or(mysql_async::Value::NULL);
                    let col_type = column_types
                        .get(idx)
                        .copied()
                        .unwrap_or(ColumnType::MYSQL_TYPE_STRING);
                    mysql_value_to_value(mysql_val, col_type)
                })
                .collect();
            rows.push(Row::new(column_names.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query executed");
        Ok(QueryResult::new(column_names, rows))
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        let result = self
            .query(
                "SELECT 1 FROM information_schema.TABLES
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
                &[Value::String(table.to_string())],
            )
            .await?;
        Ok(result.has_rows())
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("closing MySQL connection pool");
        self.closed.store(true, Ordering::SeqCst);
        self.pool
            .clone()
            .disconnect()
            .await
            .map_err(|e| TabsinkError::Connection(format!("Failed to close MySQL connection: {}", e)))?;
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
impl SchemaIntrospection for MySqlConnection {
    #[tracing::instrument(skip(self))]
    async fn list_databases(&self) -> Result<Vec<String>> {
        let result = self.query("SHOW DATABASES", &[]).await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let schema = schema.or(self.default_database());
        let result = if let Some(db) = schema {
            self.query(
                "SELECT TABLE_NAME FROM information_schema.TABLES
                 WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
                 ORDER BY TABLE_NAME",
                &[Value::String(db.to_string())],
            )
            .await?
        } else {
            self.query(
                "SELECT TABLE_NAME FROM information_schema.TABLES
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
                 ORDER BY TABLE_NAME",
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
        let schema = schema.or(self.default_database());
        let result = if let Some(db) = schema {
            self.query(
                "SELECT
                    COLUMN_NAME,
                    ORDINAL_POSITION,
                    DATA_TYPE,
                    IS_NULLABLE,
                    CHARACTER_MAXIMUM_LENGTH,
                    COLUMN_KEY,
                    EXTRA
                 FROM information_schema.COLUMNS
                 WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
                 ORDER BY ORDINAL_POSITION",
                &[
                    Value::String(db.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?
        } else {
            self.query(
                "SELECT
                    COLUMN_NAME,
                    ORDINAL_POSITION,
                    DATA_TYPE,
                    IS_NULLABLE,
                    CHARACTER_MAXIMUM_LENGTH,
                    COLUMN_KEY,
                    EXTRA
                 FROM information_schema.COLUMNS
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
                 ORDER BY ORDINAL_POSITION",
                &[Value::String(table.to_string())],
            )
            .await?
        };

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
                let column_key = row.get(5).and_then(|v| v.as_str()).unwrap_or("");
                let extra = row.get(6).and_then(|v| v.as_str()).unwrap_or("");

                ColumnInfo {
                    name,
                    ordinal,
                    data_type,
                    nullable,
                    is_primary_key: column_key == "PRI",
                    is_auto_increment: extra.contains("auto_increment"),
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
        let schema = schema.or(self.default_database());
        let result = if let Some(db) = schema {
            self.query(
                "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE
                 WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
                 ORDER BY ORDINAL_POSITION",
                &[
                    Value::String(db.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?
        } else {
            self.query(
                "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
                 ORDER BY ORDINAL_POSITION",
                &[Value::String(table.to_string())],
            )
            .await?
        };

        if result.rows.is_empty() {
            return Ok(None);
        }

        let columns: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .collect();

        Ok(Some(PrimaryKeyInfo {
            name: Some("PRIMARY".to_string()),
            columns,
        }))
    }
}
