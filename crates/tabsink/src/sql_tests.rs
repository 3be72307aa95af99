//! Tests for the SQL writer orchestration, driven through a mock
//! connection

use super::sql::{SqlWriter, WriteOptions};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tabsink_core::{
    ColumnInfo, ColumnKind, Connection, ConnectionConfig, Dataset, PrimaryKeyInfo, QueryResult,
    Result, SchemaIntrospection, StatementResult, TabsinkError, Value,
};
use tabsink_drivers::postgres::PostgresDialect;

fn live_column(name: &str, nullable: bool, is_primary_key: bool) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        ordinal: 0,
        data_type: "test".to_string(),
        nullable,
        is_primary_key,
        is_auto_increment: is_primary_key,
        max_length: None,
    }
}

/// In-memory stand-in for a database connection. Tracks one table's
/// lifecycle through the statements the writer executes and serves the
/// seeded live schema once the table exists.
struct MockConnection {
    table: String,
    live_columns: Vec<ColumnInfo>,
    exists: Mutex<HashSet<String>>,
    statements: Mutex<Vec<String>>,
    closed: AtomicBool,
    /// When set, INSERT statements report one row fewer than they carry
    misreport_inserts: bool,
}

impl MockConnection {
    fn new(table: &str, live_columns: Vec<ColumnInfo>, pre_existing: bool) -> Arc<Self> {
        let mut exists = HashSet::new();
        if pre_existing {
            exists.insert(table.to_string());
        }
        Arc::new(Self {
            table: table.to_string(),
            live_columns,
            exists: Mutex::new(exists),
            statements: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            misreport_inserts: false,
        })
    }

    fn misreporting(table: &str, live_columns: Vec<ColumnInfo>) -> Arc<Self> {
        let mut mock = Self::new(table, live_columns, false);
        Arc::get_mut(&mut mock).unwrap().misreport_inserts = true;
        mock
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn insert_tuple_count(sql: &str) -> u64 {
        sql.split(" VALUES ")
            .nth(1)
            .map(|values| values.split("), (").count() as u64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<StatementResult> {
        self.statements.lock().unwrap().push(sql.to_string());

        if sql.starts_with("CREATE TABLE") {
            self.exists.lock().unwrap().insert(self.table.clone());
            return Ok(StatementResult::new(0));
        }
        if sql.starts_with("DROP TABLE") {
            self.exists.lock().unwrap().remove(&self.table);
            return Ok(StatementResult::new(0));
        }
        if sql.starts_with("INSERT INTO") {
            let mut rows = Self::insert_tuple_count(sql);
            if self.misreport_inserts && rows > 0 {
                rows -= 1;
            }
            return Ok(StatementResult::new(rows));
        }
        Ok(StatementResult::new(0))
    }

    async fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        Ok(QueryResult::empty())
    }

    async fn has_table(&self, table: &str) -> Result<bool> {
        Ok(self.exists.lock().unwrap().contains(table))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
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
impl SchemaIntrospection for MockConnection {
    async fn list_databases(&self) -> Result<Vec<String>> {
        Ok(vec!["mockdb".to_string()])
    }

    async fn list_tables(&self, _schema: Option<&str>) -> Result<Vec<String>> {
        Ok(self.exists.lock().unwrap().iter().cloned().collect())
    }

    async fn get_columns(&self, _schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        if self.exists.lock().unwrap().contains(table) {
            Ok(self.live_columns.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn get_primary_key(
        &self,
        _schema: Option<&str>,
        _table: &str,
    ) -> Result<Option<PrimaryKeyInfo>> {
        let columns: Vec<String> = self
            .live_columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        if columns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PrimaryKeyInfo {
                name: Some("pk".to_string()),
                columns,
            }))
        }
    }
}

fn sample_live_schema() -> Vec<ColumnInfo> {
    vec![
        live_column("id", false, true),
        live_column("name", false, false),
        live_column("y", true, false),
    ]
}

fn sample_data() -> Dataset {
    Dataset::from_columns(vec![
        (
            "name",
            vec![Value::String("A".into()), Value::String("B".into())],
        ),
        ("y", vec![Value::Float64(1.5), Value::Float64(f64::NAN)]),
    ])
    .unwrap()
}

fn writer_over(mock: &Arc<MockConnection>) -> SqlWriter {
    SqlWriter::from_parts(mock.clone(), Arc::new(PostgresDialect::new()))
}

mod write_tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_table_round_trip() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);
        let options = WriteOptions {
            drop_first: true,
            ..Default::default()
        };

        let (result, table) = writer.write(&sample_data(), "people", &options).await.unwrap();

        assert_eq!(result.rows_written, 2);
        assert_eq!(table.name, "people");
        assert_eq!(table.columns.len(), 3);

        let id = &table.columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.kind, ColumnKind::Integer);
        assert!(id.primary_key);
        assert!(!id.nullable);

        let name = &table.columns[1];
        assert_eq!(name.kind, ColumnKind::Text(100));
        assert!(!name.nullable);

        // NaN was normalized to null before inference
        let y = &table.columns[2];
        assert_eq!(y.kind, ColumnKind::Float);
        assert!(y.nullable);
    }

    #[tokio::test]
    async fn test_statement_sequence_and_key_exclusion() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);
        let options = WriteOptions {
            drop_first: true,
            ..Default::default()
        };

        writer.write(&sample_data(), "people", &options).await.unwrap();

        let statements = mock.statements();
        assert_eq!(statements.len(), 2);
        // Dropping a table that does not exist is a no-op
        assert!(statements[0].starts_with("CREATE TABLE \"people\""));
        // The key column is excluded from user-supplied insert values
        assert!(statements[1].starts_with("INSERT INTO \"people\" (\"name\", \"y\")"));
    }

    #[tokio::test]
    async fn test_drop_first_drops_pre_existing_table() {
        let mock = MockConnection::new("people", sample_live_schema(), true);
        let writer = writer_over(&mock);
        let options = WriteOptions {
            drop_first: true,
            ..Default::default()
        };

        writer.write(&sample_data(), "people", &options).await.unwrap();

        let statements = mock.statements();
        assert!(statements[0].starts_with("DROP TABLE \"people\""));
        assert!(statements[1].starts_with("CREATE TABLE \"people\""));
    }

    #[tokio::test]
    async fn test_create_is_skipped_for_pre_existing_table() {
        let mock = MockConnection::new("people", sample_live_schema(), true);
        let writer = writer_over(&mock);

        writer
            .write(&sample_data(), "people", &WriteOptions::default())
            .await
            .unwrap();

        let statements = mock.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_null_violation_aborts_before_insert() {
        // Live schema demands a non-nullable `z` the data cannot provide
        let mut live = sample_live_schema();
        live.push(live_column("z", false, false));
        let mock = MockConnection::new("people", live, false);
        let writer = writer_over(&mock);

        let err = writer
            .write(&sample_data(), "people", &WriteOptions::default())
            .await
            .unwrap_err();

        match err {
            TabsinkError::NullConstraint { column } => assert_eq!(column, "z"),
            other => panic!("expected NullConstraint, got {:?}", other),
        }
        assert!(!mock.statements().iter().any(|s| s.starts_with("INSERT")));
    }

    #[tokio::test]
    async fn test_identifier_column_in_data_is_replaced() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);
        let data = Dataset::from_columns(vec![
            ("id", vec![Value::Int64(7), Value::Int64(8)]),
            (
                "name",
                vec![Value::String("A".into()), Value::String("B".into())],
            ),
            ("y", vec![Value::Float64(1.5), Value::Null]),
        ])
        .unwrap();

        let (_, table) = writer
            .write(&data, "people", &WriteOptions::default())
            .await
            .unwrap();

        // Key first, then the data columns; the supplied id values are gone
        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[0].primary_key);
        let insert = mock
            .statements()
            .into_iter()
            .find(|s| s.starts_with("INSERT"))
            .unwrap();
        assert!(insert.starts_with("INSERT INTO \"people\" (\"name\", \"y\")"));
    }

    #[tokio::test]
    async fn test_insert_row_count_mismatch_is_an_error() {
        let mock = MockConnection::misreporting("people", sample_live_schema());
        let writer = writer_over(&mock);

        let err = writer
            .write(&sample_data(), "people", &WriteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TabsinkError::Insert(_)));
    }

    #[tokio::test]
    async fn test_key_only_live_schema_writes_zero_rows() {
        let mock = MockConnection::new("counters", vec![live_column("id", false, true)], false);
        let writer = writer_over(&mock);
        let data = Dataset::from_columns(vec![("id", vec![Value::Int64(1)])]).unwrap();

        let (result, _) = writer
            .write(&data, "counters", &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(result.rows_written, 0);
        assert!(!mock.statements().iter().any(|s| s.starts_with("INSERT")));
    }
}

mod schema_op_tests {
    use super::*;

    #[tokio::test]
    async fn test_drop_of_missing_table_is_a_noop() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);

        writer.drop_table("people").await.unwrap();
        assert!(mock.statements().is_empty());
    }

    #[tokio::test]
    async fn test_create_twice_issues_one_statement() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);
        let (table, _) = writer
            .synthesize(&sample_data(), "people", "id", 100)
            .unwrap();

        writer.create_table(&table).await.unwrap();
        writer.create_table(&table).await.unwrap();
        assert_eq!(mock.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_orders_key_then_data_columns() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);

        let (table, stripped) = writer
            .synthesize(&sample_data(), "people", "row_key", 100)
            .unwrap();

        assert_eq!(table.columns.len(), 1 + sample_data().column_count());
        assert_eq!(table.columns[0].name, "row_key");
        assert!(table.columns[0].primary_key);
        assert_eq!(table.columns[1].name, "name");
        assert_eq!(table.columns[2].name, "y");
        assert_eq!(stripped.column_count(), 2);
    }

    #[tokio::test]
    async fn test_operations_fail_after_dispose() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);

        writer.dispose().await.unwrap();
        assert!(writer.is_closed());

        let err = writer
            .synthesize(&sample_data(), "people", "id", 100)
            .unwrap_err();
        assert!(matches!(err, TabsinkError::Schema(_)));

        let err = writer.drop_table("people").await.unwrap_err();
        assert!(matches!(err, TabsinkError::Schema(_)));
    }

    #[tokio::test]
    async fn test_live_schema_for_missing_table_is_a_schema_error() {
        let mock = MockConnection::new("people", sample_live_schema(), false);
        let writer = writer_over(&mock);

        let err = writer.live_schema("people").await.unwrap_err();
        assert!(matches!(err, TabsinkError::Schema(_)));
    }
}

mod configuration_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_dialect_fails_before_connecting() {
        let config = ConnectionConfig::new("oracle")
            .host("localhost")
            .database("db")
            .username("u")
            .password("p");
        let err = SqlWriter::connect(config).await.unwrap_err();
        assert!(matches!(err, TabsinkError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_connecting() {
        let config = ConnectionConfig::new("postgresql").host("localhost");
        let err = SqlWriter::connect(config).await.unwrap_err();
        assert!(matches!(err, TabsinkError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_non_sql_dialect_is_rejected() {
        let config = ConnectionConfig::new("mongo")
            .host("localhost")
            .database("db")
            .username("u")
            .password("p");
        let err = SqlWriter::connect(config).await.unwrap_err();
        assert!(matches!(err, TabsinkError::Configuration(_)));
    }
}
