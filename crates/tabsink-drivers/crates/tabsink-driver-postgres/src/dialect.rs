//! PostgreSQL dialect

use tabsink_core::{ColumnKind, SqlDialect, Value};

/// SQL rendering for PostgreSQL
#[derive(Debug, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new dialect instance
    pub fn new() -> Self {
        Self
    }
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) => v.to_string(),
            Value::String(v) => format!("'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => {
                let hex: String = v.iter().map(|b| format!("{:02x}", b)).collect();
                format!("E'\\\\x{}'", hex)
            }
            Value::Date(v) => format!("'{}'", v),
            Value::DateTime(v) => format!("'{}'", v),
        }
    }

    fn column_type(&self, kind: &ColumnKind) -> String {
        match kind {
            ColumnKind::Integer => "BIGINT".to_string(),
            ColumnKind::Float => "DOUBLE PRECISION".to_string(),
            ColumnKind::Text(len) => format!("VARCHAR({})", len),
        }
    }

    fn key_column_sql(&self, name: &str) -> String {
        format!("{} BIGSERIAL NOT NULL", self.quote_identifier(name))
    }
}
