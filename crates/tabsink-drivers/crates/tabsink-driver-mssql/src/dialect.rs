//! MS SQL Server (T-SQL) dialect

use tabsink_core::{ColumnKind, SqlDialect, Value};

/// SQL rendering for MS SQL Server
#[derive(Debug, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new dialect instance
    pub fn new() -> Self {
        Self
    }
}

impl SqlDialect for MssqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            // T-SQL has no boolean literals; BIT columns take 1/0
            Value::Bool(v) => if *v { "1" } else { "0" }.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) => v.to_string(),
            Value::String(v) => format!("N'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => {
                let hex: String = v.iter().map(|b| format!("{:02x}", b)).collect();
                format!("0x{}", hex)
            }
            Value::Date(v) => format!("'{}'", v),
            Value::DateTime(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }

    fn column_type(&self, kind: &ColumnKind) -> String {
        match kind {
            ColumnKind::Integer => "BIGINT".to_string(),
            ColumnKind::Float => "FLOAT".to_string(),
            ColumnKind::Text(len) => format!("NVARCHAR({})", len),
        }
    }

    fn key_column_sql(&self, name: &str) -> String {
        format!(
            "{} BIGINT IDENTITY(1,1) NOT NULL",
            self.quote_identifier(name)
        )
    }
}
