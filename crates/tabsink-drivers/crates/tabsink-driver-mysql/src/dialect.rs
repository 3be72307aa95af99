//! MySQL dialect

use tabsink_core::{ColumnKind, SqlDialect, Value};

/// SQL rendering for MySQL/MariaDB
#[derive(Debug, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Create a new dialect instance
    pub fn new() -> Self {
        Self
    }
}

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) => v.to_string(),
            Value::String(v) => {
                format!("'{}'", v.replace('\\', "\\\\").replace('\'', "''"))
            }
            Value::Bytes(v) => {
                let hex: String = v.iter().map(|b| format!("{:02x}", b)).collect();
                format!("X'{}'", hex)
            }
            Value::Date(v) => format!("'{}'", v),
            Value::DateTime(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }

    fn column_type(&self, kind: &ColumnKind) -> String {
        match kind {
            ColumnKind::Integer => "BIGINT".to_string(),
            ColumnKind::Float => "DOUBLE".to_string(),
            ColumnKind::Text(len) => format!("VARCHAR({})", len),
        }
    }

    fn key_column_sql(&self, name: &str) -> String {
        format!(
            "{} BIGINT NOT NULL AUTO_INCREMENT",
            self.quote_identifier(name)
        )
    }
}
