//! SQL dialect trait: identifier quoting, literal rendering, DDL and DML
//! composition

use crate::{ColumnDef, ColumnKind, Dataset, TableDefinition, Value};

/// Dialect-specific SQL rendering.
///
/// Drivers implement the four primitives; the provided methods compose
/// whole statements from them so statement shape stays identical across
/// dialects.
pub trait SqlDialect: Send + Sync {
    /// Dialect identifier (e.g. "postgres", "mysql", "mssql")
    fn name(&self) -> &'static str;

    /// Quote an identifier for use in a statement
    fn quote_identifier(&self, ident: &str) -> String;

    /// Render a value as an escaped SQL literal
    fn literal(&self, value: &Value) -> String;

    /// Render a semantic column type as a concrete DDL type
    fn column_type(&self, kind: &ColumnKind) -> String;

    /// Column clause for the auto-generated key column (identity/serial)
    fn key_column_sql(&self, name: &str) -> String;

    /// Column clause for one column definition
    fn column_sql(&self, column: &ColumnDef) -> String {
        if column.primary_key {
            return self.key_column_sql(&column.name);
        }
        let null_clause = if column.nullable { "NULL" } else { "NOT NULL" };
        format!(
            "{} {} {}",
            self.quote_identifier(&column.name),
            self.column_type(&column.kind),
            null_clause
        )
    }

    /// CREATE TABLE statement for a table definition
    fn create_table_sql(&self, table: &TableDefinition) -> String {
        let mut clauses: Vec<String> = table.columns.iter().map(|c| self.column_sql(c)).collect();
        let key_columns: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| self.quote_identifier(&c.name))
            .collect();
        if !key_columns.is_empty() {
            clauses.push(format!("PRIMARY KEY ({})", key_columns.join(", ")));
        }
        format!(
            "CREATE TABLE {} ({})",
            self.quote_identifier(&table.name),
            clauses.join(", ")
        )
    }

    /// DROP TABLE statement
    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(table))
    }

    /// Single multi-row INSERT statement covering the whole dataset.
    ///
    /// Callers must not pass an empty dataset; they are expected to
    /// short-circuit zero rows/columns before rendering.
    fn insert_sql(&self, table: &str, data: &Dataset) -> String {
        let columns: Vec<String> = data
            .columns()
            .iter()
            .map(|c| self.quote_identifier(c.name()))
            .collect();
        let tuples: Vec<String> = data
            .rows()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| self.literal(v)).collect();
                format!("({})", values.join(", "))
            })
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.quote_identifier(table),
            columns.join(", "),
            tuples.join(", ")
        )
    }
}
