//! Schema vocabulary and introspection traits

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Semantic column type inferred from tabular data.
///
/// A closed set: every dialect knows how to render each variant as a
/// concrete DDL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// 64-bit integer
    Integer,
    /// Double-precision float
    Float,
    /// Bounded text with a maximum character length
    Text(u32),
}

/// A synthesized column: name, semantic type, constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDef {
    /// Create a data column
    pub fn new(name: impl Into<String>, kind: ColumnKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable,
            primary_key: false,
        }
    }

    /// Create the auto-generated key column: integer, non-nullable, primary
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Integer,
            nullable: false,
            primary_key: true,
        }
    }
}

/// A table to be created: name plus ordered column definitions.
///
/// Lives for one write call; the caller may keep it around to drop the
/// table later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDefinition {
    /// Create a new table definition
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary key column, if any
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// Column metadata as reported by the database after creation.
///
/// This is the authority reconciliation trusts, not the locally
/// synthesized [`TableDefinition`]; the two can disagree when the table
/// pre-existed or the database coerced a constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub ordinal: usize,
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub max_length: Option<i64>,
}

/// Primary key information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKeyInfo {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Schema introspection interface
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// List database names visible on the server
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// List table names in a schema (`None` = the connection's default)
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<String>>;

    /// Get columns for a table
    async fn get_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Get the primary key for a table
    async fn get_primary_key(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>>;
}
