//! Tests for MssqlDialect

use super::dialect::MssqlDialect;
use tabsink_core::{ColumnDef, ColumnKind, Dataset, SqlDialect, TableDefinition, Value};

mod quote_identifier_tests {
    use super::*;

    #[test]
    fn test_quote_simple_identifier() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.quote_identifier("users"), "[users]");
    }

    #[test]
    fn test_quote_identifier_with_closing_bracket() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.quote_identifier("data]value"), "[data]]value]");
    }

    #[test]
    fn test_quote_identifier_reserved_keyword() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.quote_identifier("select"), "[select]");
    }
}

mod literal_tests {
    use super::*;

    #[test]
    fn test_bool_renders_as_bit() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.literal(&Value::Bool(true)), "1");
        assert_eq!(dialect.literal(&Value::Bool(false)), "0");
    }

    #[test]
    fn test_string_literal_is_unicode() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.literal(&Value::String("it's".into())), "N'it''s'");
    }
}

mod statement_tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let dialect = MssqlDialect::new();
        let table = TableDefinition::new(
            "people",
            vec![
                ColumnDef::key("id"),
                ColumnDef::new("name", ColumnKind::Text(100), false),
                ColumnDef::new("y", ColumnKind::Float, true),
            ],
        );
        assert_eq!(
            dialect.create_table_sql(&table),
            "CREATE TABLE [people] ([id] BIGINT IDENTITY(1,1) NOT NULL, \
             [name] NVARCHAR(100) NOT NULL, [y] FLOAT NULL, PRIMARY KEY ([id]))"
        );
    }

    #[test]
    fn test_insert_sql() {
        let dialect = MssqlDialect::new();
        let data = Dataset::from_columns(vec![(
            "name",
            vec![Value::String("A".into()), Value::Null],
        )])
        .unwrap();
        assert_eq!(
            dialect.insert_sql("t", &data),
            "INSERT INTO [t] ([name]) VALUES (N'A'), (NULL)"
        );
    }
}
