//! Tests for MySqlDialect

use super::dialect::MySqlDialect;
use tabsink_core::{ColumnDef, ColumnKind, Dataset, SqlDialect, TableDefinition, Value};

mod quote_identifier_tests {
    use super::*;

    #[test]
    fn test_quote_simple_identifier() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.quote_identifier("users"), "`users`");
    }

    #[test]
    fn test_quote_identifier_with_backtick() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.quote_identifier("a`b"), "`a``b`");
    }
}

mod literal_tests {
    use super::*;

    #[test]
    fn test_string_literal_escapes_backslash_and_quote() {
        let dialect = MySqlDialect::new();
        assert_eq!(
            dialect.literal(&Value::String("a\\b'c".into())),
            "'a\\\\b''c'"
        );
    }

    #[test]
    fn test_null_and_numeric_literals() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.literal(&Value::Null), "NULL");
        assert_eq!(dialect.literal(&Value::Int64(-7)), "-7");
        assert_eq!(dialect.literal(&Value::Float64(0.25)), "0.25");
    }
}

mod statement_tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let dialect = MySqlDialect::new();
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
            "CREATE TABLE `people` (`id` BIGINT NOT NULL AUTO_INCREMENT, \
             `name` VARCHAR(100) NOT NULL, `y` DOUBLE NULL, PRIMARY KEY (`id`))"
        );
    }

    #[test]
    fn test_insert_sql_multi_row() {
        let dialect = MySqlDialect::new();
        let data = Dataset::from_columns(vec![
            ("a", vec![Value::Int64(1), Value::Int64(2)]),
            ("b", vec![Value::Null, Value::String("x".into())]),
        ])
        .unwrap();
        assert_eq!(
            dialect.insert_sql("t", &data),
            "INSERT INTO `t` (`a`, `b`) VALUES (1, NULL), (2, 'x')"
        );
    }
}
