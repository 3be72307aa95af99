//! Tests for column type inference

use super::infer::{infer_column, DEFAULT_MAX_TEXT_LENGTH};
use tabsink_core::{ColumnKind, Value};

mod type_promotion_tests {
    use super::*;

    #[test]
    fn test_all_integers_infer_integer() {
        let values = vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)];
        let (kind, nullable) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Integer);
        assert!(!nullable);
    }

    #[test]
    fn test_one_float_promotes_to_float() {
        let values = vec![Value::Int64(1), Value::Float64(2.5), Value::Int64(3)];
        let (kind, _) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Float);
    }

    #[test]
    fn test_one_non_numeric_promotes_to_text() {
        let values = vec![Value::Int64(1), Value::Float64(2.5), Value::String("x".into())];
        let (kind, _) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Text(DEFAULT_MAX_TEXT_LENGTH));
    }

    #[test]
    fn test_text_length_is_caller_specified() {
        let values = vec![Value::String("hello".into())];
        let (kind, _) = infer_column(&values, 32);
        assert_eq!(kind, ColumnKind::Text(32));
    }

    #[test]
    fn test_bool_is_not_numeric() {
        let values = vec![Value::Bool(true), Value::Int64(1)];
        let (kind, _) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Text(DEFAULT_MAX_TEXT_LENGTH));
    }

    #[test]
    fn test_integral_float_stays_float() {
        // A float-typed value is numeric even when its fraction is zero
        let values = vec![Value::Float64(2.0)];
        let (kind, _) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Float);
    }
}

mod nullability_tests {
    use super::*;

    #[test]
    fn test_null_makes_column_nullable() {
        let values = vec![Value::Int64(1), Value::Null];
        let (kind, nullable) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Integer);
        assert!(nullable);
    }

    #[test]
    fn test_no_nulls_means_non_nullable() {
        let values = vec![Value::String("a".into()), Value::String("b".into())];
        let (_, nullable) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert!(!nullable);
    }

    #[test]
    fn test_all_null_column_is_nullable_integer() {
        let values = vec![Value::Null, Value::Null];
        let (kind, nullable) = infer_column(&values, DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Integer);
        assert!(nullable);
    }

    #[test]
    fn test_empty_column_is_non_nullable_integer() {
        let (kind, nullable) = infer_column(&[], DEFAULT_MAX_TEXT_LENGTH);
        assert_eq!(kind, ColumnKind::Integer);
        assert!(!nullable);
    }
}
