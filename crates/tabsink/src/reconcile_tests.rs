//! Tests for null/key reconciliation

use super::reconcile::reconcile;
use tabsink_core::{ColumnInfo, Dataset, TabsinkError, Value};

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

fn sample_data() -> Dataset {
    Dataset::from_columns(vec![
        (
            "name",
            vec![Value::String("A".into()), Value::String("B".into())],
        ),
        ("y", vec![Value::Float64(1.5), Value::Null]),
    ])
    .unwrap()
}

#[test]
fn test_primary_key_columns_are_excluded() {
    let live = vec![
        live_column("id", false, true),
        live_column("name", false, false),
        live_column("y", true, false),
    ];
    let result = reconcile(&sample_data(), &live).unwrap();
    assert_eq!(result.column_names(), vec!["name", "y"]);
    assert_eq!(result.row_count(), 2);
}

#[test]
fn test_null_in_non_nullable_column_fails_with_column_name() {
    let live = vec![
        live_column("name", false, false),
        live_column("y", false, false),
    ];
    let err = reconcile(&sample_data(), &live).unwrap_err();
    match err {
        TabsinkError::NullConstraint { column } => assert_eq!(column, "y"),
        other => panic!("expected NullConstraint, got {:?}", other),
    }
}

#[test]
fn test_absent_non_nullable_column_fails() {
    // Every row of `z` would be null
    let live = vec![
        live_column("name", false, false),
        live_column("y", true, false),
        live_column("z", false, false),
    ];
    let err = reconcile(&sample_data(), &live).unwrap_err();
    match err {
        TabsinkError::NullConstraint { column } => assert_eq!(column, "z"),
        other => panic!("expected NullConstraint, got {:?}", other),
    }
}

#[test]
fn test_absent_primary_key_is_not_a_violation() {
    let live = vec![
        live_column("id", false, true),
        live_column("name", false, false),
        live_column("y", true, false),
    ];
    assert!(reconcile(&sample_data(), &live).is_ok());
}

#[test]
fn test_absent_nullable_column_materializes_as_nulls() {
    let live = vec![
        live_column("name", false, false),
        live_column("extra", true, false),
    ];
    let result = reconcile(&sample_data(), &live).unwrap();
    assert_eq!(result.column_names(), vec!["name", "extra"]);
    assert_eq!(
        result.column("extra").unwrap().values(),
        &[Value::Null, Value::Null]
    );
}

#[test]
fn test_dataset_columns_unknown_to_live_schema_are_dropped() {
    let live = vec![live_column("name", false, false)];
    let result = reconcile(&sample_data(), &live).unwrap();
    assert_eq!(result.column_names(), vec!["name"]);
}

#[test]
fn test_output_follows_live_schema_order() {
    let live = vec![
        live_column("y", true, false),
        live_column("name", false, false),
    ];
    let result = reconcile(&sample_data(), &live).unwrap();
    assert_eq!(result.column_names(), vec!["y", "name"]);
}

#[test]
fn test_reconcile_is_idempotent() {
    let live = vec![
        live_column("id", false, true),
        live_column("name", false, false),
        live_column("y", true, false),
    ];
    let once = reconcile(&sample_data(), &live).unwrap();
    let twice = reconcile(&once, &live).unwrap();
    assert_eq!(once.column_names(), twice.column_names());
    for (a, b) in once.columns().iter().zip(twice.columns()) {
        assert_eq!(a.values(), b.values());
    }
}

#[test]
fn test_row_order_is_preserved() {
    let live = vec![live_column("name", false, false)];
    let result = reconcile(&sample_data(), &live).unwrap();
    assert_eq!(
        result.column("name").unwrap().values(),
        &[Value::String("A".into()), Value::String("B".into())]
    );
}
