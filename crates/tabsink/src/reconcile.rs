//! Null/key reconciliation against the live schema

use tabsink_core::{ColumnInfo, Dataset, Result, TabsinkError, Value};

/// Filter and validate a dataset against the database's post-creation
/// schema.
///
/// The live schema is the authority, not the locally synthesized
/// definition: a pre-existing table (`drop_first = false`) or a
/// constraint the database coerced both show up only here. Whatever the
/// live schema marks as key is excluded, even when that differs from the
/// definition this call created.
///
/// Output columns follow live-schema order. Exactly two cases remove a
/// live column from the output:
/// - primary-key columns (server assigned, never taken from user data);
/// - non-nullable columns that would receive a null, which abort the
///   whole write with [`TabsinkError::NullConstraint`] before any insert.
///
/// Live nullable columns absent from the dataset materialize as all-null
/// columns. Dataset columns unknown to the live schema cannot be inserted
/// and are dropped with a warning.
///
/// Idempotent: reconciling the output against the same live schema
/// returns an identical dataset.
pub fn reconcile(data: &Dataset, live: &[ColumnInfo]) -> Result<Dataset> {
    let mut reconciled = Dataset::new();
    let rows = data.row_count();

    for column in live {
        if column.is_primary_key {
            tracing::debug!(column = %column.name, "primary key column excluded from insert data");
            continue;
        }

        match data.column(&column.name) {
            Some(existing) => {
                if !column.nullable && existing.has_nulls() {
                    return Err(TabsinkError::NullConstraint {
                        column: column.name.clone(),
                    });
                }
                reconciled.push_column(column.name.clone(), existing.values().to_vec())?;
            }
            None => {
                // Absent column: every row is effectively null
                if !column.nullable {
                    return Err(TabsinkError::NullConstraint {
                        column: column.name.clone(),
                    });
                }
                reconciled.push_column(column.name.clone(), vec![Value::Null; rows])?;
            }
        }
    }

    for column in data.columns() {
        if !live.iter().any(|l| l.name == column.name()) {
            tracing::warn!(
                column = %column.name(),
                "column not present in live schema; dropped from insert"
            );
        }
    }

    Ok(reconciled)
}
