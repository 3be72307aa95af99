//! Column type inference

use tabsink_core::{ColumnKind, Value};

/// Default maximum length for inferred text columns
pub const DEFAULT_MAX_TEXT_LENGTH: u32 = 100;

/// Infer the semantic type and nullability of a column from its values.
///
/// Promotion order: every non-null value integral → `Integer`; every
/// non-null value numeric → `Float`; anything else → `Text` with the
/// caller's maximum length. Values are not validated against that length;
/// oversized text surfaces as a database error at insert time.
///
/// A column is nullable exactly when it holds fewer non-null values than
/// rows. Callers normalize missing-value sentinels to [`Value::Null`]
/// before inference.
pub fn infer_column(values: &[Value], max_text_length: u32) -> (ColumnKind, bool) {
    let non_null = values.iter().filter(|v| !v.is_null()).count();
    let nullable = non_null < values.len();

    let mut kind = ColumnKind::Integer;
    for value in values {
        match value {
            Value::Null | Value::Int64(_) => {}
            Value::Float64(_) => {
                if kind == ColumnKind::Integer {
                    kind = ColumnKind::Float;
                }
            }
            _ => {
                kind = ColumnKind::Text(max_text_length);
                break;
            }
        }
    }

    (kind, nullable)
}
