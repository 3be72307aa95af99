//! In-memory tabular data

use crate::{Result, TabsinkError, Value};

/// A named column of dynamically typed values
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column values, in row order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of non-null values
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    /// Whether any value is null
    pub fn has_nulls(&self) -> bool {
        self.values.iter().any(|v| v.is_null())
    }
}

/// An ordered collection of named, equally sized columns.
///
/// Invariant: every column has the same number of rows. Construction and
/// mutation enforce it; violations surface as [`TabsinkError::Schema`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from (name, values) pairs
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, values) in columns {
            dataset.push_column(name, values)?;
        }
        Ok(dataset)
    }

    /// Append a column, enforcing the shared row count
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(TabsinkError::Schema(format!(
                "column `{}` has {} rows, expected {}",
                name,
                values.len(),
                self.rows
            )));
        }
        if self.column(&name).is_some() {
            return Err(TabsinkError::Schema(format!(
                "duplicate column name `{}`",
                name
            )));
        }
        self.columns.push(Column::new(name, values));
        Ok(())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset holds no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in original order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in original order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Whether a column with this name exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Remove and return a column; row count is unchanged
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name() == name)?;
        Some(self.columns.remove(idx))
    }

    /// Strip surrounding whitespace and literal double-quote characters from
    /// every column name. Copy-pasted CSV headers frequently carry both.
    pub fn clean_column_names(&mut self) {
        for column in &mut self.columns {
            let cleaned: String = column.name.trim().replace('"', "");
            column.name = cleaned;
        }
    }

    /// Collapse missing-value representations to [`Value::Null`].
    ///
    /// Float NaN is the one sentinel tabular sources produce for "missing";
    /// every column is rewritten so downstream code only tests for `Null`.
    pub fn normalize_missing(&mut self) {
        for column in &mut self.columns {
            for value in &mut column.values {
                if let Value::Float64(f) = value {
                    if f.is_nan() {
                        *value = Value::Null;
                    }
                }
            }
        }
    }

    /// Iterate rows as slices of borrowed values, in column order
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.rows).map(move |idx| self.columns.iter().map(|c| &c.values[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_row_counts() {
        let mut data = Dataset::new();
        data.push_column("a", vec![Value::Int64(1), Value::Int64(2)])
            .unwrap();
        let err = data.push_column("b", vec![Value::Int64(1)]).unwrap_err();
        assert!(matches!(err, TabsinkError::Schema(_)));
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let mut data = Dataset::new();
        data.push_column("a", vec![Value::Int64(1)]).unwrap();
        let err = data.push_column("a", vec![Value::Int64(2)]).unwrap_err();
        assert!(matches!(err, TabsinkError::Schema(_)));
    }

    #[test]
    fn cleans_column_names() {
        let mut data = Dataset::from_columns(vec![
            ("  name ", vec![Value::String("A".into())]),
            ("\"y\"", vec![Value::Float64(1.5)]),
        ])
        .unwrap();
        data.clean_column_names();
        assert_eq!(data.column_names(), vec!["name", "y"]);
    }

    #[test]
    fn normalizes_nan_to_null() {
        let mut data =
            Dataset::from_columns(vec![("y", vec![Value::Float64(1.5), Value::Float64(f64::NAN)])])
                .unwrap();
        data.normalize_missing();
        assert_eq!(
            data.column("y").unwrap().values(),
            &[Value::Float64(1.5), Value::Null]
        );
    }

    #[test]
    fn iterates_rows_in_column_order() {
        let data = Dataset::from_columns(vec![
            ("a", vec![Value::Int64(1), Value::Int64(2)]),
            ("b", vec![Value::String("x".into()), Value::String("y".into())]),
        ])
        .unwrap();
        let rows: Vec<Vec<&Value>> = data.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![&Value::Int64(1), &Value::String("x".into())]);
        assert_eq!(rows[1], vec![&Value::Int64(2), &Value::String("y".into())]);
    }
}
