//! Dataset to BSON document conversion

use bson::{Bson, Document};
use tabsink_core::{Dataset, Value};

/// Convert a tabsink value to BSON
pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(v) => Bson::Boolean(*v),
        Value::Int64(v) => Bson::Int64(*v),
        Value::Float64(v) => Bson::Double(*v),
        Value::String(v) => Bson::String(v.clone()),
        Value::Bytes(v) => Bson::Binary(bson::Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: v.clone(),
        }),
        Value::Date(v) => Bson::String(v.to_string()),
        Value::DateTime(v) => Bson::String(v.to_string()),
    }
}

/// Convert dataset rows to BSON documents.
///
/// Null values are omitted from each document rather than stored as BSON
/// null; missing fields are the document-model equivalent.
pub fn dataset_to_documents(data: &Dataset) -> Vec<Document> {
    let names: Vec<&str> = data.column_names();
    data.rows()
        .map(|row| {
            let mut doc = Document::new();
            for (name, value) in names.iter().zip(row) {
                if value.is_null() {
                    continue;
                }
                doc.insert(name.to_string(), value_to_bson(value));
            }
            doc
        })
        .collect()
}
