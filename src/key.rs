//! Composite key construction from scalar or object key sources.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Value};

use crate::codec;
use crate::error::Error;
use crate::schema::Schema;

/// Build the serialized key map for a request targeting `schema`'s table.
///
/// `hash_source` is either a bare scalar (with `range_value` supplying the
/// range attribute when the table has one) or a composite object. A
/// composite object contributes the primary hash/range attributes plus any
/// key attributes of declared secondary indexes that are present in it;
/// partial index keys are legal.
///
/// Fails with [`Error::InvalidKey`] when the hash value is absent, or when a
/// scalar source is given for a table whose primary key is composite and no
/// range value accompanies it.
pub fn build_key(
    schema: &Schema,
    hash_source: &Value,
    range_value: Option<&Value>,
) -> Result<HashMap<String, AttributeValue>, Error> {
    let mut keys = Map::new();

    if let Value::Object(source) = hash_source {
        let hash = source
            .get(schema.hash_key_name())
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                Error::InvalidKey(format!(
                    "key source is missing hash attribute `{}`",
                    schema.hash_key_name()
                ))
            })?;
        let _ = keys.insert(schema.hash_key_name().to_string(), hash.clone());

        if let Some(range_name) = schema.range_key_name() {
            if let Some(range) = source.get(range_name).filter(|value| !value.is_null()) {
                let _ = keys.insert(range_name.to_string(), range.clone());
            }
        }

        for index in schema.global_indexes().values() {
            if let Some(value) = source.get(&index.hash_key_name) {
                let _ = keys.insert(index.hash_key_name.clone(), value.clone());
            }
            if let Some(range_name) = &index.range_key_name {
                if let Some(value) = source.get(range_name) {
                    let _ = keys.insert(range_name.clone(), value.clone());
                }
            }
        }

        for index in schema.local_indexes().values() {
            if let Some(range_name) = &index.range_key_name {
                if let Some(value) = source.get(range_name) {
                    let _ = keys.insert(range_name.clone(), value.clone());
                }
            }
        }
    } else {
        if hash_source.is_null() {
            return Err(Error::InvalidKey(format!(
                "hash attribute `{}` has no value",
                schema.hash_key_name()
            )));
        }
        let _ = keys.insert(schema.hash_key_name().to_string(), hash_source.clone());

        match (schema.range_key_name(), range_value) {
            (Some(range_name), Some(range)) if !range.is_null() => {
                let _ = keys.insert(range_name.to_string(), range.clone());
            }
            (Some(range_name), _) => {
                return Err(Error::InvalidKey(format!(
                    "table key is composite: range attribute `{range_name}` requires a value"
                )));
            }
            (None, _) => {}
        }
    }

    Ok(codec::serialize_item(schema.datatypes(), &keys, false))
}
