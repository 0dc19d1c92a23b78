//! Conversion between application values and store-typed attributes.
//!
//! Application values are [`serde_json::Value`]; store attributes are
//! [`AttributeValue`]. Serialization is driven by the schema's declared type
//! for each path; without one, values pass through by inference (degraded
//! mode, loses type coercion). Deserialization is the exact inverse, except
//! that sets lose internal ordering.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Number, Value};

use crate::schema::AttributeType;

/// Serialize one application value under its declared type.
///
/// A `null` value always serializes to the null attribute. Set-declared
/// values accept either an array or a bare scalar (wrapped into a
/// one-element set). Boolean-declared values coerce as
/// `truthy AND value != "false"`.
pub fn serialize_attribute(value: &Value, declared: Option<&AttributeType>) -> AttributeValue {
    let Some(declared) = declared else {
        return infer(value);
    };

    if value.is_null() {
        return AttributeValue::Null(true);
    }

    match declared {
        AttributeType::Binary => match value {
            Value::String(s) => AttributeValue::B(Blob::new(s.as_bytes().to_vec())),
            other => infer(other),
        },
        AttributeType::BinarySet => {
            AttributeValue::Bs(set_members(value).iter().map(|m| Blob::new(m.as_bytes().to_vec())).collect())
        }
        AttributeType::NumberSet => AttributeValue::Ns(set_members(value)),
        AttributeType::StringSet => AttributeValue::Ss(set_members(value)),
        AttributeType::Boolean => AttributeValue::Bool(to_boolean(value)),
        AttributeType::Number => match value {
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::N(s.clone()),
            other => infer(other),
        },
        AttributeType::Map(fragment) => match value {
            Value::Object(entries) => AttributeValue::M(serialize_entries(fragment, entries, true)),
            other => infer(other),
        },
        AttributeType::String | AttributeType::List | AttributeType::Null => infer(value),
    }
}

/// Serialize a document under a schema fragment's declared types.
///
/// Attributes that serialize to null are dropped unless `return_nulls`.
pub fn serialize_item(
    datatypes: &BTreeMap<String, AttributeType>,
    item: &Map<String, Value>,
    return_nulls: bool,
) -> HashMap<String, AttributeValue> {
    serialize_entries(datatypes, item, return_nulls)
}

fn serialize_entries(
    datatypes: &BTreeMap<String, AttributeType>,
    item: &Map<String, Value>,
    return_nulls: bool,
) -> HashMap<String, AttributeValue> {
    let mut serialized = HashMap::with_capacity(item.len());
    for (name, value) in item {
        let attribute = serialize_attribute(value, datatypes.get(name));
        if matches!(attribute, AttributeValue::Null(_)) && !return_nulls {
            continue;
        }
        let _ = serialized.insert(name.clone(), attribute);
    }
    serialized
}

/// Deserialize one store attribute back to an application value.
///
/// Structured attributes recurse; set attributes flatten to plain arrays
/// (unordered semantics, values preserved); scalars map back directly.
pub fn deserialize_attribute(attribute: &AttributeValue) -> Value {
    match attribute {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::B(b) => Value::String(String::from_utf8_lossy(b.as_ref()).into_owned()),
        AttributeValue::Ss(members) => {
            Value::Array(members.iter().map(|m| Value::String(m.clone())).collect())
        }
        AttributeValue::Ns(members) => Value::Array(members.iter().map(|m| parse_number(m)).collect()),
        AttributeValue::Bs(members) => Value::Array(
            members
                .iter()
                .map(|m| Value::String(String::from_utf8_lossy(m.as_ref()).into_owned()))
                .collect(),
        ),
        AttributeValue::L(items) => Value::Array(items.iter().map(deserialize_attribute).collect()),
        AttributeValue::M(entries) => Value::Object(deserialize_item(entries)),
        _ => Value::Null,
    }
}

/// Deserialize a full attribute map back to a document.
pub fn deserialize_item(item: &HashMap<String, AttributeValue>) -> Map<String, Value> {
    item.iter()
        .map(|(name, attribute)| (name.clone(), deserialize_attribute(attribute)))
        .collect()
}

/// Loose boolean coercion applied to boolean-declared attributes: any truthy
/// value except the literal string `"false"`.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "false",
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn infer(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(infer).collect()),
        Value::Object(entries) => AttributeValue::M(
            entries
                .iter()
                .map(|(name, nested)| (name.clone(), infer(nested)))
                .collect(),
        ),
    }
}

fn set_members(value: &Value) -> Vec<String> {
    let members: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    members
        .into_iter()
        .map(|member| match member {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        })
        .collect()
}

fn parse_number(text: &str) -> Value {
    text.parse::<Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(text.to_string()))
}
