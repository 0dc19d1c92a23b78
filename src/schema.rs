use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};

use crate::error::Error;

/// Store-level attribute types.
///
/// `Map` carries the declared types of its sub-paths so serialization can
/// recurse into nested structures with the right coercions.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    /// Binary blob, serialized from a string's bytes.
    Binary,
    /// Set of binary blobs.
    BinarySet,
    /// Boolean, coerced from loosely-typed values.
    Boolean,
    /// Heterogeneous list.
    List,
    /// Nested document with per-attribute declared types.
    Map(BTreeMap<String, AttributeType>),
    /// Explicit null.
    Null,
    /// Number, transported as a string.
    Number,
    /// Set of numbers.
    NumberSet,
    /// UTF-8 string.
    String,
    /// Set of strings.
    StringSet,
}

impl AttributeType {
    /// Wire code of this type (`S`, `N`, `BS`, ...), as used in attribute
    /// definitions and diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            AttributeType::Binary => "B",
            AttributeType::BinarySet => "BS",
            AttributeType::Boolean => "BOOL",
            AttributeType::List => "L",
            AttributeType::Map(_) => "M",
            AttributeType::Null => "NULL",
            AttributeType::Number => "N",
            AttributeType::NumberSet => "NS",
            AttributeType::String => "S",
            AttributeType::StringSet => "SS",
        }
    }
}

/// A secondary index declared on the table.
///
/// Global indexes carry their own hash (and optional range) attribute;
/// local indexes share the table's hash attribute and only declare a range.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    /// Index name, unique within the table.
    pub name: String,
    /// Hash attribute of the index.
    pub hash_key_name: String,
    /// Range attribute, when the index has one.
    pub range_key_name: Option<String>,
    /// Provisioned read capacity for the index, when specified.
    pub read_capacity: Option<i64>,
    /// Provisioned write capacity for the index, when specified.
    pub write_capacity: Option<i64>,
}

impl IndexDefinition {
    /// New index keyed on `hash_key_name` with no range attribute.
    pub fn new(name: impl Into<String>, hash_key_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key_name: hash_key_name.into(),
            range_key_name: None,
            read_capacity: None,
            write_capacity: None,
        }
    }

    /// Add a range attribute to the index.
    pub fn with_range_key(mut self, range_key_name: impl Into<String>) -> Self {
        self.range_key_name = Some(range_key_name.into());
        self
    }

    /// Set provisioned throughput for the index.
    pub fn with_throughput(mut self, read_capacity: i64, write_capacity: i64) -> Self {
        self.read_capacity = Some(read_capacity);
        self.write_capacity = Some(write_capacity);
        self
    }
}

/// A schema-validation rejection.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    fn new(message: String) -> Self {
        Self { message }
    }

    /// What the schema objected to.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Declared shape of a table: key attributes, per-path datatypes, secondary
/// indexes, required attributes and timestamp configuration.
///
/// The schema is a read-only oracle: operations consult it for key names,
/// declared types and validation, and never mutate it.
#[derive(Debug, Clone)]
pub struct Schema {
    table_name: Option<String>,
    hash_key_name: String,
    range_key_name: Option<String>,
    datatypes: BTreeMap<String, AttributeType>,
    required: BTreeSet<String>,
    global_indexes: BTreeMap<String, IndexDefinition>,
    local_indexes: BTreeMap<String, IndexDefinition>,
    created_at_field: Option<String>,
    updated_at_field: Option<String>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Table name declared on the schema, if any. Overrides the name a
    /// table component was constructed with.
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Name of the primary hash attribute.
    pub fn hash_key_name(&self) -> &str {
        &self.hash_key_name
    }

    /// Name of the primary range attribute, when the table has one.
    pub fn range_key_name(&self) -> Option<&str> {
        self.range_key_name.as_deref()
    }

    /// Declared type per attribute path.
    pub fn datatypes(&self) -> &BTreeMap<String, AttributeType> {
        &self.datatypes
    }

    /// Global secondary indexes by name.
    pub fn global_indexes(&self) -> &BTreeMap<String, IndexDefinition> {
        &self.global_indexes
    }

    /// Local secondary indexes by name.
    pub fn local_indexes(&self) -> &BTreeMap<String, IndexDefinition> {
        &self.local_indexes
    }

    /// Field stamped on creation, unless timestamping is disabled.
    pub fn created_at_field(&self) -> Option<&str> {
        self.created_at_field.as_deref()
    }

    /// Field stamped on update, unless timestamping is disabled.
    pub fn updated_at_field(&self) -> Option<&str> {
        self.updated_at_field.as_deref()
    }

    /// Whether `name` is the primary hash or range attribute.
    pub fn is_key_attribute(&self, name: &str) -> bool {
        name == self.hash_key_name || self.range_key_name.as_deref() == Some(name)
    }

    /// Validate a full candidate entity: required attributes must be present
    /// and non-null, and present attributes must match their declared types.
    pub fn validate(&self, candidate: &Map<String, Value>) -> Result<(), ValidationFailure> {
        for name in &self.required {
            if candidate.get(name).map_or(true, Value::is_null) {
                return Err(ValidationFailure::new(format!(
                    "required attribute `{name}` is missing"
                )));
            }
        }
        self.validate_partial(candidate)
    }

    /// Validate a fragment of an entity: only type-checks the attributes
    /// present, without enforcing required attributes.
    pub fn validate_partial(&self, candidate: &Map<String, Value>) -> Result<(), ValidationFailure> {
        for (name, value) in candidate {
            if value.is_null() {
                continue;
            }
            if let Some(declared) = self.datatypes.get(name) {
                if !type_matches(declared, value) {
                    return Err(ValidationFailure::new(format!(
                        "attribute `{name}` does not match declared type {}",
                        declared.code()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Refuse removal of required attributes.
    pub fn validate_removal(&self, names: &[&str]) -> Result<(), ValidationFailure> {
        for name in names {
            if self.required.contains(*name) {
                return Err(ValidationFailure::new(format!(
                    "required attribute `{name}` cannot be removed"
                )));
            }
        }
        Ok(())
    }
}

fn type_matches(declared: &AttributeType, value: &Value) -> bool {
    match declared {
        AttributeType::Binary | AttributeType::String => value.is_string(),
        // Boolean accepts anything: the codec coerces.
        AttributeType::Boolean => true,
        AttributeType::Number => {
            value.is_number() || matches!(value, Value::String(s) if s.parse::<f64>().is_ok())
        }
        AttributeType::List => value.is_array(),
        // A bare scalar is legal for a set: serialization wraps it.
        AttributeType::BinarySet | AttributeType::NumberSet | AttributeType::StringSet => {
            !value.is_object()
        }
        AttributeType::Map(fragment) => match value {
            Value::Object(entries) => entries.iter().all(|(name, nested)| {
                fragment
                    .get(name)
                    .map(|declared| nested.is_null() || type_matches(declared, nested))
                    .unwrap_or(true)
            }),
            _ => false,
        },
        AttributeType::Null => value.is_null(),
    }
}

const DEFAULT_CREATED_AT: &str = "createdAt";
const DEFAULT_UPDATED_AT: &str = "updatedAt";

/// Fluent builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    table_name: Option<String>,
    hash_key: Option<(String, AttributeType)>,
    range_key: Option<(String, AttributeType)>,
    datatypes: BTreeMap<String, AttributeType>,
    required: BTreeSet<String>,
    global_indexes: BTreeMap<String, IndexDefinition>,
    local_indexes: BTreeMap<String, IndexDefinition>,
    timestamps: bool,
    created_at_name: Option<String>,
    created_at_disabled: bool,
    updated_at_name: Option<String>,
    updated_at_disabled: bool,
}

impl SchemaBuilder {
    /// Declare the table name on the schema.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Declare the primary hash attribute. Mandatory.
    pub fn hash_key(mut self, name: impl Into<String>, datatype: AttributeType) -> Self {
        self.hash_key = Some((name.into(), datatype));
        self
    }

    /// Declare the primary range attribute.
    pub fn range_key(mut self, name: impl Into<String>, datatype: AttributeType) -> Self {
        self.range_key = Some((name.into(), datatype));
        self
    }

    /// Declare a non-key attribute's type.
    pub fn attribute(mut self, name: impl Into<String>, datatype: AttributeType) -> Self {
        let _ = self.datatypes.insert(name.into(), datatype);
        self
    }

    /// Mark an attribute as required for full-entity validation.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        let _ = self.required.insert(name.into());
        self
    }

    /// Declare a global secondary index.
    pub fn global_index(mut self, index: IndexDefinition) -> Self {
        let _ = self.global_indexes.insert(index.name.clone(), index);
        self
    }

    /// Declare a local secondary index.
    pub fn local_index(mut self, index: IndexDefinition) -> Self {
        let _ = self.local_indexes.insert(index.name.clone(), index);
        self
    }

    /// Enable created-at/updated-at stamping with the default field names.
    pub fn timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Use a custom created-at field name (implies timestamps).
    pub fn created_at(mut self, name: impl Into<String>) -> Self {
        self.timestamps = true;
        self.created_at_name = Some(name.into());
        self
    }

    /// Keep timestamps but never stamp a created-at field.
    pub fn without_created_at(mut self) -> Self {
        self.created_at_disabled = true;
        self
    }

    /// Use a custom updated-at field name (implies timestamps).
    pub fn updated_at(mut self, name: impl Into<String>) -> Self {
        self.timestamps = true;
        self.updated_at_name = Some(name.into());
        self
    }

    /// Keep timestamps but never stamp an updated-at field.
    pub fn without_updated_at(mut self) -> Self {
        self.updated_at_disabled = true;
        self
    }

    /// Finalize the schema.
    pub fn build(self) -> Result<Schema, Error> {
        let (hash_key_name, hash_key_type) = self
            .hash_key
            .ok_or_else(|| Error::Schema("hash key is not declared".into()))?;

        let mut datatypes = self.datatypes;
        let _ = datatypes.insert(hash_key_name.clone(), hash_key_type);

        let range_key_name = self.range_key.map(|(name, datatype)| {
            let _ = datatypes.insert(name.clone(), datatype);
            name
        });

        let created_at_field = (self.timestamps && !self.created_at_disabled)
            .then(|| self.created_at_name.unwrap_or_else(|| DEFAULT_CREATED_AT.into()));
        let updated_at_field = (self.timestamps && !self.updated_at_disabled)
            .then(|| self.updated_at_name.unwrap_or_else(|| DEFAULT_UPDATED_AT.into()));

        for field in created_at_field.iter().chain(updated_at_field.iter()) {
            if !datatypes.contains_key(field) {
                let _ = datatypes.insert(field.clone(), AttributeType::String);
            }
        }

        Ok(Schema {
            table_name: self.table_name,
            hash_key_name,
            range_key_name,
            datatypes,
            required: self.required,
            global_indexes: self.global_indexes,
            local_indexes: self.local_indexes,
            created_at_field,
            updated_at_field,
        })
    }
}
