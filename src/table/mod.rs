//! The table component: entity operations, request-builder entry points,
//! interceptor chains and table lifecycle.

mod batch;
mod conditions;
mod helpers;
mod query;
mod scan;
mod types;

pub use conditions::{ConditionReceiver, FilterCondition};
pub use query::{KeyCondition, Query};
pub use scan::{ParallelScan, Scan};
pub use types::OutputItems;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::codec;
use crate::error::{Error, TransportError};
use crate::expression::{
    self, build_filter_expression, ConditionOperator, RawUpdateExpression, UpdateItem,
    UpdateOperand,
};
use crate::item::{Item, ItemConstructor, ItemFactory};
use crate::key;
use crate::schema::{AttributeType, Schema};
use crate::transport::{
    AttributeMap, DeleteRequest, GetRequest, IndexSpec, KeySchemaSpec, PutRequest, ReturnValues,
    TableDescription, TableSpec, Transport, UpdateRequest, UpdateTableRequest,
};

/// Expected-attribute condition attached to a write.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// The attribute must exist (`true`) or must not exist (`false`).
    Exists(bool),
    /// The attribute must equal the value.
    Equals(Value),
    /// The attribute must differ from the value.
    NotEquals(Value),
}

/// Options for [`Table::get_item`].
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Request a strongly-consistent read.
    pub consistent_read: Option<bool>,
    /// Raw projection expression narrowing the returned attributes.
    pub projection_expression: Option<String>,
    /// Name placeholders referenced by the projection.
    pub expression_attribute_names: HashMap<String, String>,
}

/// Options for [`Table::put_item`].
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// Replace an existing item with the same key. When `false`, the put is
    /// guarded by conditions requiring the key to be absent or different.
    pub overwrite: bool,
    /// Expected-attribute conditions guarding the write.
    pub expected: BTreeMap<String, Expected>,
    /// Which previous attribute state to echo back.
    pub return_values: ReturnValues,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            expected: BTreeMap::new(),
            return_values: ReturnValues::None,
        }
    }
}

/// Options for [`Table::update_item`].
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Caller-supplied raw update-expression fragment, merged with the
    /// compiled expression (caller placeholders win on conflicts).
    pub raw_update: Option<RawUpdateExpression>,
    /// Expected-attribute conditions guarding the update.
    pub expected: BTreeMap<String, Expected>,
    /// Which attribute state to echo back.
    pub return_values: ReturnValues,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            raw_update: None,
            expected: BTreeMap::new(),
            return_values: ReturnValues::AllNew,
        }
    }
}

/// Options for [`Table::delete_item`].
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// Expected-attribute conditions guarding the delete.
    pub expected: BTreeMap<String, Expected>,
    /// Which previous attribute state to echo back.
    pub return_values: ReturnValues,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            expected: BTreeMap::new(),
            return_values: ReturnValues::AllOld,
        }
    }
}

/// Options for [`Table::create_table`].
#[derive(Debug, Clone)]
pub struct CreateTableOptions {
    /// Provisioned read capacity for the table.
    pub read_capacity: i64,
    /// Provisioned write capacity for the table.
    pub write_capacity: i64,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self {
            read_capacity: 1,
            write_capacity: 1,
        }
    }
}

/// Before-put interceptor: receives and returns a transformed candidate
/// document. An error aborts the chain as a validation failure.
pub type PutInterceptor =
    Arc<dyn Fn(Map<String, Value>) -> Result<Map<String, Value>, String> + Send + Sync>;

/// Before-update interceptor: receives and returns a transformed update
/// body. An error aborts the chain as a validation failure.
pub type UpdateInterceptor = Arc<dyn Fn(UpdateItem) -> Result<UpdateItem, String> + Send + Sync>;

/// After-write observer: sees the materialized result of a completed write.
pub type AfterObserver = Arc<dyn Fn(&Item) + Send + Sync>;

/// A schema-aware handle over one table of the backing store.
///
/// Owns the schema oracle, the transport collaborator, the entity
/// constructor strategy and the interceptor chains. All request-builder
/// state lives in the builders it hands out; the table itself is freely
/// shareable across tasks.
pub struct Table {
    name: String,
    schema: Arc<Schema>,
    transport: Arc<dyn Transport>,
    constructor: ItemConstructor,
    before_put: Vec<PutInterceptor>,
    before_update: Vec<UpdateInterceptor>,
    after_put: Vec<AfterObserver>,
    after_update: Vec<AfterObserver>,
    after_delete: Vec<AfterObserver>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name())
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Table {
    /// Create a handle over `name`, consulting `schema` and executing
    /// through `transport`.
    pub fn new(name: impl Into<String>, schema: Schema, transport: Arc<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(schema),
            transport,
            constructor: ItemConstructor::default(),
            before_put: Vec::new(),
            before_update: Vec::new(),
            after_put: Vec::new(),
            after_update: Vec::new(),
            after_delete: Vec::new(),
        }
    }

    /// Inject a caller-supplied entity constructor. Selected once at setup
    /// and held immutably thereafter.
    pub fn with_item_factory(mut self, factory: ItemFactory) -> Self {
        self.constructor = ItemConstructor::Factory(factory);
        self
    }

    /// Append a before-put interceptor. Interceptors run synchronously in
    /// registration order; the first failure aborts the operation.
    pub fn on_before_put(mut self, interceptor: PutInterceptor) -> Self {
        self.before_put.push(interceptor);
        self
    }

    /// Append a before-update interceptor.
    pub fn on_before_update(mut self, interceptor: UpdateInterceptor) -> Self {
        self.before_update.push(interceptor);
        self
    }

    /// Append an after-put observer.
    pub fn on_after_put(mut self, observer: AfterObserver) -> Self {
        self.after_put.push(observer);
        self
    }

    /// Append an after-update observer.
    pub fn on_after_update(mut self, observer: AfterObserver) -> Self {
        self.after_update.push(observer);
        self
    }

    /// Append an after-delete observer.
    pub fn on_after_delete(mut self, observer: AfterObserver) -> Self {
        self.after_delete.push(observer);
        self
    }

    /// Effective table name: the schema's declared name wins over the name
    /// the handle was constructed with.
    pub fn name(&self) -> &str {
        self.schema.table_name().unwrap_or(&self.name)
    }

    /// The schema oracle.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Materialize an entity through the constructor strategy.
    pub fn create_item(&self, attributes: Map<String, Value>) -> Item {
        self.constructor.construct(attributes)
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn transport_failure(
        &self,
        operation: &'static str,
        failure: TransportError,
    ) -> Error {
        error!(table = %self.name(), operation, error = %failure, "request failed");
        Error::Transport(failure)
    }

    fn validation_error(&self, message: impl Into<String>) -> Error {
        Error::Validation {
            table: self.name().to_string(),
            message: message.into(),
        }
    }

    /// Fetch one item by key. Returns `None` when it does not exist.
    pub async fn get_item(
        &self,
        hash_key: &Value,
        range_key: Option<&Value>,
        options: GetOptions,
    ) -> Result<Option<Item>, Error> {
        let request = GetRequest {
            table_name: self.name().to_string(),
            key: key::build_key(&self.schema, hash_key, range_key)?,
            consistent_read: options.consistent_read,
            projection_expression: options.projection_expression,
            expression_attribute_names: options.expression_attribute_names,
        };

        debug!(table = %self.name(), operation = "get", "sending request");
        let output = self
            .transport
            .get_item(request)
            .await
            .map_err(|e| self.transport_failure("get", e))?;

        Ok(output
            .item
            .map(|item| self.create_item(codec::deserialize_item(&item))))
    }

    /// Insert or replace one item.
    ///
    /// The candidate runs through the before-put interceptors, gets its
    /// created-at field stamped when timestamps are enabled, is validated
    /// by the schema (failures carry the table name), stripped of nulls and
    /// serialized. With `overwrite` off, the write is guarded by conditions
    /// on the key attributes.
    pub async fn put_item(
        &self,
        attributes: Map<String, Value>,
        options: PutOptions,
    ) -> Result<Item, Error> {
        let mut candidate = attributes;
        for interceptor in &self.before_put {
            candidate = interceptor(candidate).map_err(|message| self.validation_error(message))?;
        }

        if let Some(field) = self.schema.created_at_field() {
            if !candidate.contains_key(field) {
                let _ = candidate.insert(
                    field.to_string(),
                    Value::String(Utc::now().to_rfc3339()),
                );
            }
        }

        self.schema
            .validate(&candidate)
            .map_err(|failure| self.validation_error(failure.message()))?;

        let stripped = omit_nulls(candidate);
        let item = codec::serialize_item(self.schema.datatypes(), &stripped, false);

        let mut condition_expression = None;
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        apply_expected_conditions(
            &options.expected,
            &mut condition_expression,
            &mut names,
            &mut values,
        );

        if !options.overwrite {
            let mut guards = BTreeMap::new();
            if let Some(value) = stripped.get(self.schema.hash_key_name()) {
                let _ = guards.insert(
                    self.schema.hash_key_name().to_string(),
                    Expected::NotEquals(value.clone()),
                );
            }
            if let Some(range_name) = self.schema.range_key_name() {
                if let Some(value) = stripped.get(range_name) {
                    let _ =
                        guards.insert(range_name.to_string(), Expected::NotEquals(value.clone()));
                }
            }
            apply_expected_conditions(
                &guards,
                &mut condition_expression,
                &mut names,
                &mut values,
            );
        }

        let request = PutRequest {
            table_name: self.name().to_string(),
            item,
            condition_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
            return_values: options.return_values,
        };

        debug!(table = %self.name(), operation = "put", "sending request");
        let output = self
            .transport
            .put_item(request)
            .await
            .map_err(|e| self.transport_failure("put", e))?;

        let result = match output.attributes {
            Some(attributes) => self.create_item(codec::deserialize_item(&attributes)),
            None => self.create_item(stripped),
        };
        for observer in &self.after_put {
            observer(&result);
        }
        Ok(result)
    }

    /// Serialize any [`serde::Serialize`] entity into a document and put
    /// it. The entity must serialize to an object.
    pub async fn put<T: serde::Serialize>(
        &self,
        entity: &T,
        options: PutOptions,
    ) -> Result<Item, Error> {
        let value = serde_json::to_value(entity)
            .map_err(|source| self.validation_error(source.to_string()))?;
        match value {
            Value::Object(attributes) => self.put_item(attributes, options).await,
            _ => Err(self.validation_error("entity must serialize to an object")),
        }
    }

    /// Apply an update body to one item.
    ///
    /// The body is fragment-validated (removals may not touch required
    /// attributes; assigned values are type-checked), run through the
    /// before-update interceptors, stamped with the updated-at field when
    /// timestamps are enabled, compiled into an update expression, and
    /// merged with any caller-supplied raw expression.
    ///
    /// Returns the attribute state selected by the options' return values,
    /// when the store echoes one.
    pub async fn update_item(
        &self,
        item: UpdateItem,
        options: UpdateOptions,
    ) -> Result<Option<Item>, Error> {
        let removals: Vec<&str> = item
            .iter()
            .filter(|(_, operand)| operand.is_removal())
            .map(|(name, _)| name.as_str())
            .collect();
        self.schema
            .validate_removal(&removals)
            .map_err(|failure| self.validation_error(failure.message()))?;

        let assigned: Map<String, Value> = item
            .iter()
            .filter_map(|(name, operand)| match operand {
                UpdateOperand::Assign(value) if !operand.is_removal() => {
                    Some((name.clone(), value.clone()))
                }
                _ => None,
            })
            .collect();
        self.schema
            .validate_partial(&assigned)
            .map_err(|failure| self.validation_error(failure.message()))?;

        let mut candidate = item;
        for interceptor in &self.before_update {
            candidate = interceptor(candidate).map_err(|message| self.validation_error(message))?;
        }

        if let Some(field) = self.schema.updated_at_field() {
            if !candidate.contains_key(field) {
                let _ = candidate.insert(
                    field.to_string(),
                    UpdateOperand::Assign(Value::String(Utc::now().to_rfc3339())),
                );
            }
        }

        let key = key::build_key(&self.schema, &Value::Object(key_attributes(&self.schema, &candidate)), None)?;

        let mut serialized = expression::serialize_update_expression(&self.schema, &candidate);
        if let Some(raw) = &options.raw_update {
            serialized.merge_raw(raw);
        }

        let update_expression = serialized.clauses.stringify();
        let mut condition_expression = None;
        let mut names = serialized.attribute_names;
        let mut values = serialized.attribute_values;
        apply_expected_conditions(
            &options.expected,
            &mut condition_expression,
            &mut names,
            &mut values,
        );

        let request = UpdateRequest {
            table_name: self.name().to_string(),
            key,
            update_expression: (!update_expression.is_empty()).then_some(update_expression),
            condition_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
            return_values: options.return_values,
        };

        debug!(table = %self.name(), operation = "update", "sending request");
        let output = self
            .transport
            .update_item(request)
            .await
            .map_err(|e| self.transport_failure("update", e))?;

        let result = output
            .attributes
            .map(|attributes| self.create_item(codec::deserialize_item(&attributes)));
        if let Some(item) = &result {
            for observer in &self.after_update {
                observer(item);
            }
        }
        Ok(result)
    }

    /// Delete one item by key. Returns the previous attribute state when
    /// the store echoes one.
    pub async fn delete_item(
        &self,
        hash_key: &Value,
        range_key: Option<&Value>,
        options: DeleteOptions,
    ) -> Result<Option<Item>, Error> {
        let mut condition_expression = None;
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        apply_expected_conditions(
            &options.expected,
            &mut condition_expression,
            &mut names,
            &mut values,
        );

        let request = DeleteRequest {
            table_name: self.name().to_string(),
            key: key::build_key(&self.schema, hash_key, range_key)?,
            condition_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
            return_values: options.return_values,
        };

        debug!(table = %self.name(), operation = "delete", "sending request");
        let output = self
            .transport
            .delete_item(request)
            .await
            .map_err(|e| self.transport_failure("delete", e))?;

        let result = output
            .attributes
            .map(|attributes| self.create_item(codec::deserialize_item(&attributes)));
        if let Some(item) = &result {
            for observer in &self.after_delete {
                observer(item);
            }
        }
        Ok(result)
    }

    /// Start a query for `hash_key`.
    pub fn query(&self, hash_key: Value) -> Query<'_> {
        Query::new(self, hash_key)
    }

    /// Start a scan over the table.
    pub fn scan(&self) -> Scan<'_> {
        Scan::new(self)
    }

    /// Start a parallel scan fanning out over `total_segments` segments.
    pub fn parallel_scan(&self, total_segments: usize) -> ParallelScan<'_> {
        ParallelScan::new(self, total_segments)
    }

    /// Fetch many items by key; see the batch module for bucketing and
    /// continuation semantics.
    pub async fn batch_get_items(&self, keys: &[Value]) -> Result<Vec<Item>, Error> {
        batch::get_items(self, keys).await
    }

    /// Create the table declared by the schema: key schema, attribute
    /// definitions and secondary indexes.
    pub async fn create_table(
        &self,
        options: CreateTableOptions,
    ) -> Result<TableDescription, Error> {
        let spec = self.make_table_spec(&options);
        info!(table = %self.name(), operation = "createTable", "sending request");
        self.transport
            .create_table(spec)
            .await
            .map_err(|e| self.transport_failure("createTable", e))
    }

    /// Describe the live table; `None` when it does not exist.
    pub async fn describe_table(&self) -> Result<Option<TableDescription>, Error> {
        debug!(table = %self.name(), operation = "describeTable", "sending request");
        self.transport
            .describe_table(self.name())
            .await
            .map_err(|e| self.transport_failure("describeTable", e))
    }

    /// Delete the live table.
    pub async fn delete_table(&self) -> Result<(), Error> {
        info!(table = %self.name(), operation = "deleteTable", "sending request");
        self.transport
            .delete_table(self.name())
            .await
            .map_err(|e| self.transport_failure("deleteTable", e))
    }

    /// Update the table's provisioned throughput, first creating any
    /// schema-declared global index missing from the live table.
    pub async fn update_table_throughput(
        &self,
        read_capacity: i64,
        write_capacity: i64,
    ) -> Result<(), Error> {
        let existing = self
            .describe_table()
            .await?
            .map(|description| description.global_index_names)
            .unwrap_or_default();

        for (name, index) in self.schema.global_indexes() {
            if existing.iter().any(|live| live == name) {
                continue;
            }

            let mut definitions = Vec::new();
            push_definition(&mut definitions, &index.hash_key_name, &self.schema);
            if let Some(range_name) = &index.range_key_name {
                push_definition(&mut definitions, range_name, &self.schema);
            }

            info!(table = %self.name(), index = %name, "adding missing global index");
            let request = UpdateTableRequest {
                table_name: self.name().to_string(),
                provisioned_throughput: None,
                attribute_definitions: definitions,
                create_global_index: Some(index_spec(index)),
            };
            self.transport
                .update_table(request)
                .await
                .map_err(|e| self.transport_failure("updateTable", e))?;
        }

        info!(table = %self.name(), operation = "updateTable", "updating throughput");
        let request = UpdateTableRequest {
            table_name: self.name().to_string(),
            provisioned_throughput: Some((read_capacity.max(1), write_capacity.max(1))),
            attribute_definitions: Vec::new(),
            create_global_index: None,
        };
        self.transport
            .update_table(request)
            .await
            .map_err(|e| self.transport_failure("updateTable", e))
    }

    fn make_table_spec(&self, options: &CreateTableOptions) -> TableSpec {
        let schema = &self.schema;
        let mut definitions = Vec::new();
        push_definition(&mut definitions, schema.hash_key_name(), schema);
        if let Some(range_name) = schema.range_key_name() {
            push_definition(&mut definitions, range_name, schema);
        }

        let mut local_indexes = Vec::new();
        for index in schema.local_indexes().values() {
            if let Some(range_name) = &index.range_key_name {
                push_definition(&mut definitions, range_name, schema);
            }
            local_indexes.push(IndexSpec {
                name: index.name.clone(),
                key_schema: KeySchemaSpec {
                    hash_key: schema.hash_key_name().to_string(),
                    range_key: index.range_key_name.clone(),
                },
                read_capacity: index.read_capacity.unwrap_or(1),
                write_capacity: index.write_capacity.unwrap_or(1),
            });
        }

        let mut global_indexes = Vec::new();
        for index in schema.global_indexes().values() {
            push_definition(&mut definitions, &index.hash_key_name, schema);
            if let Some(range_name) = &index.range_key_name {
                push_definition(&mut definitions, range_name, schema);
            }
            global_indexes.push(index_spec(index));
        }

        TableSpec {
            table_name: self.name().to_string(),
            attribute_definitions: definitions,
            key_schema: KeySchemaSpec {
                hash_key: schema.hash_key_name().to_string(),
                range_key: schema.range_key_name().map(str::to_string),
            },
            local_indexes,
            global_indexes,
            read_capacity: options.read_capacity,
            write_capacity: options.write_capacity,
        }
    }
}

/// Compile expected-attribute conditions into an accumulating condition
/// expression. The first condition stands alone; later ones chain as
/// `existing AND (statement)`. Placeholders already present are never
/// overwritten.
fn apply_expected_conditions(
    expected: &BTreeMap<String, Expected>,
    condition_expression: &mut Option<String>,
    names: &mut HashMap<String, String>,
    values: &mut AttributeMap,
) {
    for (path, expectation) in expected {
        let existing: Vec<String> = values.keys().cloned().collect();

        let (operator, operand) = match expectation {
            // A truthy operand keeps the exists-family operator on
            // `attribute_exists`; an absent one collapses it.
            Expected::Exists(true) => (ConditionOperator::AttributeExists, Some(Value::Bool(true))),
            Expected::Exists(false) => (ConditionOperator::AttributeExists, None),
            Expected::Equals(value) => (ConditionOperator::Equals, Some(value.clone())),
            Expected::NotEquals(value) => (ConditionOperator::NotEquals, Some(value.clone())),
        };

        let condition =
            build_filter_expression(path, operator, &existing, operand.as_ref(), None);

        for (placeholder, name) in condition.attribute_names {
            let _ = names.entry(placeholder).or_insert(name);
        }
        for (placeholder, value) in condition.attribute_values {
            let _ = values.entry(placeholder).or_insert(value);
        }

        *condition_expression = Some(match condition_expression.take() {
            Some(current) => format!("{current} AND ({})", condition.statement),
            None => condition.statement,
        });
    }
}

/// Drop attributes that serialize to nothing: nulls, empty strings and
/// empty arrays.
fn omit_nulls(attributes: Map<String, Value>) -> Map<String, Value> {
    attributes
        .into_iter()
        .filter(|(_, value)| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
        .collect()
}

/// Pull the primary-key attribute values out of an update body.
fn key_attributes(schema: &Schema, item: &UpdateItem) -> Map<String, Value> {
    let mut keys = Map::new();
    for name in [Some(schema.hash_key_name()), schema.range_key_name()]
        .into_iter()
        .flatten()
    {
        if let Some(UpdateOperand::Assign(value)) = item.get(name) {
            let _ = keys.insert(name.to_string(), value.clone());
        }
    }
    keys
}

fn push_definition(definitions: &mut Vec<(String, String)>, name: &str, schema: &Schema) {
    if definitions.iter().any(|(existing, _)| existing == name) {
        return;
    }
    definitions.push((name.to_string(), scalar_code(schema.datatypes().get(name))));
}

fn scalar_code(datatype: Option<&AttributeType>) -> String {
    match datatype {
        Some(AttributeType::Number) => "N",
        Some(AttributeType::Binary) => "B",
        _ => "S",
    }
    .to_string()
}

fn index_spec(index: &crate::schema::IndexDefinition) -> IndexSpec {
    IndexSpec {
        name: index.name.clone(),
        key_schema: KeySchemaSpec {
            hash_key: index.hash_key_name.clone(),
            range_key: index.range_key_name.clone(),
        },
        read_capacity: index.read_capacity.unwrap_or(1),
        write_capacity: index.write_capacity.unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_omit_nulls() {
        let attributes = json!({
            "keep": "x",
            "zero": 0,
            "null": null,
            "empty": "",
            "empty_list": [],
            "full_list": [1]
        });
        let stripped = omit_nulls(attributes.as_object().unwrap().clone());
        assert!(stripped.contains_key("keep"));
        assert!(stripped.contains_key("zero"));
        assert!(stripped.contains_key("full_list"));
        assert!(!stripped.contains_key("null"));
        assert!(!stripped.contains_key("empty"));
        assert!(!stripped.contains_key("empty_list"));
    }

    #[test]
    fn test_apply_expected_conditions() {
        let mut expected = BTreeMap::new();
        let _ = expected.insert("email".to_string(), Expected::Exists(true));
        let _ = expected.insert("name".to_string(), Expected::Equals(json!("alice")));
        let _ = expected.insert("version".to_string(), Expected::NotEquals(json!(3)));

        let mut condition = None;
        let mut names = HashMap::new();
        let mut values = AttributeMap::new();
        apply_expected_conditions(&expected, &mut condition, &mut names, &mut values);

        let statement = condition.unwrap();
        assert_eq!(
            statement,
            "attribute_exists(#email) AND (#name = :name) AND (#version <> :version)"
        );
        assert!(values.contains_key(":name"));
        assert!(values.contains_key(":version"));
        // Existence checks carry no operand.
        assert!(!values.contains_key(":email"));
    }

    #[test]
    fn test_expected_not_exists_collapses() {
        let mut expected = BTreeMap::new();
        let _ = expected.insert("email".to_string(), Expected::Exists(false));

        let mut condition = None;
        let mut names = HashMap::new();
        let mut values = AttributeMap::new();
        apply_expected_conditions(&expected, &mut condition, &mut names, &mut values);

        assert_eq!(condition.unwrap(), "attribute_not_exists(#email)");
        assert!(values.is_empty());
        assert_eq!(names.get("#email"), Some(&"email".to_string()));
    }
}
