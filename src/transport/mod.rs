//! The request/response boundary to the backing store.
//!
//! This crate is a pure in-process compiler producing request fragments;
//! the [`Transport`] collaborator executes them. [`SdkTransport`] drives the
//! AWS SDK client; tests script their own implementations.

mod sdk;

pub use sdk::SdkTransport;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::TransportError;

/// A serialized attribute document as it crosses the wire.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Which previous attribute state a write operation echoes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnValues {
    /// Echo nothing.
    #[default]
    None,
    /// Echo the attributes as they were before the write.
    AllOld,
    /// Echo the attributes as they are after the write.
    AllNew,
}

/// Single-item read.
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    /// Target table.
    pub table_name: String,
    /// Serialized primary key.
    pub key: AttributeMap,
    /// Strongly-consistent read, when set.
    pub consistent_read: Option<bool>,
    /// Projection expression, when the caller narrows attributes.
    pub projection_expression: Option<String>,
    /// Name placeholders referenced by the projection.
    pub expression_attribute_names: HashMap<String, String>,
}

/// Single-item write.
#[derive(Debug, Clone, Default)]
pub struct PutRequest {
    /// Target table.
    pub table_name: String,
    /// Serialized item body.
    pub item: AttributeMap,
    /// Conditional-write expression, when any.
    pub condition_expression: Option<String>,
    /// Name placeholders referenced by the condition.
    pub expression_attribute_names: HashMap<String, String>,
    /// Value placeholders referenced by the condition.
    pub expression_attribute_values: AttributeMap,
    /// Which previous attribute state to echo back.
    pub return_values: ReturnValues,
}

/// Single-item update.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Target table.
    pub table_name: String,
    /// Serialized primary key.
    pub key: AttributeMap,
    /// Compiled update expression, absent when every clause was empty.
    pub update_expression: Option<String>,
    /// Conditional-write expression, when any.
    pub condition_expression: Option<String>,
    /// Name placeholders referenced by the expressions.
    pub expression_attribute_names: HashMap<String, String>,
    /// Value placeholders referenced by the expressions.
    pub expression_attribute_values: AttributeMap,
    /// Which attribute state to echo back.
    pub return_values: ReturnValues,
}

/// Single-item delete.
#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    /// Target table.
    pub table_name: String,
    /// Serialized primary key.
    pub key: AttributeMap,
    /// Conditional-delete expression, when any.
    pub condition_expression: Option<String>,
    /// Name placeholders referenced by the condition.
    pub expression_attribute_names: HashMap<String, String>,
    /// Value placeholders referenced by the condition.
    pub expression_attribute_values: AttributeMap,
    /// Which previous attribute state to echo back.
    pub return_values: ReturnValues,
}

/// One page of a query.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Target table.
    pub table_name: String,
    /// Secondary index addressed, when any.
    pub index_name: Option<String>,
    /// Compiled key-condition expression.
    pub key_condition_expression: Option<String>,
    /// Compiled filter expression over non-key attributes.
    pub filter_expression: Option<String>,
    /// Projection expression, when the caller narrows attributes.
    pub projection_expression: Option<String>,
    /// Name placeholders referenced by the expressions.
    pub expression_attribute_names: HashMap<String, String>,
    /// Value placeholders referenced by the expressions.
    pub expression_attribute_values: AttributeMap,
    /// Page size cap.
    pub limit: Option<i32>,
    /// Strongly-consistent read, when set.
    pub consistent_read: Option<bool>,
    /// Sort-key ordering; `false` descends.
    pub scan_index_forward: Option<bool>,
    /// Continuation cursor from the previous page.
    pub exclusive_start_key: Option<AttributeMap>,
}

/// One page of a scan, or of one parallel-scan segment.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Target table.
    pub table_name: String,
    /// Secondary index addressed, when any.
    pub index_name: Option<String>,
    /// Compiled filter expression.
    pub filter_expression: Option<String>,
    /// Projection expression, when the caller narrows attributes.
    pub projection_expression: Option<String>,
    /// Name placeholders referenced by the expressions.
    pub expression_attribute_names: HashMap<String, String>,
    /// Value placeholders referenced by the expressions.
    pub expression_attribute_values: AttributeMap,
    /// Page size cap.
    pub limit: Option<i32>,
    /// Strongly-consistent read, when set.
    pub consistent_read: Option<bool>,
    /// Continuation cursor from the previous page.
    pub exclusive_start_key: Option<AttributeMap>,
    /// Segment index for parallel scans.
    pub segment: Option<i32>,
    /// Total segment count for parallel scans.
    pub total_segments: Option<i32>,
}

/// One physical batch-get call over at most 100 keys of one table.
#[derive(Debug, Clone, Default)]
pub struct BatchGetRequest {
    /// Target table.
    pub table_name: String,
    /// Serialized keys to fetch.
    pub keys: Vec<AttributeMap>,
    /// Strongly-consistent read, when set.
    pub consistent_read: Option<bool>,
}

/// Response to a single-item read.
#[derive(Debug, Clone, Default)]
pub struct GetOutput {
    /// The item, when found.
    pub item: Option<AttributeMap>,
    /// Capacity units consumed, when reported.
    pub consumed_capacity: Option<f64>,
}

/// Response to a write (put/update/delete).
#[derive(Debug, Clone, Default)]
pub struct WriteOutput {
    /// Echoed attribute state, per the request's `return_values`.
    pub attributes: Option<AttributeMap>,
    /// Capacity units consumed, when reported.
    pub consumed_capacity: Option<f64>,
}

/// One page of query or scan results.
#[derive(Debug, Clone, Default)]
pub struct ReadPage {
    /// Items on this page.
    pub items: Vec<AttributeMap>,
    /// Item count on this page.
    pub count: i32,
    /// Items examined before filtering.
    pub scanned_count: i32,
    /// Capacity units consumed, when reported.
    pub consumed_capacity: Option<f64>,
    /// Continuation cursor; present when more results exist.
    pub last_evaluated_key: Option<AttributeMap>,
}

/// Response to one physical batch-get call.
#[derive(Debug, Clone, Default)]
pub struct BatchGetOutput {
    /// Items returned for the requested table.
    pub items: Vec<AttributeMap>,
    /// Keys the service declined to process; the caller re-issues them.
    pub unprocessed_keys: Vec<AttributeMap>,
    /// Capacity units consumed, when reported.
    pub consumed_capacity: Option<f64>,
}

/// Key layout of a table or index.
#[derive(Debug, Clone, Default)]
pub struct KeySchemaSpec {
    /// Hash attribute name.
    pub hash_key: String,
    /// Range attribute name, when any.
    pub range_key: Option<String>,
}

/// A secondary index to create.
#[derive(Debug, Clone, Default)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Index key layout.
    pub key_schema: KeySchemaSpec,
    /// Provisioned read capacity.
    pub read_capacity: i64,
    /// Provisioned write capacity.
    pub write_capacity: i64,
}

/// Everything needed to create a table.
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    /// Table name.
    pub table_name: String,
    /// Key and index attributes with their scalar type codes (`S`/`N`/`B`).
    pub attribute_definitions: Vec<(String, String)>,
    /// Primary key layout.
    pub key_schema: KeySchemaSpec,
    /// Local secondary indexes.
    pub local_indexes: Vec<IndexSpec>,
    /// Global secondary indexes.
    pub global_indexes: Vec<IndexSpec>,
    /// Provisioned read capacity.
    pub read_capacity: i64,
    /// Provisioned write capacity.
    pub write_capacity: i64,
}

/// Live state of a table, as reported by the store.
#[derive(Debug, Clone, Default)]
pub struct TableDescription {
    /// Table name.
    pub table_name: String,
    /// Lifecycle status (`CREATING`, `ACTIVE`, ...), when reported.
    pub status: Option<String>,
    /// Approximate item count, when reported.
    pub item_count: Option<i64>,
    /// Names of the table's live global secondary indexes.
    pub global_index_names: Vec<String>,
    /// Provisioned read capacity, when reported.
    pub read_capacity: Option<i64>,
    /// Provisioned write capacity, when reported.
    pub write_capacity: Option<i64>,
}

/// A table mutation: throughput change and/or creation of one global index.
#[derive(Debug, Clone, Default)]
pub struct UpdateTableRequest {
    /// Table name.
    pub table_name: String,
    /// New `(read, write)` provisioned throughput, when changing capacity.
    pub provisioned_throughput: Option<(i64, i64)>,
    /// Attribute definitions backing a new index's keys.
    pub attribute_definitions: Vec<(String, String)>,
    /// Global index to create, when any.
    pub create_global_index: Option<IndexSpec>,
}

/// Executes request fragments against the backing store.
///
/// One call is one physical request–response; this crate never retries and
/// drives pagination by issuing follow-up requests itself. Implementations
/// must be shareable across concurrent logical calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch one item by key.
    async fn get_item(&self, request: GetRequest) -> Result<GetOutput, TransportError>;
    /// Insert or replace one item.
    async fn put_item(&self, request: PutRequest) -> Result<WriteOutput, TransportError>;
    /// Apply an update expression to one item.
    async fn update_item(&self, request: UpdateRequest) -> Result<WriteOutput, TransportError>;
    /// Delete one item by key.
    async fn delete_item(&self, request: DeleteRequest) -> Result<WriteOutput, TransportError>;
    /// Execute one query page.
    async fn query(&self, request: QueryRequest) -> Result<ReadPage, TransportError>;
    /// Execute one scan page.
    async fn scan(&self, request: ScanRequest) -> Result<ReadPage, TransportError>;
    /// Execute one physical batch-get call.
    async fn batch_get_item(
        &self,
        request: BatchGetRequest,
    ) -> Result<BatchGetOutput, TransportError>;
    /// Create a table.
    async fn create_table(&self, spec: TableSpec) -> Result<TableDescription, TransportError>;
    /// Describe a table; `None` when it does not exist.
    async fn describe_table(
        &self,
        table_name: &str,
    ) -> Result<Option<TableDescription>, TransportError>;
    /// Delete a table.
    async fn delete_table(&self, table_name: &str) -> Result<(), TransportError>;
    /// Update throughput and/or create a global index.
    async fn update_table(&self, request: UpdateTableRequest) -> Result<(), TransportError>;
}
