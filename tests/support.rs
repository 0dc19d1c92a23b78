//! Shared test support: a scripted transport and schema fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use dynamo_model::schema::{AttributeType, Schema};
use dynamo_model::table::Table;
use dynamo_model::transport::{
    AttributeMap, BatchGetOutput, BatchGetRequest, DeleteRequest, GetOutput, GetRequest,
    PutRequest, QueryRequest, ReadPage, ScanRequest, TableDescription, TableSpec, Transport,
    UpdateRequest, UpdateTableRequest, WriteOutput,
};
use dynamo_model::TransportError;

/// Scripted transport: every call records its request and pops the next
/// scripted response, falling back to a benign default.
#[derive(Default)]
pub struct MockTransport {
    pub state: Mutex<MockState>,
}

#[derive(Default)]
pub struct MockState {
    pub get_requests: Vec<GetRequest>,
    pub get_responses: VecDeque<Result<GetOutput, TransportError>>,
    pub put_requests: Vec<PutRequest>,
    pub put_responses: VecDeque<Result<WriteOutput, TransportError>>,
    pub update_requests: Vec<UpdateRequest>,
    pub update_responses: VecDeque<Result<WriteOutput, TransportError>>,
    pub delete_requests: Vec<DeleteRequest>,
    pub delete_responses: VecDeque<Result<WriteOutput, TransportError>>,
    pub query_requests: Vec<QueryRequest>,
    pub query_responses: VecDeque<Result<ReadPage, TransportError>>,
    pub scan_requests: Vec<ScanRequest>,
    pub scan_responses: VecDeque<Result<ReadPage, TransportError>>,
    /// Per-segment response scripts for parallel scans.
    pub segment_responses: HashMap<i32, VecDeque<Result<ReadPage, TransportError>>>,
    pub batch_requests: Vec<BatchGetRequest>,
    pub batch_responses: VecDeque<Result<BatchGetOutput, TransportError>>,
    pub create_table_requests: Vec<TableSpec>,
    pub describe_responses: VecDeque<Result<Option<TableDescription>, TransportError>>,
    pub update_table_requests: Vec<UpdateTableRequest>,
    pub deleted_tables: Vec<String>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_item(&self, request: GetRequest) -> Result<GetOutput, TransportError> {
        let mut state = self.state();
        state.get_requests.push(request);
        state
            .get_responses
            .pop_front()
            .unwrap_or_else(|| Ok(GetOutput::default()))
    }

    async fn put_item(&self, request: PutRequest) -> Result<WriteOutput, TransportError> {
        let mut state = self.state();
        state.put_requests.push(request);
        state
            .put_responses
            .pop_front()
            .unwrap_or_else(|| Ok(WriteOutput::default()))
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<WriteOutput, TransportError> {
        let mut state = self.state();
        state.update_requests.push(request);
        state
            .update_responses
            .pop_front()
            .unwrap_or_else(|| Ok(WriteOutput::default()))
    }

    async fn delete_item(&self, request: DeleteRequest) -> Result<WriteOutput, TransportError> {
        let mut state = self.state();
        state.delete_requests.push(request);
        state
            .delete_responses
            .pop_front()
            .unwrap_or_else(|| Ok(WriteOutput::default()))
    }

    async fn query(&self, request: QueryRequest) -> Result<ReadPage, TransportError> {
        let mut state = self.state();
        state.query_requests.push(request);
        state
            .query_responses
            .pop_front()
            .unwrap_or_else(|| Ok(ReadPage::default()))
    }

    async fn scan(&self, request: ScanRequest) -> Result<ReadPage, TransportError> {
        let mut state = self.state();
        let segment = request.segment;
        state.scan_requests.push(request);

        if let Some(segment) = segment {
            if let Some(responses) = state.segment_responses.get_mut(&segment) {
                if let Some(response) = responses.pop_front() {
                    return response;
                }
            }
        }
        state
            .scan_responses
            .pop_front()
            .unwrap_or_else(|| Ok(ReadPage::default()))
    }

    async fn batch_get_item(
        &self,
        request: BatchGetRequest,
    ) -> Result<BatchGetOutput, TransportError> {
        let mut state = self.state();
        let scripted = state.batch_responses.pop_front();
        let default_items = request.keys.clone();
        state.batch_requests.push(request);

        scripted.unwrap_or_else(|| {
            // Echo the requested keys back as items.
            Ok(BatchGetOutput {
                items: default_items,
                unprocessed_keys: Vec::new(),
                consumed_capacity: None,
            })
        })
    }

    async fn create_table(&self, spec: TableSpec) -> Result<TableDescription, TransportError> {
        let mut state = self.state();
        let table_name = spec.table_name.clone();
        state.create_table_requests.push(spec);
        Ok(TableDescription {
            table_name,
            status: Some("CREATING".to_string()),
            ..TableDescription::default()
        })
    }

    async fn describe_table(
        &self,
        _table_name: &str,
    ) -> Result<Option<TableDescription>, TransportError> {
        let mut state = self.state();
        state
            .describe_responses
            .pop_front()
            .unwrap_or_else(|| Ok(None))
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.deleted_tables.push(table_name.to_string());
        Ok(())
    }

    async fn update_table(&self, request: UpdateTableRequest) -> Result<(), TransportError> {
        let mut state = self.state();
        state.update_table_requests.push(request);
        Ok(())
    }
}

/// Orders schema: composite primary key, one GSI, required total.
pub fn orders_schema() -> Schema {
    Schema::builder()
        .hash_key("user_id", AttributeType::String)
        .range_key("order_id", AttributeType::String)
        .attribute("total", AttributeType::Number)
        .attribute("status", AttributeType::String)
        .attribute("tags", AttributeType::StringSet)
        .required("total")
        .global_index(
            dynamo_model::IndexDefinition::new("status-index", "status").with_range_key("total"),
        )
        .build()
        .unwrap()
}

/// Simple hash-only schema.
pub fn users_schema() -> Schema {
    Schema::builder()
        .hash_key("user_id", AttributeType::String)
        .attribute("email", AttributeType::String)
        .build()
        .unwrap()
}

pub fn orders_table(transport: Arc<MockTransport>) -> Table {
    Table::new("orders", orders_schema(), transport)
}

pub fn users_table(transport: Arc<MockTransport>) -> Table {
    Table::new("users", users_schema(), transport)
}

/// `AttributeValue::S` shorthand.
pub fn s(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

/// `AttributeValue::N` shorthand.
pub fn n(value: &str) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// One-attribute item map.
pub fn item_map(name: &str, value: AttributeValue) -> AttributeMap {
    let mut map = AttributeMap::new();
    let _ = map.insert(name.to_string(), value);
    map
}

/// A page of `count` items keyed `user_id = prefix<i>`, with an optional
/// continuation cursor.
pub fn page_of(count: i32, prefix: &str, cursor: Option<AttributeMap>) -> ReadPage {
    let items = (0..count)
        .map(|i| item_map("user_id", s(&format!("{prefix}{i}"))))
        .collect();
    ReadPage {
        items,
        count,
        scanned_count: count,
        consumed_capacity: Some(1.0),
        last_evaluated_key: cursor,
    }
}
