//! [`Transport`] implementation over the AWS SDK DynamoDB client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::error::{BuildError, ProvideErrorMetadata};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, ConsumedCapacity, CreateGlobalSecondaryIndexAction,
    GlobalSecondaryIndex, GlobalSecondaryIndexUpdate, KeySchemaElement, KeyType,
    KeysAndAttributes, LocalSecondaryIndex, Projection, ProjectionType, ProvisionedThroughput,
    ReturnConsumedCapacity, ReturnValue, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;

use super::{
    BatchGetOutput, BatchGetRequest, DeleteRequest, GetOutput, GetRequest, IndexSpec,
    KeySchemaSpec, PutRequest, QueryRequest, ReadPage, ReturnValues, ScanRequest,
    TableDescription, TableSpec, Transport, UpdateRequest, UpdateTableRequest, WriteOutput,
};
use crate::error::TransportError;

/// Drives physical calls through [`aws_sdk_dynamodb::Client`].
#[derive(Debug, Clone)]
pub struct SdkTransport {
    client: Client,
}

impl SdkTransport {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an AWS configuration.
    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(Client::new(config))
    }

    /// Build a client from the ambient environment with opinionated
    /// defaults: adaptive retry with 3 attempts, connect/read/operation
    /// timeouts of 3/20/60 seconds, and a LocalStack endpoint when
    /// `AWS_PROFILE=localstack`.
    pub async fn from_env() -> Self {
        Self::from_config(&default_sdk_config().await)
    }

    /// The wrapped client, for operations outside this crate's surface.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

async fn default_sdk_config() -> SdkConfig {
    use aws_config::retry::RetryConfig;
    use aws_config::timeout::TimeoutConfig;

    let timeout_config = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(3))
        .read_timeout(Duration::from_secs(20))
        .operation_timeout(Duration::from_secs(60))
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(
            RetryConfig::adaptive()
                .with_max_attempts(3)
                .with_initial_backoff(Duration::from_secs(1)),
        )
        .timeout_config(timeout_config);

    if std::env::var("AWS_PROFILE").unwrap_or_default() == "localstack" {
        loader = loader.endpoint_url("http://127.0.0.1:4566");
    }

    loader.load().await
}

#[async_trait]
impl Transport for SdkTransport {
    async fn get_item(&self, request: GetRequest) -> Result<GetOutput, TransportError> {
        let output = self
            .client
            .get_item()
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .set_consistent_read(request.consistent_read)
            .set_projection_expression(request.projection_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .send()
            .await
            .map_err(|e| from_sdk_error("get", e))?;

        Ok(GetOutput {
            item: output.item,
            consumed_capacity: capacity(output.consumed_capacity),
        })
    }

    async fn put_item(&self, request: PutRequest) -> Result<WriteOutput, TransportError> {
        let output = self
            .client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(request.item))
            .set_condition_expression(request.condition_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .return_values(return_value(request.return_values))
            .send()
            .await
            .map_err(|e| from_sdk_error("put", e))?;

        Ok(WriteOutput {
            attributes: output.attributes,
            consumed_capacity: capacity(output.consumed_capacity),
        })
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<WriteOutput, TransportError> {
        let output = self
            .client
            .update_item()
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .set_update_expression(request.update_expression)
            .set_condition_expression(request.condition_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .return_values(return_value(request.return_values))
            .send()
            .await
            .map_err(|e| from_sdk_error("update", e))?;

        Ok(WriteOutput {
            attributes: output.attributes,
            consumed_capacity: capacity(output.consumed_capacity),
        })
    }

    async fn delete_item(&self, request: DeleteRequest) -> Result<WriteOutput, TransportError> {
        let output = self
            .client
            .delete_item()
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .set_condition_expression(request.condition_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .return_values(return_value(request.return_values))
            .send()
            .await
            .map_err(|e| from_sdk_error("delete", e))?;

        Ok(WriteOutput {
            attributes: output.attributes,
            consumed_capacity: capacity(output.consumed_capacity),
        })
    }

    async fn query(&self, request: QueryRequest) -> Result<ReadPage, TransportError> {
        let output = self
            .client
            .query()
            .table_name(&request.table_name)
            .set_index_name(request.index_name)
            .set_key_condition_expression(request.key_condition_expression)
            .set_filter_expression(request.filter_expression)
            .set_projection_expression(request.projection_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .set_limit(request.limit)
            .set_consistent_read(request.consistent_read)
            .set_scan_index_forward(request.scan_index_forward)
            .set_exclusive_start_key(request.exclusive_start_key)
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(|e| from_sdk_error("query", e))?;

        Ok(ReadPage {
            items: output.items.unwrap_or_default(),
            count: output.count,
            scanned_count: output.scanned_count,
            consumed_capacity: capacity(output.consumed_capacity),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<ReadPage, TransportError> {
        let output = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_index_name(request.index_name)
            .set_filter_expression(request.filter_expression)
            .set_projection_expression(request.projection_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .set_limit(request.limit)
            .set_consistent_read(request.consistent_read)
            .set_exclusive_start_key(request.exclusive_start_key)
            .set_segment(request.segment)
            .set_total_segments(request.total_segments)
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(|e| from_sdk_error("scan", e))?;

        Ok(ReadPage {
            items: output.items.unwrap_or_default(),
            count: output.count,
            scanned_count: output.scanned_count,
            consumed_capacity: capacity(output.consumed_capacity),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn batch_get_item(
        &self,
        request: BatchGetRequest,
    ) -> Result<BatchGetOutput, TransportError> {
        let keys_and_attributes = KeysAndAttributes::builder()
            .set_keys(Some(request.keys))
            .set_consistent_read(request.consistent_read)
            .build()
            .map_err(|e| from_build_error("batchGet", e))?;

        let output = self
            .client
            .batch_get_item()
            .request_items(&request.table_name, keys_and_attributes)
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(|e| from_sdk_error("batchGet", e))?;

        let items = output
            .responses
            .and_then(|mut responses| responses.remove(&request.table_name))
            .unwrap_or_default();
        let unprocessed_keys = output
            .unprocessed_keys
            .and_then(|mut unprocessed| unprocessed.remove(&request.table_name))
            .map(|keys_and_attributes| keys_and_attributes.keys)
            .unwrap_or_default();

        Ok(BatchGetOutput {
            items,
            unprocessed_keys,
            consumed_capacity: total_capacity(output.consumed_capacity),
        })
    }

    async fn create_table(&self, spec: TableSpec) -> Result<TableDescription, TransportError> {
        let mut builder = self
            .client
            .create_table()
            .table_name(&spec.table_name)
            .set_attribute_definitions(Some(attribute_definitions(
                "createTable",
                &spec.attribute_definitions,
            )?))
            .set_key_schema(Some(key_schema_elements("createTable", &spec.key_schema)?))
            .provisioned_throughput(throughput(
                "createTable",
                spec.read_capacity,
                spec.write_capacity,
            )?);

        for index in &spec.local_indexes {
            builder = builder.local_secondary_indexes(
                LocalSecondaryIndex::builder()
                    .index_name(&index.name)
                    .set_key_schema(Some(key_schema_elements("createTable", &index.key_schema)?))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .build()
                    .map_err(|e| from_build_error("createTable", e))?,
            );
        }

        for index in &spec.global_indexes {
            builder = builder.global_secondary_indexes(global_secondary_index(
                "createTable",
                index,
            )?);
        }

        let output = builder
            .send()
            .await
            .map_err(|e| from_sdk_error("createTable", e))?;

        Ok(output
            .table_description
            .map(describe)
            .unwrap_or_else(|| TableDescription {
                table_name: spec.table_name,
                ..TableDescription::default()
            }))
    }

    async fn describe_table(
        &self,
        table_name: &str,
    ) -> Result<Option<TableDescription>, TransportError> {
        match self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
        {
            Ok(output) => Ok(output.table.map(describe)),
            Err(error) => {
                if let Some(service_error) = error.as_service_error() {
                    if service_error.is_resource_not_found_exception() {
                        return Ok(None);
                    }
                }
                Err(from_sdk_error("describeTable", error))
            }
        }
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), TransportError> {
        let _ = self
            .client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| from_sdk_error("deleteTable", e))?;
        Ok(())
    }

    async fn update_table(&self, request: UpdateTableRequest) -> Result<(), TransportError> {
        let mut builder = self.client.update_table().table_name(&request.table_name);

        if let Some((read_capacity, write_capacity)) = request.provisioned_throughput {
            builder = builder
                .provisioned_throughput(throughput("updateTable", read_capacity, write_capacity)?);
        }

        if !request.attribute_definitions.is_empty() {
            builder = builder.set_attribute_definitions(Some(attribute_definitions(
                "updateTable",
                &request.attribute_definitions,
            )?));
        }

        if let Some(index) = &request.create_global_index {
            let action = CreateGlobalSecondaryIndexAction::builder()
                .index_name(&index.name)
                .set_key_schema(Some(key_schema_elements("updateTable", &index.key_schema)?))
                .projection(
                    Projection::builder()
                        .projection_type(ProjectionType::All)
                        .build(),
                )
                .provisioned_throughput(throughput(
                    "updateTable",
                    index.read_capacity,
                    index.write_capacity,
                )?)
                .build()
                .map_err(|e| from_build_error("updateTable", e))?;

            builder = builder.global_secondary_index_updates(
                GlobalSecondaryIndexUpdate::builder().create(action).build(),
            );
        }

        let _ = builder
            .send()
            .await
            .map_err(|e| from_sdk_error("updateTable", e))?;
        Ok(())
    }
}

fn from_sdk_error<E>(operation: &'static str, error: SdkError<E, Response>) -> TransportError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let retryable = match &error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => true,
        SdkError::ServiceError(_) => matches!(
            error.code(),
            Some(
                "ProvisionedThroughputExceededException"
                    | "ThrottlingException"
                    | "RequestLimitExceeded"
                    | "InternalServerError"
            )
        ),
        _ => false,
    };

    let message = match error.message() {
        Some(detail) => format!("{error}: {detail}"),
        None => error.to_string(),
    };

    TransportError {
        operation,
        message,
        retryable,
    }
}

fn from_build_error(operation: &'static str, error: BuildError) -> TransportError {
    TransportError::new(operation, error.to_string())
}

fn non_empty<V>(map: HashMap<String, V>) -> Option<HashMap<String, V>> {
    (!map.is_empty()).then_some(map)
}

fn capacity(consumed: Option<ConsumedCapacity>) -> Option<f64> {
    consumed.and_then(|c| c.capacity_units())
}

fn total_capacity(consumed: Option<Vec<ConsumedCapacity>>) -> Option<f64> {
    consumed.map(|list| list.iter().filter_map(|c| c.capacity_units()).sum())
}

fn return_value(kind: ReturnValues) -> ReturnValue {
    match kind {
        ReturnValues::None => ReturnValue::None,
        ReturnValues::AllOld => ReturnValue::AllOld,
        ReturnValues::AllNew => ReturnValue::AllNew,
    }
}

fn throughput(
    operation: &'static str,
    read_capacity: i64,
    write_capacity: i64,
) -> Result<ProvisionedThroughput, TransportError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(read_capacity.max(1))
        .write_capacity_units(write_capacity.max(1))
        .build()
        .map_err(|e| from_build_error(operation, e))
}

fn key_schema_elements(
    operation: &'static str,
    spec: &KeySchemaSpec,
) -> Result<Vec<KeySchemaElement>, TransportError> {
    let mut elements = vec![
        KeySchemaElement::builder()
            .attribute_name(&spec.hash_key)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| from_build_error(operation, e))?,
    ];

    if let Some(range_key) = &spec.range_key {
        elements.push(
            KeySchemaElement::builder()
                .attribute_name(range_key)
                .key_type(KeyType::Range)
                .build()
                .map_err(|e| from_build_error(operation, e))?,
        );
    }

    Ok(elements)
}

fn attribute_definitions(
    operation: &'static str,
    definitions: &[(String, String)],
) -> Result<Vec<AttributeDefinition>, TransportError> {
    definitions
        .iter()
        .map(|(name, code)| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(scalar_type(code))
                .build()
                .map_err(|e| from_build_error(operation, e))
        })
        .collect()
}

fn scalar_type(code: &str) -> ScalarAttributeType {
    match code {
        "N" => ScalarAttributeType::N,
        "B" => ScalarAttributeType::B,
        _ => ScalarAttributeType::S,
    }
}

fn global_secondary_index(
    operation: &'static str,
    index: &IndexSpec,
) -> Result<GlobalSecondaryIndex, TransportError> {
    GlobalSecondaryIndex::builder()
        .index_name(&index.name)
        .set_key_schema(Some(key_schema_elements(operation, &index.key_schema)?))
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .provisioned_throughput(throughput(
            operation,
            index.read_capacity,
            index.write_capacity,
        )?)
        .build()
        .map_err(|e| from_build_error(operation, e))
}

fn describe(table: aws_sdk_dynamodb::types::TableDescription) -> TableDescription {
    let status = table.table_status.as_ref().map(|s| s.as_str().to_string());
    let read_capacity = table
        .provisioned_throughput
        .as_ref()
        .and_then(|p| p.read_capacity_units);
    let write_capacity = table
        .provisioned_throughput
        .as_ref()
        .and_then(|p| p.write_capacity_units);

    TableDescription {
        table_name: table.table_name.unwrap_or_default(),
        status,
        item_count: table.item_count,
        global_index_names: table
            .global_secondary_indexes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|index| index.index_name)
            .collect(),
        read_capacity,
        write_capacity,
    }
}
