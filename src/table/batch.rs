//! Batch-get bucketing, fan-out and unprocessed-key continuation.

use futures_util::{StreamExt, TryStreamExt};
use serde_json::Value;
use tokio_stream as stream;
use tracing::debug;

use crate::codec;
use crate::error::Error;
use crate::item::Item;
use crate::key;
use crate::table::Table;
use crate::transport::{AttributeMap, BatchGetRequest};

/// Per-call key-count ceiling of the store's batch-get operation.
pub(crate) const BATCH_READ_SIZE: usize = 100;

/// Cap on concurrently in-flight bucket fetches.
pub(crate) const DEFAULT_CONCURRENCY: usize = 10;

/// Fetch many items by key: partition `keys` into buckets of at most 100,
/// issue one independent concurrent logical fetch per bucket, and merge.
///
/// Each raw key is either a bare hash value or a composite object; both go
/// through the key builder. Any page failure for any bucket rejects the
/// whole call; no partial results are returned.
pub(crate) async fn get_items(table: &Table, keys: &[Value]) -> Result<Vec<Item>, Error> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut serialized = Vec::with_capacity(keys.len());
    for raw in keys {
        serialized.push(key::build_key(table.schema(), raw, None)?);
    }

    let buckets: Vec<Vec<AttributeMap>> = serialized
        .chunks(BATCH_READ_SIZE)
        .map(<[AttributeMap]>::to_vec)
        .collect();

    let concurrency = buckets.len().min(DEFAULT_CONCURRENCY);

    stream::iter(buckets.into_iter().map(|bucket| fetch_bucket(table, bucket)))
        .buffer_unordered(concurrency)
        .try_fold(Vec::new(), |mut merged, bucket_items| async move {
            merged.extend(bucket_items);
            Ok(merged)
        })
        .await
}

/// Drive one bucket to exhaustion: issue the batch-get, and while the
/// response reports unprocessed keys, re-issue a follow-up scoped to
/// exactly those keys, concatenating the pages. Pagination within a bucket
/// is strictly sequential.
async fn fetch_bucket(table: &Table, keys: Vec<AttributeMap>) -> Result<Vec<Item>, Error> {
    let mut pending = keys;
    let mut items = Vec::new();

    while !pending.is_empty() {
        let request = BatchGetRequest {
            table_name: table.name().to_string(),
            keys: std::mem::take(&mut pending),
            consistent_read: None,
        };
        debug!(
            table = %table.name(),
            operation = "batchGet",
            keys = request.keys.len(),
            "sending request"
        );

        let output = table
            .transport()
            .batch_get_item(request)
            .await
            .map_err(|e| table.transport_failure("batchGet", e))?;

        items.extend(
            output
                .items
                .iter()
                .map(|item| table.create_item(codec::deserialize_item(item))),
        );
        pending = output.unprocessed_keys;
    }

    Ok(items)
}
