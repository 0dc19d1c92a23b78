//! Shared plumbing for the request-builder family: condition merging and
//! the sequential pagination loop.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use crate::codec;
use crate::error::Error;
use crate::expression::FilterExpression;
use crate::table::types::OutputItems;
use crate::table::Table;
use crate::transport::{QueryRequest, ReadPage, ScanRequest};

/// Merge a compiled condition into an accumulating statement slot and
/// placeholder maps. Existing placeholders are never overwritten; each
/// statement is parenthesized and chained with `AND`.
pub(crate) fn merge_condition(
    statement_slot: &mut Option<String>,
    names: &mut HashMap<String, String>,
    values: &mut HashMap<String, AttributeValue>,
    condition: FilterExpression,
) {
    let FilterExpression {
        attribute_names,
        attribute_values,
        statement,
    } = condition;

    for (placeholder, name) in attribute_names {
        let _ = names.entry(placeholder).or_insert(name);
    }
    for (placeholder, value) in attribute_values {
        let _ = values.entry(placeholder).or_insert(value);
    }

    *statement_slot = Some(match statement_slot.take() {
        Some(existing) => format!("{existing} AND ({statement})"),
        None => format!("({statement})"),
    });
}

/// Fold one response page into the merged output: counts and capacity sum,
/// items deserialize and concatenate, the cursor is replaced by the page's.
pub(crate) fn fold_page(merged: &mut OutputItems, page: ReadPage, table: &Table) {
    merged.count += page.count;
    merged.scanned_count += page.scanned_count;
    if let Some(units) = page.consumed_capacity {
        merged.consumed_capacity = Some(merged.consumed_capacity.unwrap_or(0.0) + units);
    }
    merged.items.extend(
        page.items
            .iter()
            .map(|item| table.create_item(codec::deserialize_item(item))),
    );
    merged.last_evaluated_key = page.last_evaluated_key;
}

/// Drive a query to completion: one physical call, or with `load_all`
/// follow-up calls carrying each returned cursor until none is returned.
///
/// Pagination is strictly sequential; a failing page aborts the logical
/// call and already-fetched pages are discarded.
pub(crate) async fn run_paginated_query(
    table: &Table,
    mut request: QueryRequest,
    load_all: bool,
) -> Result<OutputItems, Error> {
    let mut merged = OutputItems::default();
    loop {
        debug!(table = %table.name(), operation = "query", "sending request");
        let page = table
            .transport()
            .query(request.clone())
            .await
            .map_err(|e| table.transport_failure("query", e))?;

        let cursor = page.last_evaluated_key.clone();
        fold_page(&mut merged, page, table);

        match cursor {
            Some(key) if load_all => request.exclusive_start_key = Some(key),
            _ => break,
        }
    }
    Ok(merged)
}

/// Scan twin of [`run_paginated_query`]; also drives one parallel-scan
/// segment to exhaustion.
pub(crate) async fn run_paginated_scan(
    table: &Table,
    mut request: ScanRequest,
    load_all: bool,
) -> Result<OutputItems, Error> {
    let mut merged = OutputItems::default();
    loop {
        debug!(table = %table.name(), operation = "scan", segment = ?request.segment, "sending request");
        let page = table
            .transport()
            .scan(request.clone())
            .await
            .map_err(|e| table.transport_failure("scan", e))?;

        let cursor = page.last_evaluated_key.clone();
        fold_page(&mut merged, page, table);

        match cursor {
            Some(key) if load_all => request.exclusive_start_key = Some(key),
            _ => break,
        }
    }
    Ok(merged)
}
