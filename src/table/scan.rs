//! Fluent scan and parallel-scan builders.

use std::collections::HashMap;

use futures_util::{StreamExt, TryStreamExt};
use serde_json::Value;
use tokio_stream as stream;

use crate::error::Error;
use crate::expression::FilterExpression;
use crate::key;
use crate::table::conditions::{ConditionReceiver, FilterCondition};
use crate::table::helpers::{merge_condition, run_paginated_scan};
use crate::table::types::OutputItems;
use crate::table::Table;
use crate::transport::{AttributeMap, ScanRequest};

/// Accumulates a scan request through fluent calls, then executes it.
///
/// A builder is exclusively owned by the logical call that constructed it;
/// it is not meant to be shared across tasks.
#[derive(Debug)]
pub struct Scan<'a> {
    table: &'a Table,
    request: ScanRequest,
    load_all: bool,
}

impl<'a> Scan<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            request: ScanRequest::default(),
            load_all: false,
        }
    }

    /// Scan a secondary index instead of the base table.
    pub fn using_index(mut self, index_name: impl Into<String>) -> Self {
        self.request.index_name = Some(index_name.into());
        self
    }

    /// Request a strongly-consistent read.
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.request.consistent_read = Some(consistent);
        self
    }

    /// Cap the page size. Non-positive limits are rejected and ignored.
    pub fn limit(mut self, limit: i32) -> Self {
        if limit <= 0 {
            tracing::error!(limit, "limit must be greater than 0, ignoring");
        } else {
            self.request.limit = Some(limit);
        }
        self
    }

    /// Narrow the returned attributes, addressing each through a `#name`
    /// placeholder.
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut paths = Vec::new();
        for attribute in attributes {
            let attribute = attribute.into();
            let placeholder = format!("#{attribute}");
            let _ = self
                .request
                .expression_attribute_names
                .entry(placeholder.clone())
                .or_insert(attribute);
            paths.push(placeholder);
        }
        self.request.projection_expression = Some(paths.join(","));
        self
    }

    /// Supply a raw filter expression verbatim.
    pub fn filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.request.filter_expression = Some(expression.into());
        self
    }

    /// Supply a raw projection expression verbatim.
    pub fn projection_expression(mut self, expression: impl Into<String>) -> Self {
        self.request.projection_expression = Some(expression.into());
        self
    }

    /// Merge caller-supplied value placeholders into the request.
    pub fn expression_attribute_values(mut self, values: AttributeMap) -> Self {
        self.request.expression_attribute_values.extend(values);
        self
    }

    /// Merge caller-supplied name placeholders into the request.
    pub fn expression_attribute_names(mut self, names: HashMap<String, String>) -> Self {
        self.request.expression_attribute_names.extend(names);
        self
    }

    /// Resume after a previous page's cursor, built from key values.
    pub fn start_key(mut self, hash_key: &Value, range_key: Option<&Value>) -> Result<Self, Error> {
        self.request.exclusive_start_key =
            Some(key::build_key(self.table.schema(), hash_key, range_key)?);
        Ok(self)
    }

    /// Resume after a previous page's cursor, as returned in
    /// [`OutputItems::last_evaluated_key`].
    pub fn start_key_map(mut self, cursor: AttributeMap) -> Self {
        self.request.exclusive_start_key = Some(cursor);
        self
    }

    /// Restrict this scan to one segment of a segmented table walk.
    pub fn segments(mut self, segment: i32, total_segments: i32) -> Self {
        self.request.segment = Some(segment);
        self.request.total_segments = Some(total_segments);
        self
    }

    /// Page until the store returns no continuation cursor.
    pub fn load_all(mut self) -> Self {
        self.load_all = true;
        self
    }

    /// Attach a condition on an attribute; it lands in the filter
    /// expression.
    pub fn filter(self, path: impl Into<String>) -> FilterCondition<Scan<'a>> {
        FilterCondition::new(self, path.into())
    }

    /// Finalize into an immutable request, merging in the table name.
    /// Idempotent: rebuilding yields an equivalent request.
    pub fn build_request(&self) -> ScanRequest {
        let mut request = self.request.clone();
        request.table_name = self.table.name().to_string();
        request
    }

    /// Execute the scan: fetch one page or, with [`Scan::load_all`],
    /// every page. A failing page aborts the call and discards pages
    /// already fetched.
    pub async fn execute(self) -> Result<OutputItems, Error> {
        let request = self.build_request();
        run_paginated_scan(self.table, request, self.load_all).await
    }
}

impl ConditionReceiver for Scan<'_> {
    fn existing_value_names(&self) -> Vec<String> {
        self.request
            .expression_attribute_values
            .keys()
            .cloned()
            .collect()
    }

    fn push_filter_condition(&mut self, condition: FilterExpression) {
        merge_condition(
            &mut self.request.filter_expression,
            &mut self.request.expression_attribute_names,
            &mut self.request.expression_attribute_values,
            condition,
        );
    }
}

/// Fans one scan out over independent segments executed concurrently.
///
/// Each segment deep-copies the base request, carries a distinct
/// `(segment, total_segments)` pair and pages to exhaustion before
/// contributing to the merged result. Merging is a pure reduction over
/// completed segment outputs: counts and capacity sum, item lists
/// concatenate in completion order.
#[derive(Debug)]
pub struct ParallelScan<'a> {
    scan: Scan<'a>,
    total_segments: usize,
}

impl<'a> ParallelScan<'a> {
    pub(crate) fn new(table: &'a Table, total_segments: usize) -> Self {
        Self {
            scan: Scan::new(table),
            total_segments,
        }
    }

    /// Cap the page size of each segment's physical calls.
    pub fn limit(mut self, limit: i32) -> Self {
        self.scan = self.scan.limit(limit);
        self
    }

    /// Narrow the returned attributes for every segment.
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scan = self.scan.attributes(attributes);
        self
    }

    /// Supply a raw filter expression shared by every segment.
    pub fn filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.scan = self.scan.filter_expression(expression);
        self
    }

    /// Merge caller-supplied value placeholders into the shared request.
    pub fn expression_attribute_values(mut self, values: AttributeMap) -> Self {
        self.scan = self.scan.expression_attribute_values(values);
        self
    }

    /// Merge caller-supplied name placeholders into the shared request.
    pub fn expression_attribute_names(mut self, names: HashMap<String, String>) -> Self {
        self.scan = self.scan.expression_attribute_names(names);
        self
    }

    /// Attach a condition shared by every segment.
    pub fn filter(self, path: impl Into<String>) -> FilterCondition<ParallelScan<'a>> {
        FilterCondition::new(self, path.into())
    }

    /// Execute all segments concurrently and merge their outputs. Any
    /// segment failure rejects the whole call.
    pub async fn execute(self) -> Result<OutputItems, Error> {
        let base = self.scan.build_request();
        let table = self.scan.table;
        let total = self.total_segments.max(1);

        let segment_calls = (0..total).map(|segment| {
            let mut request = base.clone();
            request.segment = Some(segment as i32);
            request.total_segments = Some(total as i32);
            run_paginated_scan(table, request, true)
        });

        stream::iter(segment_calls)
            .buffer_unordered(total)
            .try_fold(OutputItems::default(), |mut merged, output| async move {
                merged.count += output.count;
                merged.scanned_count += output.scanned_count;
                if let Some(units) = output.consumed_capacity {
                    merged.consumed_capacity =
                        Some(merged.consumed_capacity.unwrap_or(0.0) + units);
                }
                merged.items.extend(output.items);
                if output.last_evaluated_key.is_some() {
                    merged.last_evaluated_key = output.last_evaluated_key;
                }
                Ok(merged)
            })
            .await
    }
}

impl ConditionReceiver for ParallelScan<'_> {
    fn existing_value_names(&self) -> Vec<String> {
        self.scan.existing_value_names()
    }

    fn push_filter_condition(&mut self, condition: FilterExpression) {
        self.scan.push_filter_condition(condition);
    }
}
