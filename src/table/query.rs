//! Fluent query builder.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Error;
use crate::expression::{build_filter_expression, ConditionOperator, FilterExpression};
use crate::key;
use crate::table::conditions::{ConditionReceiver, FilterCondition};
use crate::table::helpers::{merge_condition, run_paginated_query};
use crate::table::types::OutputItems;
use crate::table::Table;
use crate::transport::{AttributeMap, QueryRequest};

/// Accumulates a query request through fluent calls, then executes it.
///
/// Conditions issued through [`Query::where_key`] land in the key-condition
/// expression; conditions issued through [`Query::filter`] land in the
/// filter expression. The hash-key equality condition is compiled at
/// execution time against the primary hash attribute, or the hash
/// attribute of the global index selected by [`Query::using_index`].
///
/// A builder is exclusively owned by the logical call that constructed it;
/// it is not meant to be shared across tasks.
#[derive(Debug)]
pub struct Query<'a> {
    table: &'a Table,
    hash_key: Value,
    request: QueryRequest,
    load_all: bool,
}

impl<'a> Query<'a> {
    pub(crate) fn new(table: &'a Table, hash_key: Value) -> Self {
        Self {
            table,
            hash_key,
            request: QueryRequest::default(),
            load_all: false,
        }
    }

    /// Address a secondary index instead of the primary key.
    pub fn using_index(mut self, index_name: impl Into<String>) -> Self {
        self.request.index_name = Some(index_name.into());
        self
    }

    /// Request a strongly-consistent read.
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.request.consistent_read = Some(consistent);
        self
    }

    /// Ascending sort-key order (the default).
    pub fn ascending(mut self) -> Self {
        self.request.scan_index_forward = Some(true);
        self
    }

    /// Descending sort-key order.
    pub fn descending(mut self) -> Self {
        self.request.scan_index_forward = Some(false);
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

    /// Page until the store returns no continuation cursor.
    pub fn load_all(mut self) -> Self {
        self.load_all = true;
        self
    }

    /// Attach a condition on a key attribute; it lands in the
    /// key-condition expression.
    pub fn where_key(self, path: impl Into<String>) -> KeyCondition<'a> {
        KeyCondition {
            query: self,
            path: path.into(),
        }
    }

    /// Attach a condition on a non-key attribute; it lands in the filter
    /// expression.
    pub fn filter(self, path: impl Into<String>) -> FilterCondition<Query<'a>> {
        FilterCondition::new(self, path.into())
    }

    /// Finalize into an immutable request, merging in the table name.
    /// Idempotent: rebuilding yields an equivalent request.
    pub fn build_request(&self) -> QueryRequest {
        let mut request = self.request.clone();
        request.table_name = self.table.name().to_string();
        request
    }

    /// Execute the query: compile the hash-key condition, then fetch one
    /// page or, with [`Query::load_all`], every page. A failing page
    /// aborts the call and discards pages already fetched.
    pub async fn execute(mut self) -> Result<OutputItems, Error> {
        let hash_condition = self.build_hash_key_condition();
        self.push_key_condition(hash_condition);

        let request = self.build_request();
        run_paginated_query(self.table, request, self.load_all).await
    }

    fn build_hash_key_condition(&self) -> FilterExpression {
        let mut key_name = self.table.schema().hash_key_name();
        if let Some(index_name) = &self.request.index_name {
            if let Some(index) = self.table.schema().global_indexes().get(index_name) {
                key_name = &index.hash_key_name;
            }
        }

        build_filter_expression(
            key_name,
            ConditionOperator::Equals,
            &self.existing_value_names(),
            Some(&self.hash_key),
            None,
        )
    }

    fn push_key_condition(&mut self, condition: FilterExpression) {
        merge_condition(
            &mut self.request.key_condition_expression,
            &mut self.request.expression_attribute_names,
            &mut self.request.expression_attribute_values,
            condition,
        );
    }
}

impl ConditionReceiver for Query<'_> {
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

/// Key-condition operator adapter returned by [`Query::where_key`].
#[derive(Debug)]
pub struct KeyCondition<'a> {
    query: Query<'a>,
    path: String,
}

impl<'a> KeyCondition<'a> {
    fn apply(
        mut self,
        operator: ConditionOperator,
        value1: Option<Value>,
        value2: Option<Value>,
    ) -> Query<'a> {
        let existing = self.query.existing_value_names();
        let condition = build_filter_expression(
            &self.path,
            operator,
            &existing,
            value1.as_ref(),
            value2.as_ref(),
        );
        self.query.push_key_condition(condition);
        self.query
    }

    /// `path = value`
    pub fn equals(self, value: Value) -> Query<'a> {
        self.apply(ConditionOperator::Equals, Some(value), None)
    }

    /// `path < value`
    pub fn lt(self, value: Value) -> Query<'a> {
        self.apply(ConditionOperator::LessThan, Some(value), None)
    }

    /// `path <= value`
    pub fn lte(self, value: Value) -> Query<'a> {
        self.apply(ConditionOperator::LessThanOrEquals, Some(value), None)
    }

    /// `path > value`
    pub fn gt(self, value: Value) -> Query<'a> {
        self.apply(ConditionOperator::GreaterThan, Some(value), None)
    }

    /// `path >= value`
    pub fn gte(self, value: Value) -> Query<'a> {
        self.apply(ConditionOperator::GreaterThanOrEquals, Some(value), None)
    }

    /// `begins_with(path, prefix)`
    pub fn begins_with(self, prefix: Value) -> Query<'a> {
        self.apply(ConditionOperator::BeginsWith, Some(prefix), None)
    }

    /// `path BETWEEN low AND high`
    pub fn between(self, low: Value, high: Value) -> Query<'a> {
        self.apply(ConditionOperator::Between, Some(low), Some(high))
    }
}
