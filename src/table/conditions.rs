//! Fluent operator adapters attaching compiled conditions to builders.

use serde_json::Value;

use crate::expression::{build_filter_expression, ConditionOperator, FilterExpression};

/// Request builders that accept compiled filter conditions.
pub trait ConditionReceiver: Sized {
    /// Value-placeholder names already referenced by the accumulating
    /// request, fed back into the compiler so new placeholders suffix
    /// instead of overwriting.
    fn existing_value_names(&self) -> Vec<String>;

    /// Merge a compiled condition into the request's filter expression.
    fn push_filter_condition(&mut self, condition: FilterExpression);
}

/// Operator adapter over one attribute path, returned by a builder's
/// `filter` method. Each operator compiles a condition and hands the
/// builder back.
#[derive(Debug)]
pub struct FilterCondition<B> {
    builder: B,
    path: String,
}

impl<B: ConditionReceiver> FilterCondition<B> {
    pub(crate) fn new(builder: B, path: String) -> Self {
        Self { builder, path }
    }

    fn apply(
        mut self,
        operator: ConditionOperator,
        value1: Option<Value>,
        value2: Option<Value>,
    ) -> B {
        let existing = self.builder.existing_value_names();
        let condition = build_filter_expression(
            &self.path,
            operator,
            &existing,
            value1.as_ref(),
            value2.as_ref(),
        );
        self.builder.push_filter_condition(condition);
        self.builder
    }

    /// `path = value`
    pub fn equals(self, value: Value) -> B {
        self.apply(ConditionOperator::Equals, Some(value), None)
    }

    /// `path <> value`
    pub fn ne(self, value: Value) -> B {
        self.apply(ConditionOperator::NotEquals, Some(value), None)
    }

    /// `path < value`
    pub fn lt(self, value: Value) -> B {
        self.apply(ConditionOperator::LessThan, Some(value), None)
    }

    /// `path <= value`
    pub fn lte(self, value: Value) -> B {
        self.apply(ConditionOperator::LessThanOrEquals, Some(value), None)
    }

    /// `path > value`
    pub fn gt(self, value: Value) -> B {
        self.apply(ConditionOperator::GreaterThan, Some(value), None)
    }

    /// `path >= value`
    pub fn gte(self, value: Value) -> B {
        self.apply(ConditionOperator::GreaterThanOrEquals, Some(value), None)
    }

    /// `attribute_exists(path)`
    pub fn exists(self) -> B {
        self.apply(
            ConditionOperator::AttributeExists,
            Some(Value::Bool(true)),
            None,
        )
    }

    /// `attribute_not_exists(path)`
    pub fn null(self) -> B {
        self.apply(ConditionOperator::AttributeNotExists, None, None)
    }

    /// `contains(path, value)`
    pub fn contains(self, value: Value) -> B {
        self.apply(ConditionOperator::Contains, Some(value), None)
    }

    /// `NOT contains(path, value)`
    pub fn not_contains(self, value: Value) -> B {
        self.apply(ConditionOperator::NotContains, Some(value), None)
    }

    /// `begins_with(path, prefix)`
    pub fn begins_with(self, prefix: Value) -> B {
        self.apply(ConditionOperator::BeginsWith, Some(prefix), None)
    }

    /// `path BETWEEN low AND high`
    pub fn between(self, low: Value, high: Value) -> B {
        self.apply(ConditionOperator::Between, Some(low), Some(high))
    }

    /// `path IN (candidates...)`, one placeholder per candidate.
    pub fn in_list(self, candidates: Vec<Value>) -> B {
        self.apply(ConditionOperator::In, Some(Value::Array(candidates)), None)
    }
}
