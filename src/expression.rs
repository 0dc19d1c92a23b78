//! Condition/filter and update expression compilation.
//!
//! Expressions address attributes exclusively through `#name` placeholders
//! and literals through `:value` placeholders, so reserved words and exotic
//! attribute names never leak into statement text. Placeholder value names
//! are de-duplicated against the accumulating request by numeric suffixing.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;
use regex::Regex;
use serde_json::Value;

use crate::codec;
use crate::schema::Schema;

/// Operators accepted by condition and filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    /// `=`
    Equals,
    /// `<>`
    NotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEquals,
    /// `path BETWEEN v1 AND v2`
    Between,
    /// `path IN (v1, v2, ...)`, one placeholder per candidate
    In,
    /// `attribute_exists(path)`
    AttributeExists,
    /// `attribute_not_exists(path)`
    AttributeNotExists,
    /// `attribute_type(path, type)`
    AttributeType,
    /// `begins_with(path, prefix)`
    BeginsWith,
    /// `contains(path, operand)`
    Contains,
    /// `NOT contains(path, operand)`
    NotContains,
    /// `size(path)`
    Size,
}

impl ConditionOperator {
    /// Expression-syntax spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "=",
            ConditionOperator::NotEquals => "<>",
            ConditionOperator::LessThan => "<",
            ConditionOperator::LessThanOrEquals => "<=",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::GreaterThanOrEquals => ">=",
            ConditionOperator::Between => "BETWEEN",
            ConditionOperator::In => "IN",
            ConditionOperator::AttributeExists => "attribute_exists",
            ConditionOperator::AttributeNotExists => "attribute_not_exists",
            ConditionOperator::AttributeType => "attribute_type",
            ConditionOperator::BeginsWith => "begins_with",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "NOT contains",
            ConditionOperator::Size => "size",
        }
    }

    fn is_function(&self) -> bool {
        matches!(
            self,
            ConditionOperator::AttributeExists
                | ConditionOperator::AttributeNotExists
                | ConditionOperator::AttributeType
                | ConditionOperator::BeginsWith
                | ConditionOperator::Contains
                | ConditionOperator::NotContains
                | ConditionOperator::Size
        )
    }
}

/// A compiled condition: statement text plus the placeholder maps it
/// references. Every placeholder in `statement` is present in one of the
/// two maps.
#[derive(Debug, Clone, Default)]
pub struct FilterExpression {
    /// `#placeholder` → attribute name, one per path segment.
    pub attribute_names: HashMap<String, String>,
    /// `:placeholder` → serialized operand.
    pub attribute_values: HashMap<String, AttributeValue>,
    /// Statement text referencing the placeholders.
    pub statement: String,
}

/// Compile one condition over `path` into a [`FilterExpression`].
///
/// Dotted `path` segments each become their own `#segment` placeholder,
/// rejoined with dots so nested attributes are addressable. The value
/// placeholder is derived from the path and de-duplicated against
/// `existing_value_names` by appending `_2`, `_3`, ... until unique.
///
/// [`ConditionOperator::AttributeExists`] with no operand collapses to
/// `attribute_not_exists`; with an operand it renders `attribute_exists`
/// and the operand is dropped either way (existence checks carry no value).
pub fn build_filter_expression(
    path: &str,
    operator: ConditionOperator,
    existing_value_names: &[String],
    value1: Option<&Value>,
    value2: Option<&Value>,
) -> FilterExpression {
    if operator == ConditionOperator::In {
        return build_in_filter_expression(path, existing_value_names, value1);
    }

    let mut operator = operator;
    let mut value1 = value1;
    if operator == ConditionOperator::AttributeExists {
        if value1.is_none() {
            operator = ConditionOperator::AttributeNotExists;
        }
        value1 = None;
    }

    let segments: Vec<&str> = path.split('.').collect();
    let statement_path = placeholder_path(&segments);
    let value1_name = unique_value_name(path, existing_value_names);
    let mut taken = existing_value_names.to_vec();
    taken.push(value1_name.clone());
    let value2_name = unique_value_name(path, &taken);

    let statement = if operator.is_function() {
        if value1.is_some() {
            format!("{}({}, {})", operator.symbol(), statement_path, value1_name)
        } else {
            format!("{}({})", operator.symbol(), statement_path)
        }
    } else if operator == ConditionOperator::Between {
        format!("{statement_path} BETWEEN {value1_name} AND {value2_name}")
    } else {
        format!("{} {} {}", statement_path, operator.symbol(), value1_name)
    };

    let mut attribute_values = HashMap::new();
    if let Some(value) = value1 {
        let _ = attribute_values.insert(value1_name, codec::serialize_attribute(value, None));
    }
    if let Some(value) = value2 {
        let _ = attribute_values.insert(value2_name, codec::serialize_attribute(value, None));
    }

    FilterExpression {
        attribute_names: segment_names(&segments),
        attribute_values,
        statement,
    }
}

fn build_in_filter_expression(
    path: &str,
    existing_value_names: &[String],
    values: Option<&Value>,
) -> FilterExpression {
    let segments: Vec<&str> = path.split('.').collect();
    let statement_path = placeholder_path(&segments);

    let candidates: Vec<&Value> = match values {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
        None => Vec::new(),
    };

    let mut attribute_values = HashMap::new();
    let mut chosen: Vec<String> = Vec::new();
    for candidate in candidates {
        let mut taken = existing_value_names.to_vec();
        taken.extend(chosen.iter().cloned());
        let name = unique_value_name(path, &taken);
        let _ = attribute_values.insert(name.clone(), codec::serialize_attribute(candidate, None));
        chosen.push(name);
    }

    FilterExpression {
        attribute_names: segment_names(&segments),
        attribute_values,
        statement: format!("{} IN ({})", statement_path, chosen.join(",")),
    }
}

fn placeholder_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| format!("#{}", sanitize(segment)))
        .collect::<Vec<_>>()
        .join(".")
}

fn segment_names(segments: &[&str]) -> HashMap<String, String> {
    let mut names = HashMap::with_capacity(segments.len());
    for segment in segments {
        let _ = names.insert(format!("#{}", sanitize(segment)), (*segment).to_string());
    }
    names
}

fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn unique_value_name(path: &str, existing_value_names: &[String]) -> String {
    let cleaned = sanitize(&path.replace('.', "_"));
    let mut candidate = format!(":{cleaned}");
    let mut index = 1;
    while existing_value_names.iter().any(|name| name == &candidate) {
        index += 1;
        candidate = format!(":{cleaned}_{index}");
    }
    candidate
}

/// One attribute's operand in an update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperand {
    /// Overwrite the attribute (`SET`). A `null` or empty-string operand
    /// routes the attribute to `REMOVE` instead.
    Assign(Value),
    /// Numeric or set addition (`ADD`).
    Add(Value),
    /// Remove members from a set (`DELETE`).
    DeleteFromSet(Value),
}

impl From<Value> for UpdateOperand {
    fn from(value: Value) -> Self {
        UpdateOperand::Assign(value)
    }
}

impl UpdateOperand {
    /// Whether this operand routes its attribute to the REMOVE clause.
    pub fn is_removal(&self) -> bool {
        match self {
            UpdateOperand::Assign(Value::Null) => true,
            UpdateOperand::Assign(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }
}

/// An update body: attribute path → tagged operand. Key attributes may be
/// present; expression serialization strips them.
pub type UpdateItem = BTreeMap<String, UpdateOperand>;

/// The four update clause kinds, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    /// `SET name = value` assignments.
    Set,
    /// `ADD name value` additions.
    Add,
    /// `REMOVE name` removals.
    Remove,
    /// `DELETE name value` set-member deletions.
    Delete,
}

impl UpdateAction {
    /// All actions in the order clauses are emitted.
    pub const ALL: [UpdateAction; 4] = [
        UpdateAction::Set,
        UpdateAction::Add,
        UpdateAction::Remove,
        UpdateAction::Delete,
    ];

    /// Clause keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            UpdateAction::Set => "SET",
            UpdateAction::Add => "ADD",
            UpdateAction::Remove => "REMOVE",
            UpdateAction::Delete => "DELETE",
        }
    }
}

/// Clause fragments accumulated per update action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateClauses {
    set: Vec<String>,
    add: Vec<String>,
    remove: Vec<String>,
    delete: Vec<String>,
}

impl UpdateClauses {
    fn list_mut(&mut self, action: UpdateAction) -> &mut Vec<String> {
        match action {
            UpdateAction::Set => &mut self.set,
            UpdateAction::Add => &mut self.add,
            UpdateAction::Remove => &mut self.remove,
            UpdateAction::Delete => &mut self.delete,
        }
    }

    /// Fragments of one clause.
    pub fn get(&self, action: UpdateAction) -> &[String] {
        match action {
            UpdateAction::Set => &self.set,
            UpdateAction::Add => &self.add,
            UpdateAction::Remove => &self.remove,
            UpdateAction::Delete => &self.delete,
        }
    }

    /// Append one fragment to a clause.
    pub fn push(&mut self, action: UpdateAction, fragment: String) {
        self.list_mut(action).push(fragment);
    }

    /// Append fragments to a clause.
    pub fn extend(&mut self, action: UpdateAction, fragments: Vec<String>) {
        self.list_mut(action).extend(fragments);
    }

    /// Whether no clause holds any fragment.
    pub fn is_empty(&self) -> bool {
        UpdateAction::ALL.iter().all(|a| self.get(*a).is_empty())
    }

    /// Emit the final expression: only non-empty clauses, each as
    /// `KEYWORD frag, frag`, space-joined in SET/ADD/REMOVE/DELETE order.
    pub fn stringify(&self) -> String {
        let mut parts = Vec::new();
        for action in UpdateAction::ALL {
            let fragments = self.get(action);
            if !fragments.is_empty() {
                parts.push(format!("{} {}", action.keyword(), fragments.join(", ")));
            }
        }
        parts.join(" ")
    }
}

/// A compiled update expression: clause lists plus the placeholder maps
/// their fragments reference.
#[derive(Debug, Clone, Default)]
pub struct SerializedUpdate {
    /// Clause fragments per action.
    pub clauses: UpdateClauses,
    /// `#placeholder` → attribute name.
    pub attribute_names: HashMap<String, String>,
    /// `:placeholder` → serialized operand.
    pub attribute_values: HashMap<String, AttributeValue>,
}

impl SerializedUpdate {
    /// Merge a caller-supplied raw expression fragment into this one.
    ///
    /// Parsed clause lists are appended after the compiled ones; the
    /// caller's placeholder maps take precedence on conflicts. A raw string
    /// the parser cannot decompose contributes nothing: lenient merging,
    /// not validation.
    pub fn merge_raw(&mut self, raw: &RawUpdateExpression) {
        if let Some(expression) = &raw.expression {
            let parsed = parse_update_expression(expression);
            for action in UpdateAction::ALL {
                let fragments = parsed.get(action);
                if !fragments.is_empty() {
                    self.clauses.extend(action, fragments.to_vec());
                }
            }
        }
        for (name, value) in &raw.attribute_names {
            let _ = self.attribute_names.insert(name.clone(), value.clone());
        }
        for (name, value) in &raw.attribute_values {
            let _ = self.attribute_values.insert(name.clone(), value.clone());
        }
    }
}

/// Caller-supplied raw update-expression fragment, merged into the compiled
/// expression at request-build time.
#[derive(Debug, Clone, Default)]
pub struct RawUpdateExpression {
    /// Raw expression text (`"SET #a = :a ADD ..."`).
    pub expression: Option<String>,
    /// Placeholder names referenced by the raw text.
    pub attribute_names: HashMap<String, String>,
    /// Placeholder values referenced by the raw text.
    pub attribute_values: HashMap<String, AttributeValue>,
}

/// Compile an update body into clause lists and placeholder maps.
///
/// Primary-key attributes are stripped first; keys are never part of an
/// update body. Remaining attributes route per operand: removals (null or
/// empty-string assignment) to REMOVE by name placeholder only, additions
/// to ADD, set-member deletions to DELETE, everything else to SET. Operand
/// values serialize under the schema's declared type for their path.
pub fn serialize_update_expression(schema: &Schema, item: &UpdateItem) -> SerializedUpdate {
    let datatypes = schema.datatypes();
    let mut serialized = SerializedUpdate::default();

    for (name, operand) in item {
        if schema.is_key_attribute(name) {
            continue;
        }

        let name_key = format!("#{name}");
        let value_key = format!(":{name}");
        let _ = serialized
            .attribute_names
            .insert(name_key.clone(), name.clone());

        match operand {
            UpdateOperand::Assign(_) if operand.is_removal() => {
                serialized.clauses.push(UpdateAction::Remove, name_key);
            }
            UpdateOperand::Add(value) => {
                serialized
                    .clauses
                    .push(UpdateAction::Add, format!("{name_key} {value_key}"));
                let _ = serialized
                    .attribute_values
                    .insert(value_key, codec::serialize_attribute(value, datatypes.get(name)));
            }
            UpdateOperand::DeleteFromSet(value) => {
                serialized
                    .clauses
                    .push(UpdateAction::Delete, format!("{name_key} {value_key}"));
                let _ = serialized
                    .attribute_values
                    .insert(value_key, codec::serialize_attribute(value, datatypes.get(name)));
            }
            UpdateOperand::Assign(value) => {
                serialized
                    .clauses
                    .push(UpdateAction::Set, format!("{name_key} = {value_key}"));
                let _ = serialized
                    .attribute_values
                    .insert(value_key, codec::serialize_attribute(value, datatypes.get(name)));
            }
        }
    }

    serialized
}

/// Decompose a raw update expression into per-keyword clause lists.
///
/// Each keyword's pattern captures everything up to the next keyword or end
/// of string; operands split on top-level commas (commas inside parentheses
/// are not split points). A keyword with no match contributes an empty
/// list.
pub fn parse_update_expression(raw: &str) -> UpdateClauses {
    let mut clauses = UpdateClauses::default();
    for action in UpdateAction::ALL {
        let pattern = Regex::new(&format!(
            r"{}\s*(.+?)\s*(SET|ADD|REMOVE|DELETE|$)",
            action.keyword()
        ))
        .expect("keyword patterns are statically valid");

        if let Some(captures) = pattern.captures(raw) {
            if let Some(body) = captures.get(1) {
                clauses.extend(action, split_operands(body.as_str()));
            }
        }
    }
    clauses
}

fn split_operands(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut current = String::new();

    for c in body.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeType, Schema};
    use serde_json::json;

    fn no_names() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_equals_on_flat_path() {
        let fe = build_filter_expression(
            "name",
            ConditionOperator::Equals,
            &no_names(),
            Some(&json!("alice")),
            None,
        );
        assert_eq!(fe.statement, "#name = :name");
        assert_eq!(fe.attribute_names.get("#name"), Some(&"name".to_string()));
        assert_eq!(
            fe.attribute_values.get(":name"),
            Some(&AttributeValue::S("alice".into()))
        );
    }

    #[test]
    fn test_dotted_path_gets_one_placeholder_per_segment() {
        let fe = build_filter_expression(
            "address.city.zip",
            ConditionOperator::Equals,
            &no_names(),
            Some(&json!("123")),
            None,
        );
        assert_eq!(fe.statement, "#address.#city.#zip = :address_city_zip");
        assert_eq!(fe.attribute_names.len(), 3);
        assert_eq!(fe.attribute_names.get("#city"), Some(&"city".to_string()));
    }

    #[test]
    fn test_collision_suffixing() {
        let existing = vec![":age".to_string()];
        let fe = build_filter_expression(
            "age",
            ConditionOperator::Equals,
            &existing,
            Some(&json!(30)),
            None,
        );
        assert_eq!(fe.statement, "#age = :age_2");
        assert!(fe.attribute_values.contains_key(":age_2"));

        let existing = vec![":age".to_string(), ":age_2".to_string()];
        let fe = build_filter_expression(
            "age",
            ConditionOperator::Equals,
            &existing,
            Some(&json!(30)),
            None,
        );
        assert_eq!(fe.statement, "#age = :age_3");
    }

    #[test]
    fn test_between_renders_both_operands() {
        let fe = build_filter_expression(
            "age",
            ConditionOperator::Between,
            &no_names(),
            Some(&json!(18)),
            Some(&json!(65)),
        );
        assert_eq!(fe.statement, "#age BETWEEN :age AND :age_2");
        assert_eq!(
            fe.attribute_values.get(":age"),
            Some(&AttributeValue::N("18".into()))
        );
        assert_eq!(
            fe.attribute_values.get(":age_2"),
            Some(&AttributeValue::N("65".into()))
        );
    }

    #[test]
    fn test_function_operator_with_value() {
        let fe = build_filter_expression(
            "name",
            ConditionOperator::BeginsWith,
            &no_names(),
            Some(&json!("al")),
            None,
        );
        assert_eq!(fe.statement, "begins_with(#name, :name)");
    }

    #[test]
    fn test_not_contains_renders_negated_function() {
        let fe = build_filter_expression(
            "tags",
            ConditionOperator::NotContains,
            &no_names(),
            Some(&json!("spam")),
            None,
        );
        assert_eq!(fe.statement, "NOT contains(#tags, :tags)");
    }

    #[test]
    fn test_attribute_exists_collapses_without_value() {
        let fe = build_filter_expression(
            "email",
            ConditionOperator::AttributeExists,
            &no_names(),
            None,
            None,
        );
        assert_eq!(fe.statement, "attribute_not_exists(#email)");
        assert!(fe.attribute_values.is_empty());

        let fe = build_filter_expression(
            "email",
            ConditionOperator::AttributeExists,
            &no_names(),
            Some(&json!(true)),
            None,
        );
        assert_eq!(fe.statement, "attribute_exists(#email)");
        assert!(fe.attribute_values.is_empty());
    }

    #[test]
    fn test_in_gives_each_candidate_a_placeholder() {
        let fe = build_filter_expression(
            "status",
            ConditionOperator::In,
            &no_names(),
            Some(&json!(["open", "closed", "stale"])),
            None,
        );
        assert_eq!(fe.statement, "#status IN (:status,:status_2,:status_3)");
        assert_eq!(fe.attribute_values.len(), 3);
        assert_eq!(
            fe.attribute_values.get(":status_2"),
            Some(&AttributeValue::S("closed".into()))
        );
    }

    #[test]
    fn test_in_respects_existing_names() {
        let existing = vec![":status".to_string()];
        let fe = build_filter_expression(
            "status",
            ConditionOperator::In,
            &existing,
            Some(&json!(["a", "b"])),
            None,
        );
        assert_eq!(fe.statement, "#status IN (:status_2,:status_3)");
    }

    fn update_schema() -> Schema {
        Schema::builder()
            .hash_key("id", AttributeType::String)
            .attribute("score", AttributeType::Number)
            .attribute("tags", AttributeType::StringSet)
            .build()
            .unwrap()
    }

    #[test]
    fn test_update_expression_routing() {
        let schema = update_schema();
        let mut item = UpdateItem::new();
        let _ = item.insert("id".into(), UpdateOperand::Assign(json!("k")));
        let _ = item.insert("name".into(), UpdateOperand::Assign(json!(null)));
        let _ = item.insert("score".into(), UpdateOperand::Add(json!(5)));

        let serialized = serialize_update_expression(&schema, &item);

        assert_eq!(serialized.clauses.get(UpdateAction::Remove), ["#name"]);
        assert_eq!(serialized.clauses.get(UpdateAction::Add), ["#score :score"]);
        assert!(serialized.clauses.get(UpdateAction::Set).is_empty());
        assert_eq!(
            serialized.attribute_values.get(":score"),
            Some(&AttributeValue::N("5".into()))
        );
        // The hash key never appears in any clause or map.
        assert!(!serialized.attribute_names.contains_key("#id"));
        assert!(serialized.clauses.stringify().find("id").is_none());
    }

    #[test]
    fn test_empty_string_routes_to_remove() {
        let schema = update_schema();
        let mut item = UpdateItem::new();
        let _ = item.insert("nickname".into(), UpdateOperand::Assign(json!("")));

        let serialized = serialize_update_expression(&schema, &item);
        assert_eq!(serialized.clauses.get(UpdateAction::Remove), ["#nickname"]);
        assert!(serialized.attribute_values.is_empty());
    }

    #[test]
    fn test_delete_from_set_serializes_by_declared_type() {
        let schema = update_schema();
        let mut item = UpdateItem::new();
        let _ = item.insert("tags".into(), UpdateOperand::DeleteFromSet(json!(["old"])));

        let serialized = serialize_update_expression(&schema, &item);
        assert_eq!(serialized.clauses.get(UpdateAction::Delete), ["#tags :tags"]);
        assert_eq!(
            serialized.attribute_values.get(":tags"),
            Some(&AttributeValue::Ss(vec!["old".into()]))
        );
    }

    #[test]
    fn test_stringify_order_and_omission() {
        let mut clauses = UpdateClauses::default();
        clauses.push(UpdateAction::Set, "#a :a".into());
        clauses.push(UpdateAction::Remove, "#b".into());
        assert_eq!(clauses.stringify(), "SET #a :a REMOVE #b");

        let empty = UpdateClauses::default();
        assert_eq!(empty.stringify(), "");
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_decomposes_all_keywords() {
        let parsed =
            parse_update_expression("SET #a = :a, #b = :b ADD #c :c REMOVE #d DELETE #e :e");
        assert_eq!(parsed.get(UpdateAction::Set), ["#a = :a", "#b = :b"]);
        assert_eq!(parsed.get(UpdateAction::Add), ["#c :c"]);
        assert_eq!(parsed.get(UpdateAction::Remove), ["#d"]);
        assert_eq!(parsed.get(UpdateAction::Delete), ["#e :e"]);
    }

    #[test]
    fn test_parse_keeps_parenthesized_commas_together() {
        let parsed = parse_update_expression("SET #a = if_not_exists(#a, :zero), #b = :b");
        assert_eq!(
            parsed.get(UpdateAction::Set),
            ["#a = if_not_exists(#a, :zero)", "#b = :b"]
        );
    }

    #[test]
    fn test_parse_is_lenient_on_garbage() {
        let parsed = parse_update_expression("not an expression at all");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_merge_raw_appends_and_overrides() {
        let schema = update_schema();
        let mut item = UpdateItem::new();
        let _ = item.insert("score".into(), UpdateOperand::Assign(json!(1)));
        let mut serialized = serialize_update_expression(&schema, &item);

        let mut raw = RawUpdateExpression {
            expression: Some("ADD #extra :extra".into()),
            ..Default::default()
        };
        let _ = raw.attribute_names.insert("#extra".into(), "extra".into());
        let _ = raw
            .attribute_values
            .insert(":score".into(), AttributeValue::N("99".into()));

        serialized.merge_raw(&raw);

        assert_eq!(
            serialized.clauses.stringify(),
            "SET #score = :score ADD #extra :extra"
        );
        // Caller-supplied values win on conflict.
        assert_eq!(
            serialized.attribute_values.get(":score"),
            Some(&AttributeValue::N("99".into()))
        );
        assert_eq!(
            serialized.attribute_names.get("#extra"),
            Some(&"extra".to_string())
        );
    }
}
