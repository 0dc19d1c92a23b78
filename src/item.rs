//! Entity representation and the constructor strategy for materializing it.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// An entity materialized from a table row: a loosely-typed attribute
/// document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    attributes: Map<String, Value>,
}

impl Item {
    /// Wrap an attribute document.
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// One attribute by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Consume the entity, yielding its attributes.
    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }
}

/// Caller-supplied entity constructor, for polymorphic entity construction.
pub type ItemFactory = Arc<dyn Fn(Map<String, Value>) -> Item + Send + Sync>;

/// Constructor strategy selected once at table setup and held immutably:
/// either the default entity type or a caller-supplied factory.
#[derive(Clone, Default)]
pub(crate) enum ItemConstructor {
    #[default]
    Plain,
    Factory(ItemFactory),
}

impl ItemConstructor {
    pub(crate) fn construct(&self, attributes: Map<String, Value>) -> Item {
        match self {
            ItemConstructor::Plain => Item::new(attributes),
            ItemConstructor::Factory(factory) => factory(attributes),
        }
    }
}

impl fmt::Debug for ItemConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemConstructor::Plain => f.write_str("ItemConstructor::Plain"),
            ItemConstructor::Factory(_) => f.write_str("ItemConstructor::Factory(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_accessors() {
        let attributes = json!({"id": "a", "score": 2});
        let item = Item::new(attributes.as_object().unwrap().clone());
        assert_eq!(item.get("id"), Some(&json!("a")));
        assert_eq!(item.get("missing"), None);
        assert_eq!(Value::Object(item.into_attributes()), attributes);
    }

    #[test]
    fn test_factory_strategy() {
        let factory: ItemFactory = Arc::new(|mut attributes| {
            let _ = attributes.insert("materialized".to_string(), json!(true));
            Item::new(attributes)
        });
        let constructor = ItemConstructor::Factory(factory);
        let item = constructor.construct(json!({"id": "a"}).as_object().unwrap().clone());
        assert_eq!(item.get("materialized"), Some(&json!(true)));

        let plain = ItemConstructor::Plain
            .construct(json!({"id": "a"}).as_object().unwrap().clone());
        assert_eq!(plain.get("materialized"), None);
    }
}
