//! Explicit registry of named models.
//!
//! Components needing lookups by name take the registry by reference; there
//! is deliberately no process-wide mutable singleton.

use std::collections::HashMap;
use std::sync::Arc;

use crate::table::Table;

/// Name → table handle map, owned by the caller and passed by reference.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    tables: HashMap<String, Arc<Table>>,
}

impl ModelRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its effective name, returning the shared
    /// handle. A later definition under the same name replaces the earlier
    /// one.
    pub fn define(&mut self, table: Table) -> Arc<Table> {
        let handle = Arc::new(table);
        let _ = self
            .tables
            .insert(handle.name().to_string(), Arc::clone(&handle));
        handle
    }

    /// Look up a table by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.get(name)
    }

    /// Remove a table by name, returning its handle when it was present.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Table>> {
        self.tables.remove(name)
    }

    /// Names of every registered table.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}
