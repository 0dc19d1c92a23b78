//! # Schema-aware DynamoDB document mapper
//!
//! A loosely-typed object model compiled into wire-correct DynamoDB request
//! fragments, and back. The heart of the crate is a small compiler:
//! placeholder-namespace management, operator-to-syntax mapping, recursive
//! type coercion, and paginated/segmented result reassembly. Around it sit
//! fluent query/scan/parallel-scan builders, batch-get fan-out with
//! unprocessed-key continuation, and a table component carrying schema
//! validation, interceptor chains and lifecycle operations.
//!
//! Physical calls go through the [`transport::Transport`] trait;
//! [`transport::SdkTransport`] drives the AWS SDK client, and tests script
//! their own implementations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dynamo_model::schema::{AttributeType, Schema};
//! use dynamo_model::table::Table;
//! use dynamo_model::transport::SdkTransport;
//! use dynamo_model::Error;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let schema = Schema::builder()
//!         .hash_key("user_id", AttributeType::String)
//!         .range_key("order_id", AttributeType::String)
//!         .attribute("total", AttributeType::Number)
//!         .required("total")
//!         .timestamps()
//!         .build()?;
//!
//!     let transport = Arc::new(SdkTransport::from_env().await);
//!     let orders = Table::new("orders", schema, transport);
//!
//!     let order = json!({"user_id": "u1", "order_id": "o1", "total": 19});
//!     let _ = orders
//!         .put_item(order.as_object().unwrap().clone(), Default::default())
//!         .await?;
//!
//!     let page = orders
//!         .query(json!("u1"))
//!         .where_key("order_id")
//!         .begins_with(json!("o"))
//!         .limit(10)
//!         .execute()
//!         .await?;
//!
//!     for item in &page.items {
//!         println!("{:?}", item.get("total"));
//!     }
//!     Ok(())
//! }
//! ```
#![deny(
    warnings,
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results,
    deprecated,
    unknown_lints,
    unreachable_code,
    unused_mut
)]

mod error;
pub use error::{Error, TransportError};

/// Value ⇄ typed-attribute conversion.
pub mod codec;

/// Condition and update expression compilation.
pub mod expression;

/// Entity representation and constructor strategy.
pub mod item;

/// Composite key construction.
pub mod key;

/// Explicit registry of named models.
pub mod registry;

/// Table shape declaration and validation oracle.
pub mod schema;

/// The table component and its request builders.
pub mod table;

/// The request/response boundary to the backing store.
pub mod transport;

pub use item::{Item, ItemFactory};
pub use registry::ModelRegistry;
pub use schema::{AttributeType, IndexDefinition, Schema, SchemaBuilder};
pub use table::{OutputItems, Query, Scan, Table};
