//! GraphQL API
//!
//! The single API surface of the CRM backend: customers, products and orders
//! with create mutations and filtered, cursor-paginated list queries.
//!
//! Queries and mutations live in per-entity modules under `queries/` and
//! `mutations/`; each defines a `#[derive(Default)]` struct with an
//! `#[Object]` impl, merged into the roots in `schema.rs`.

pub mod filters;
pub mod global_id;
pub mod helpers;
pub mod http;
pub mod loaders;
pub mod mutations;
pub mod ordering;
pub mod pagination;
pub mod queries;
mod schema;
pub mod types;

pub use helpers::GraphqlSettings;
pub use schema::{CrmSchema, MutationRoot, QueryRoot, build_schema};
