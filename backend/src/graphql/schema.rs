//! GraphQL schema definition
//!
//! Query and mutation roots are merged from the per-entity modules under
//! `queries/` and `mutations/`.

use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use super::helpers::GraphqlSettings;
use super::loaders::Loaders;
use super::mutations::{CustomerMutations, OrderMutations, ProductMutations};
use super::queries::{CustomerQueries, NodeQueries, OrderQueries, ProductQueries, SystemQueries};
use crate::db::Database;
use crate::services::{CustomerService, OrderService, ProductService};

/// The GraphQL schema type
pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    SystemQueries,
    NodeQueries,
    CustomerQueries,
    ProductQueries,
    OrderQueries,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(CustomerMutations, ProductMutations, OrderMutations);

/// Build the GraphQL schema with all resolvers, services and data loaders
pub fn build_schema(db: Database, settings: GraphqlSettings) -> CrmSchema {
    let loaders = Loaders::new(&db);

    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .extension(Tracing)
        .data(settings)
        .data(CustomerService::new(db.clone()))
        .data(ProductService::new(db.clone()))
        .data(OrderService::new(db.clone()))
        .data(loaders.customers)
        .data(loaders.orders_by_customer)
        .data(loaders.products_by_order)
        .data(db)
        .finish()
}
