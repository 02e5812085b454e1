pub mod customers;
pub mod orders;
pub mod products;

pub use customers::CustomerMutations;
pub use orders::OrderMutations;
pub use products::ProductMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::{
        CustomerService, MutationOutcome, OrderService, ProductService,
    };
}
