pub mod customers;
pub mod node;
pub mod orders;
pub mod products;
pub mod system;

pub use customers::CustomerQueries;
pub use node::NodeQueries;
pub use orders::OrderQueries;
pub use products::ProductQueries;
pub use system::SystemQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, ID, Object, Result};

    pub(crate) use crate::db::*;
    pub(crate) use crate::graphql::filters::*;
    pub(crate) use crate::graphql::global_id::NodeKind;
    pub(crate) use crate::graphql::helpers::*;
    pub(crate) use crate::graphql::ordering::parse_order_by;
    pub(crate) use crate::graphql::pagination::{Connection, ConnectionArgs};
    pub(crate) use crate::graphql::types::*;
}
