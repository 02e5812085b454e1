// Helper functions shared across GraphQL query/mutation modules.

use async_graphql::{Context, ID};

use super::global_id::{NodeKind, decode_global_id};

/// Schema-wide GraphQL settings, registered as schema data
#[derive(Debug, Clone, Copy)]
pub struct GraphqlSettings {
    /// Largest page a connection field returns
    pub max_page_size: i64,
}

impl Default for GraphqlSettings {
    fn default() -> Self {
        Self { max_page_size: 100 }
    }
}

/// The configured maximum page size
pub(crate) fn max_page_size(ctx: &Context<'_>) -> i64 {
    ctx.data_opt::<GraphqlSettings>()
        .copied()
        .unwrap_or_default()
        .max_page_size
}

/// Primary key of a global ID, if it names an entity of `kind`
pub(crate) fn node_pk(id: &ID, kind: NodeKind) -> Option<i64> {
    match decode_global_id(id)? {
        (decoded, pk) if decoded == kind => Some(pk),
        _ => None,
    }
}
