use super::prelude::*;
use crate::graphql::global_id::decode_global_id;

#[derive(Default)]
pub struct NodeQueries;

#[Object]
impl NodeQueries {
    /// Fetch any object by its global ID
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let Some((kind, pk)) = decode_global_id(&id) else {
            return Ok(None);
        };
        let db = ctx.data_unchecked::<Database>();

        let node = match kind {
            NodeKind::Customer => db.customers().get_by_id(pk).await?.map(|r| Node::Customer(r.into())),
            NodeKind::Product => db.products().get_by_id(pk).await?.map(|r| Node::Product(r.into())),
            NodeKind::Order => db.orders().get_by_id(pk).await?.map(|r| Node::Order(r.into())),
        };
        Ok(node)
    }
}
