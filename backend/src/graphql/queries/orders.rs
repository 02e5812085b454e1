use super::prelude::*;
use crate::db::orders::OrderSortField;

#[derive(Default)]
pub struct OrderQueries;

#[Object]
impl OrderQueries {
    /// Look up an order by global ID
    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Order>> {
        let Some(pk) = node_pk(&id, NodeKind::Order) else {
            return Ok(None);
        };
        let db = ctx.data_unchecked::<Database>();
        let record = db.orders().get_by_id(pk).await?;
        Ok(record.map(Order::from))
    }

    /// Orders with optional filtering, ordering and cursor pagination.
    /// Newest first unless `orderBy` says otherwise.
    #[allow(clippy::too_many_arguments)]
    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilterInput>,
        order_by: Option<Vec<String>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<OrderConnection> {
        let db = ctx.data_unchecked::<Database>();
        let filter = filter.unwrap_or_default().into_filter()?;
        let order = parse_order_by::<OrderSortField>(order_by.as_deref())?;

        let repo = db.orders();
        let total = repo.count(&filter).await?;
        let window = ConnectionArgs {
            first,
            after,
            last,
            before,
        }
        .window(total, max_page_size(ctx))?;

        let records = repo.list(&filter, &order, window.limit, window.offset).await?;
        let orders: Vec<Order> = records.into_iter().map(Order::from).collect();

        let connection = Connection::from_items(orders, window.offset, total);
        Ok(OrderConnection::from_connection(connection))
    }
}
