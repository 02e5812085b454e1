use super::prelude::*;
use crate::db::customers::CustomerSortField;

#[derive(Default)]
pub struct CustomerQueries;

#[Object]
impl CustomerQueries {
    /// Look up a customer by global ID
    async fn customer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Customer>> {
        let Some(pk) = node_pk(&id, NodeKind::Customer) else {
            return Ok(None);
        };
        let db = ctx.data_unchecked::<Database>();
        let record = db.customers().get_by_id(pk).await?;
        Ok(record.map(Customer::from))
    }

    /// Customers with optional filtering, ordering and cursor pagination
    #[allow(clippy::too_many_arguments)]
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilterInput>,
        order_by: Option<Vec<String>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<CustomerConnection> {
        let db = ctx.data_unchecked::<Database>();
        let filter = filter.unwrap_or_default().into_filter()?;
        let order = parse_order_by::<CustomerSortField>(order_by.as_deref())?;

        let repo = db.customers();
        let total = repo.count(&filter).await?;
        let window = ConnectionArgs {
            first,
            after,
            last,
            before,
        }
        .window(total, max_page_size(ctx))?;

        let records = repo.list(&filter, &order, window.limit, window.offset).await?;
        let customers: Vec<Customer> = records.into_iter().map(Customer::from).collect();

        let connection = Connection::from_items(customers, window.offset, total);
        Ok(CustomerConnection::from_connection(connection))
    }
}
