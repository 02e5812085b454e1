use super::prelude::*;
use crate::db::products::ProductSortField;

#[derive(Default)]
pub struct ProductQueries;

#[Object]
impl ProductQueries {
    /// Look up a product by global ID
    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Product>> {
        let Some(pk) = node_pk(&id, NodeKind::Product) else {
            return Ok(None);
        };
        let db = ctx.data_unchecked::<Database>();
        let record = db.products().get_by_id(pk).await?;
        Ok(record.map(Product::from))
    }

    /// Products with optional filtering, ordering and cursor pagination
    #[allow(clippy::too_many_arguments)]
    async fn all_products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
        order_by: Option<Vec<String>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<ProductConnection> {
        let db = ctx.data_unchecked::<Database>();
        let filter = filter.unwrap_or_default().into_filter()?;
        let order = parse_order_by::<ProductSortField>(order_by.as_deref())?;

        let repo = db.products();
        let total = repo.count(&filter).await?;
        let window = ConnectionArgs {
            first,
            after,
            last,
            before,
        }
        .window(total, max_page_size(ctx))?;

        let records = repo.list(&filter, &order, window.limit, window.offset).await?;
        let products: Vec<Product> = records.into_iter().map(Product::from).collect();

        let connection = Connection::from_items(products, window.offset, total);
        Ok(ProductConnection::from_connection(connection))
    }
}
