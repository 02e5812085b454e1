use super::prelude::*;

#[derive(Default)]
pub struct ProductMutations;

#[Object]
impl ProductMutations {
    /// Create a product. The price is rounded half-up to cents.
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: ProductInput,
    ) -> Result<CreateProductPayload> {
        let service = ctx.data_unchecked::<ProductService>();
        let payload = match service.create(input.into()).await? {
            MutationOutcome::Created(record) => CreateProductPayload::created(record.into()),
            MutationOutcome::Rejected(errors) => CreateProductPayload::rejected(errors),
        };
        Ok(payload)
    }
}
