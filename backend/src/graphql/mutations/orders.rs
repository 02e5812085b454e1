use super::prelude::*;

#[derive(Default)]
pub struct OrderMutations;

#[Object]
impl OrderMutations {
    /// Place an order for a customer. The total is computed from the current
    /// product prices.
    async fn create_order(&self, ctx: &Context<'_>, input: OrderInput) -> Result<CreateOrderPayload> {
        let service = ctx.data_unchecked::<OrderService>();
        let payload = match service.create(input.into()).await? {
            MutationOutcome::Created(record) => CreateOrderPayload::created(record.into()),
            MutationOutcome::Rejected(errors) => CreateOrderPayload::rejected(errors),
        };
        Ok(payload)
    }
}
