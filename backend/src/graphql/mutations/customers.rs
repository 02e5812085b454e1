use super::prelude::*;

const CUSTOMER_CREATED: &str = "Customer created successfully.";

#[derive(Default)]
pub struct CustomerMutations;

#[Object]
impl CustomerMutations {
    /// Create a customer. Validation problems are returned in `errors`.
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CustomerInput,
    ) -> Result<CreateCustomerPayload> {
        let service = ctx.data_unchecked::<CustomerService>();
        let payload = match service.create(input.into()).await? {
            MutationOutcome::Created(record) => {
                CreateCustomerPayload::created(record.into(), CUSTOMER_CREATED)
            }
            MutationOutcome::Rejected(errors) => CreateCustomerPayload::rejected(errors),
        };
        Ok(payload)
    }

    /// Create many customers at once. Valid rows are inserted even when
    /// others are rejected.
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<CustomerInput>,
    ) -> Result<BulkCreateCustomersPayload> {
        let service = ctx.data_unchecked::<CustomerService>();
        let outcome = service
            .bulk_create(input.into_iter().map(Into::into).collect())
            .await?;
        Ok(BulkCreateCustomersPayload {
            customers: outcome.customers.into_iter().map(Customer::from).collect(),
            errors: outcome.errors,
        })
    }
}
