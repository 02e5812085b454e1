//! Domain services: validation and transactional writes behind the GraphQL mutations

pub mod customers;
pub mod error;
pub mod money;
pub mod orders;
pub mod products;
pub mod validation;

pub use customers::{BulkCreateOutcome, CustomerDraft, CustomerService};
pub use error::{CrmError, CrmResult};
pub use orders::{OrderDraft, OrderService};
pub use products::{ProductDraft, ProductService};

/// Result of a single-entity create: the stored entity, or every validation
/// message explaining why nothing was written.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Created(T),
    Rejected(Vec<String>),
}

impl<T> MutationOutcome<T> {
    pub fn created(self) -> Option<T> {
        match self {
            Self::Created(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Self::Created(_) => &[],
            Self::Rejected(errors) => errors,
        }
    }
}
