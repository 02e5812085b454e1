//! Customer creation, single and in bulk

use std::collections::HashSet;

use tracing::{info, warn};

use super::error::{CrmError, CrmResult};
use super::validation::{
    DUPLICATE_EMAIL, EMAIL_EXISTS, check_email_format, clean_name, clean_phone, normalize_email,
};
use super::MutationOutcome;
use crate::db::customers::insert_customer;
use crate::db::{CreateCustomer, CustomerRecord, Database};

/// Raw customer fields as submitted by a client
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Outcome of a bulk create: inserted rows in input order, plus one
/// `Entry N: ...` message per rejected row ordered by row number.
#[derive(Debug, Clone, Default)]
pub struct BulkCreateOutcome {
    pub customers: Vec<CustomerRecord>,
    pub errors: Vec<String>,
}

pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validate and insert one customer.
    ///
    /// Checks run in order name, phone, email and all of them are reported.
    pub async fn create(&self, draft: CustomerDraft) -> CrmResult<MutationOutcome<CustomerRecord>> {
        let repo = self.db.customers();
        let mut errors = Vec::new();

        let name = clean_name(&draft.name, &mut errors);
        let phone = clean_phone(draft.phone.as_deref(), &mut errors);
        let email = normalize_email(&draft.email);
        if check_email_format(&email, &mut errors) && repo.email_exists(&email).await? {
            errors.push(EMAIL_EXISTS.to_string());
        }

        if !errors.is_empty() {
            warn!(email = %email, errors = ?errors, "Rejected customer");
            return Ok(MutationOutcome::Rejected(errors));
        }

        match repo.create(&CreateCustomer { name, email, phone }).await? {
            Some(customer) => {
                info!(customer_id = customer.id, email = %customer.email, "Customer created");
                Ok(MutationOutcome::Created(customer))
            }
            None => {
                warn!("Customer email claimed concurrently");
                Ok(MutationOutcome::Rejected(vec![EMAIL_EXISTS.to_string()]))
            }
        }
    }

    /// Validate every row independently and insert the valid ones in one
    /// transaction.
    ///
    /// The first valid occurrence of an email wins; later rows with the same
    /// email are rejected. Emails already stored take precedence over
    /// in-batch duplicates.
    pub async fn bulk_create(&self, drafts: Vec<CustomerDraft>) -> CrmResult<BulkCreateOutcome> {
        if drafts.is_empty() {
            return Err(CrmError::EmptyInput);
        }

        let emails: Vec<String> = drafts
            .iter()
            .map(|d| normalize_email(&d.email))
            .filter(|e| !e.is_empty())
            .collect();
        let existing = self.db.customers().existing_emails(&emails).await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut pending: Vec<(usize, CreateCustomer)> = Vec::new();
        let mut row_failures: Vec<(usize, String)> = Vec::new();

        for (index, draft) in drafts.iter().enumerate() {
            let entry = index + 1;
            let mut errors = Vec::new();

            let name = clean_name(&draft.name, &mut errors);
            let email = normalize_email(&draft.email);
            if check_email_format(&email, &mut errors) {
                if existing.contains(&email) {
                    errors.push(EMAIL_EXISTS.to_string());
                } else if seen.contains(&email) {
                    errors.push(DUPLICATE_EMAIL.to_string());
                }
            }
            let phone = clean_phone(draft.phone.as_deref(), &mut errors);

            if !errors.is_empty() {
                row_failures.push((entry, errors.join("; ")));
                continue;
            }

            seen.insert(email.clone());
            pending.push((entry, CreateCustomer { name, email, phone }));
        }

        let mut customers = Vec::with_capacity(pending.len());
        if !pending.is_empty() {
            let mut tx = self.db.pool().begin().await?;
            for (entry, customer) in &pending {
                match insert_customer(&mut tx, customer).await? {
                    Some(record) => customers.push(record),
                    None => row_failures.push((*entry, EMAIL_EXISTS.to_string())),
                }
            }
            tx.commit().await?;
        }

        row_failures.sort_by_key(|(entry, _)| *entry);
        let errors: Vec<String> = row_failures
            .into_iter()
            .map(|(entry, message)| format!("Entry {}: {}", entry, message))
            .collect();

        info!(
            created = customers.len(),
            rejected = errors.len(),
            "Bulk customer create finished"
        );
        Ok(BulkCreateOutcome { customers, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CustomerFilter;
    use crate::services::validation::{INVALID_PHONE, NAME_REQUIRED};
    use assert_matches::assert_matches;

    fn draft(name: &str, email: &str, phone: Option<&str>) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
        }
    }

    async fn service() -> (Database, CustomerService) {
        let db = Database::in_memory().await.unwrap();
        (db.clone(), CustomerService::new(db))
    }

    #[tokio::test]
    async fn test_create_normalises_email() {
        let (_, service) = service().await;
        let outcome = service
            .create(draft(" Alice ", " Alice@Example.COM ", Some("+1234567890")))
            .await
            .unwrap();

        let customer = outcome.created().unwrap();
        assert_eq!(customer.name, "Alice");
        assert_eq!(customer.email, "alice@example.com");
        assert_eq!(customer.phone, "+1234567890");
    }

    #[tokio::test]
    async fn test_create_rejects_case_only_duplicate() {
        let (db, service) = service().await;
        service.create(draft("Alice", "alice@example.com", None)).await.unwrap();

        let outcome = service.create(draft("Alice", "ALICE@EXAMPLE.COM", None)).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Rejected(vec![EMAIL_EXISTS.to_string()]));
        assert_eq!(db.customers().count(&CustomerFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_reports_all_errors_in_order() {
        let (_, service) = service().await;
        let outcome = service.create(draft("  ", "", Some("555"))).await.unwrap();
        assert_eq!(
            outcome.errors(),
            &[
                NAME_REQUIRED.to_string(),
                INVALID_PHONE.to_string(),
                "Email is required.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_bulk_inserts_only_valid_rows() {
        let (db, service) = service().await;
        let outcome = service
            .bulk_create(vec![
                draft("", "bad@example.com", None),
                draft("Bob", "bob@example.com", Some("123-456-7890")),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.customers.len(), 1);
        assert_eq!(outcome.customers[0].email, "bob@example.com");
        assert_eq!(outcome.errors, vec!["Entry 1: Name is required."]);
        assert_eq!(db.customers().count(&CustomerFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bulk_duplicate_detection() {
        let (_, service) = service().await;
        service.create(draft("Stored", "stored@example.com", None)).await.unwrap();

        let outcome = service
            .bulk_create(vec![
                draft("", "dup@example.com", None),
                draft("First", "DUP@example.com", None),
                draft("Second", "dup@example.com", Some("nope")),
                draft("Stored again", "stored@example.com", None),
            ])
            .await
            .unwrap();

        let emails: Vec<_> = outcome.customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["dup@example.com"]);
        assert_eq!(
            outcome.errors,
            vec![
                "Entry 1: Name is required.".to_string(),
                format!("Entry 3: {}; {}", DUPLICATE_EMAIL, INVALID_PHONE),
                format!("Entry 4: {}", EMAIL_EXISTS),
            ]
        );
    }

    #[tokio::test]
    async fn test_bulk_rejects_empty_input() {
        let (_, service) = service().await;
        assert_matches!(service.bulk_create(Vec::new()).await, Err(CrmError::EmptyInput));
    }
}
