//! Customers repository

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use super::is_unique_violation;
use super::query::{
    DatabaseEntity, DatabaseFilter, EntityQuery, Predicate, SortField, SortKey, SqlValue,
    placeholders,
};
use super::sqlite_helpers::{datetime_to_str, get_datetime, now_utc};

/// SQLite caps the number of bound parameters per statement.
const IN_CHUNK_SIZE: usize = 500;

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for CustomerRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: get_datetime(row, "created_at")?,
            updated_at: get_datetime(row, "updated_at")?,
        })
    }
}

impl DatabaseEntity for CustomerRecord {
    const TABLE_NAME: &'static str = "customers";
    const COLUMNS: &'static str = "id, name, email, phone, created_at, updated_at";
    const DEFAULT_ORDER: &'static [SortKey] = &[SortKey::asc("name")];
}

/// Validated customer ready for insertion. Email is already lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

// ============================================================================
// Filtering and sorting
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
    /// Must already be a valid regular expression
    pub phone_pattern: Option<String>,
}

impl DatabaseFilter for CustomerFilter {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(ref name) = self.name_icontains {
            predicates.push(Predicate::IContains("name", name.clone()));
        }
        if let Some(ref email) = self.email_icontains {
            predicates.push(Predicate::IContains("email", email.clone()));
        }
        if let Some(gte) = self.created_at_gte {
            predicates.push(Predicate::Gte("created_at", SqlValue::Text(datetime_to_str(gte))));
        }
        if let Some(lte) = self.created_at_lte {
            predicates.push(Predicate::Lte("created_at", SqlValue::Text(datetime_to_str(lte))));
        }
        if let Some(ref pattern) = self.phone_pattern {
            predicates.push(Predicate::Regex("phone", pattern.clone()));
        }
        predicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSortField {
    Id,
    Name,
    Email,
    Phone,
    CreatedAt,
    UpdatedAt,
}

impl SortField for CustomerSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" | "pk" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "updated_at" | "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

// ============================================================================
// Repository
// ============================================================================

pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get customer by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<CustomerRecord>> {
        let record = sqlx::query_as::<_, CustomerRecord>(&format!(
            "{} WHERE id = ?",
            CustomerRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Get customers by a set of IDs (unordered)
    pub async fn get_many(&self, ids: &[i64]) -> Result<Vec<CustomerRecord>> {
        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let sql = format!(
                "{} WHERE id IN ({})",
                CustomerRecord::select_sql(),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_as::<_, CustomerRecord>(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            records.extend(query.fetch_all(&self.pool).await?);
        }
        Ok(records)
    }

    /// Check whether an email is taken (case-insensitive)
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM customers WHERE email = ? COLLATE NOCASE LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    /// Return the subset of `emails` that already exist, lower-cased
    pub async fn existing_emails(&self, emails: &[String]) -> Result<HashSet<String>> {
        let mut existing = HashSet::new();
        for chunk in emails.chunks(IN_CHUNK_SIZE) {
            let sql = format!(
                "SELECT lower(email) FROM customers WHERE email COLLATE NOCASE IN ({})",
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_scalar::<_, String>(&sql);
            for email in chunk {
                query = query.bind(email.as_str());
            }
            existing.extend(query.fetch_all(&self.pool).await?);
        }
        Ok(existing)
    }

    /// Insert a customer. Returns `None` if the email is already taken.
    pub async fn create(&self, customer: &CreateCustomer) -> Result<Option<CustomerRecord>> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_customer(&mut conn, customer).await?)
    }

    /// List customers matching a filter
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        order: &[SortKey],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CustomerRecord>> {
        let records = EntityQuery::<CustomerRecord>::new()
            .filter(filter)
            .order_by(order)
            .paginate(limit, offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    /// Count customers matching a filter
    pub async fn count(&self, filter: &CustomerFilter) -> Result<i64> {
        let count = EntityQuery::<CustomerRecord>::new()
            .filter(filter)
            .count(&self.pool)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Connection-level operations (usable inside a transaction)
// ============================================================================

/// Insert a customer on the given connection.
///
/// A unique-constraint violation on `email` yields `Ok(None)`; SQLite keeps
/// the surrounding transaction usable after a failed statement.
pub async fn insert_customer(
    conn: &mut SqliteConnection,
    customer: &CreateCustomer,
) -> Result<Option<CustomerRecord>, sqlx::Error> {
    let now = datetime_to_str(now_utc());
    let result = sqlx::query_as::<_, CustomerRecord>(&format!(
        "INSERT INTO customers (name, email, phone, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {}",
        CustomerRecord::COLUMNS
    ))
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await;

    match result {
        Ok(record) => Ok(Some(record)),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Fetch the customer with `customer.email`, inserting it if absent.
/// Returns the record and whether it was created.
pub async fn get_or_create_customer(
    conn: &mut SqliteConnection,
    customer: &CreateCustomer,
) -> Result<(CustomerRecord, bool), sqlx::Error> {
    let sql = format!("{} WHERE email = ? COLLATE NOCASE", CustomerRecord::select_sql());
    if let Some(existing) = sqlx::query_as::<_, CustomerRecord>(&sql)
        .bind(&customer.email)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok((existing, false));
    }

    match insert_customer(conn, customer).await? {
        Some(created) => Ok((created, true)),
        None => {
            let existing = sqlx::query_as::<_, CustomerRecord>(&sql)
                .bind(&customer.email)
                .fetch_one(&mut *conn)
                .await?;
            Ok((existing, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn new_customer(name: &str, email: &str) -> CreateCustomer {
        CreateCustomer {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_case_insensitive_duplicate() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();

        let created = repo.create(&new_customer("Alice", "alice@example.com")).await.unwrap();
        assert!(created.is_some());

        let duplicate = repo.create(&new_customer("Alice 2", "ALICE@example.com")).await.unwrap();
        assert!(duplicate.is_none());
        assert!(repo.email_exists("Alice@Example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_existing_emails_returns_only_known() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();
        repo.create(&new_customer("Bob", "bob@example.com")).await.unwrap();

        let existing = repo
            .existing_emails(&["bob@example.com".to_string(), "new@example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(existing.len(), 1);
        assert!(existing.contains("bob@example.com"));
    }

    #[tokio::test]
    async fn test_list_filters_by_name_and_phone_pattern() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();
        repo.create(&CreateCustomer {
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+1234567890".to_string(),
        })
        .await
        .unwrap();
        repo.create(&CreateCustomer {
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
            phone: "123-456-7890".to_string(),
        })
        .await
        .unwrap();

        let by_name = CustomerFilter {
            name_icontains: Some("JOHN".to_string()),
            ..Default::default()
        };
        let found = repo.list(&by_name, &[], 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alice Johnson");

        let by_phone = CustomerFilter {
            phone_pattern: Some(r"^\+1".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&by_phone).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_name_contains_folds_unicode_and_keeps_metacharacters_literal() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();
        for (name, email) in [
            ("Émile Zola", "emile@example.com"),
            ("A.J. Ayer", "aj@example.com"),
            ("Abjad", "abjad@example.com"),
        ] {
            repo.create(&CreateCustomer {
                name: name.to_string(),
                email: email.to_string(),
                phone: String::new(),
            })
            .await
            .unwrap();
        }

        let accented = CustomerFilter {
            name_icontains: Some("émile".to_string()),
            ..Default::default()
        };
        let found = repo.list(&accented, &[], 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Émile Zola");

        let dotted = CustomerFilter {
            name_icontains: Some("a.j".to_string()),
            ..Default::default()
        };
        let found = repo.list(&dotted, &[], 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "A.J. Ayer");
    }
}
