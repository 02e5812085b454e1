//! SQL query builder for filtered, sorted and paginated list queries
//!
//! Filters are explicit Rust structs whose fields map one-to-one onto typed
//! [`Predicate`]s, and sort keys come from per-entity enums implementing
//! [`SortField`]. Nothing here accepts raw column names from callers, so every
//! generated statement is built from `'static` SQL fragments plus bound values.

use std::fmt::Write as _;
use std::marker::PhantomData;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use super::sqlite_helpers::contains_regex;

/// Metadata about a database entity (table).
pub trait DatabaseEntity: Sized + Send + Unpin + for<'r> FromRow<'r, SqliteRow> {
    /// The SQL table name (e.g., "customers")
    const TABLE_NAME: &'static str;

    /// Comma separated list of selected columns
    const COLUMNS: &'static str;

    /// Default ordering applied when the caller gives none
    const DEFAULT_ORDER: &'static [SortKey];

    /// Build a SELECT query for all columns
    fn select_sql() -> String {
        format!("SELECT {} FROM {}", Self::COLUMNS, Self::TABLE_NAME)
    }
}

/// Trait for filter structs that translate into WHERE predicates.
pub trait DatabaseFilter: Send + Sync {
    /// The predicates for every field that is set. Unset fields contribute nothing.
    fn predicates(&self) -> Vec<Predicate>;

    /// Check if the filter has any conditions
    fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }
}

/// Per-entity enumeration of sortable fields.
pub trait SortField: Sized + Copy {
    /// Resolve a field name (snake_case or camelCase) to a sort field
    fn from_name(name: &str) -> Option<Self>;

    /// The column this field sorts by
    fn column(self) -> &'static str;
}

/// One ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub descending: bool,
}

impl SortKey {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    fn to_sql(self) -> String {
        if self.descending {
            format!("{} DESC", self.column)
        } else {
            format!("{} ASC", self.column)
        }
    }
}

/// Represents a SQL value that can be bound to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
}

/// A typed WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Eq(&'static str, SqlValue),
    /// `column >= value`
    Gte(&'static str, SqlValue),
    /// `column <= value`
    Lte(&'static str, SqlValue),
    /// Case-insensitive (Unicode) substring match
    IContains(&'static str, String),
    /// Regular expression match (SQLite `REGEXP`)
    Regex(&'static str, String),
    /// The inner predicate applied inside a subquery. `prefix` opens the
    /// subquery and is closed with `)` after the inner condition.
    Related {
        prefix: &'static str,
        inner: Box<Predicate>,
    },
}

impl Predicate {
    /// Render this predicate as SQL with `?` placeholders, appending the bound
    /// values in placeholder order.
    pub fn render(&self, values: &mut Vec<SqlValue>) -> String {
        match self {
            Predicate::Eq(column, value) => {
                values.push(value.clone());
                format!("{} = ?", column)
            }
            Predicate::Gte(column, value) => {
                values.push(value.clone());
                format!("{} >= ?", column)
            }
            Predicate::Lte(column, value) => {
                values.push(value.clone());
                format!("{} <= ?", column)
            }
            Predicate::IContains(column, needle) => {
                values.push(SqlValue::Text(contains_regex(needle)));
                format!("{} REGEXP ?", column)
            }
            Predicate::Regex(column, pattern) => {
                values.push(SqlValue::Text(pattern.clone()));
                format!("{} REGEXP ?", column)
            }
            Predicate::Related { prefix, inner } => {
                let condition = inner.render(values);
                format!("{}{})", prefix, condition)
            }
        }
    }
}

/// A query builder for database entities.
///
/// Builds parameterized SELECT and COUNT statements with filtering, sorting
/// and LIMIT/OFFSET pagination.
pub struct EntityQuery<E: DatabaseEntity> {
    _phantom: PhantomData<E>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order: Vec<SortKey>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<E: DatabaseEntity> EntityQuery<E> {
    /// Create a new query builder for the entity type.
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
            where_clauses: Vec::new(),
            values: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a filter to the query.
    pub fn filter<F: DatabaseFilter>(mut self, filter: &F) -> Self {
        for predicate in filter.predicates() {
            let clause = predicate.render(&mut self.values);
            self.where_clauses.push(clause);
        }
        self
    }

    /// Add a single predicate.
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        let clause = predicate.render(&mut self.values);
        self.where_clauses.push(clause);
        self
    }

    /// Set the ordering. An empty list falls back to the entity default.
    pub fn order_by(mut self, keys: &[SortKey]) -> Self {
        self.order = keys.to_vec();
        self
    }

    /// Set limit and offset.
    pub fn paginate(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    fn order_clause(&self) -> String {
        let keys: &[SortKey] = if self.order.is_empty() {
            E::DEFAULT_ORDER
        } else {
            &self.order
        };
        let mut terms: Vec<String> = keys.iter().map(|k| k.to_sql()).collect();
        // Stable pagination needs a total order.
        if !keys.iter().any(|k| k.column == "id") {
            terms.push("id ASC".to_string());
        }
        terms.join(", ")
    }

    fn where_clause(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Build the SQL query string.
    pub fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        sql.push_str(&self.where_clause());
        let _ = write!(sql, " ORDER BY {}", self.order_clause());

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) if offset > 0 => {
                let _ = write!(sql, " LIMIT {} OFFSET {}", limit, offset);
            }
            (Some(limit), _) => {
                let _ = write!(sql, " LIMIT {}", limit);
            }
            (None, Some(offset)) if offset > 0 => {
                let _ = write!(sql, " LIMIT -1 OFFSET {}", offset);
            }
            _ => {}
        }

        sql
    }

    /// Build a COUNT query string.
    pub fn build_count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}{}", E::TABLE_NAME, self.where_clause())
    }

    /// Execute the query and return all matching entities.
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query");

        let mut query = sqlx::query_as::<_, E>(&sql);
        for value in &self.values {
            query = match value {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Int(i) => query.bind(*i),
            };
        }
        query.fetch_all(pool).await
    }

    /// Execute a COUNT query.
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &self.values {
            query = match value {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Int(i) => query.bind(*i),
            };
        }
        query.fetch_one(pool).await
    }
}

impl<E: DatabaseEntity> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a `?, ?, ?` placeholder list for an `IN (...)` clause.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
