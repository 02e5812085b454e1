//! `orderBy` argument parsing
//!
//! Entries are field names with an optional leading `-` for descending order.
//! Names resolve through the entity's [`SortField`] enumeration so only known
//! columns ever reach SQL.

use crate::db::query::{SortField, SortKey};
use crate::services::CrmError;

/// Translate `orderBy` entries into sort keys. `None` or an empty list means
/// "use the entity default".
pub fn parse_order_by<F: SortField>(order_by: Option<&[String]>) -> Result<Vec<SortKey>, CrmError> {
    let Some(entries) = order_by else {
        return Ok(Vec::new());
    };

    let mut keys = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim();
        let (name, descending) = match entry.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (entry, false),
        };
        let field = F::from_name(name).ok_or_else(|| CrmError::InvalidOrdering(name.to_string()))?;
        keys.push(SortKey {
            column: field.column(),
            descending,
        });
    }
    Ok(keys)
}
