//! Cursor-based pagination types for GraphQL
//!
//! Implements the Relay Connection specification over an offset window for
//! all list queries. Cursors are opaque base64 encodings of `cursor:<offset>`.
//!
//! Usage: Use the `define_connection!` macro to create type-specific connections.

use async_graphql::SimpleObject;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::services::CrmError;

/// Information about pagination in a connection
#[derive(SimpleObject, Debug, Clone, Default)]
pub struct PageInfo {
    /// When paginating forwards, are there more items?
    pub has_next_page: bool,
    /// When paginating backwards, are there more items?
    pub has_previous_page: bool,
    /// Cursor of the first item in this page
    pub start_cursor: Option<String>,
    /// Cursor of the last item in this page
    pub end_cursor: Option<String>,
    /// Total count of items matching the filter
    pub total_count: Option<i64>,
}

/// An edge in a connection, containing a node and cursor (internal use)
#[derive(Debug, Clone)]
pub struct Edge<T> {
    /// The item at the end of the edge
    pub node: T,
    /// A cursor for pagination
    pub cursor: String,
}

/// A paginated connection result (internal use)
#[derive(Debug, Clone)]
pub struct Connection<T> {
    /// The edges in this connection
    pub edges: Vec<Edge<T>>,
    /// Pagination information
    pub page_info: PageInfo,
}

/// Macro to define a GraphQL connection type for a specific entity
///
/// Usage:
/// ```ignore
/// define_connection!(CustomerConnection, CustomerEdge, Customer);
/// ```
#[macro_export]
macro_rules! define_connection {
    ($conn_name:ident, $edge_name:ident, $node_type:ty) => {
        /// Edge containing a node and cursor
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $edge_name {
            /// The item at the end of the edge
            pub node: $node_type,
            /// A cursor for pagination
            pub cursor: String,
        }

        /// Connection containing edges and page info
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $conn_name {
            /// The edges in this connection
            pub edges: Vec<$edge_name>,
            /// Pagination information
            pub page_info: $crate::graphql::pagination::PageInfo,
        }

        impl $conn_name {
            /// Create from a generic Connection
            pub fn from_connection(
                conn: $crate::graphql::pagination::Connection<$node_type>,
            ) -> Self {
                Self {
                    edges: conn
                        .edges
                        .into_iter()
                        .map(|e| $edge_name {
                            node: e.node,
                            cursor: e.cursor,
                        })
                        .collect(),
                    page_info: conn.page_info,
                }
            }
        }
    };
}

impl<T> Connection<T> {
    /// Create a connection from one page of items
    ///
    /// # Arguments
    /// * `items` - The items to include in this page
    /// * `offset` - The offset of the first item (for cursor generation)
    /// * `total` - Total count of items matching the query
    pub fn from_items(items: Vec<T>, offset: i64, total: i64) -> Self {
        let has_next_page = (offset + items.len() as i64) < total;
        let has_previous_page = offset > 0;

        let edges: Vec<Edge<T>> = items
            .into_iter()
            .enumerate()
            .map(|(i, node)| Edge {
                cursor: encode_cursor(offset + i as i64),
                node,
            })
            .collect();

        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
            total_count: Some(total),
        };

        Self { edges, page_info }
    }
}

/// Encode an offset as a cursor string
pub fn encode_cursor(offset: i64) -> String {
    BASE64.encode(format!("cursor:{}", offset))
}

/// Decode a cursor string to an offset
pub fn decode_cursor(cursor: &str) -> Result<i64, &'static str> {
    let decoded = BASE64.decode(cursor).map_err(|_| "invalid cursor format")?;

    let s = String::from_utf8(decoded).map_err(|_| "invalid cursor encoding")?;

    let Some(value) = s.strip_prefix("cursor:") else {
        return Err("invalid cursor prefix");
    };

    match value.parse::<i64>() {
        Ok(offset) if offset >= 0 => Ok(offset),
        _ => Err("invalid cursor value"),
    }
}

/// Relay connection arguments as received by a list field
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub first: Option<i32>,
    pub after: Option<String>,
    pub last: Option<i32>,
    pub before: Option<String>,
}

/// The slice of the result set a page covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl ConnectionArgs {
    /// Resolve the arguments against the total result size.
    ///
    /// `after`/`before` narrow the range, `first` keeps its head and `last`
    /// its tail. Page size is capped at `max_page_size`, which is also the
    /// default when neither `first` nor `last` is given.
    pub fn window(&self, total: i64, max_page_size: i64) -> Result<PageWindow, CrmError> {
        let mut start = match self.after.as_deref() {
            Some(cursor) => decode_cursor(cursor)
                .ok()
                .and_then(|offset| offset.checked_add(1))
                .ok_or(CrmError::InvalidCursor)?,
            None => 0,
        };
        let mut end = match self.before.as_deref() {
            Some(cursor) => decode_cursor(cursor).map_err(|_| CrmError::InvalidCursor)?,
            None => total,
        };
        end = end.min(total);
        start = start.min(end);

        let first = non_negative("first", self.first)?;
        let last = non_negative("last", self.last)?;

        match (first, last) {
            (Some(first), _) => {
                end = end.min(start + first.min(max_page_size));
                if let Some(last) = last {
                    start = start.max(end - last);
                }
            }
            (None, Some(last)) => {
                start = start.max(end - last.min(max_page_size));
            }
            (None, None) => {
                end = end.min(start + max_page_size);
            }
        }

        Ok(PageWindow {
            offset: start,
            limit: end - start,
        })
    }
}

fn non_negative(name: &'static str, value: Option<i32>) -> Result<Option<i64>, CrmError> {
    match value {
        Some(v) if v < 0 => Err(CrmError::InvalidPagination(format!(
            "Argument \"{}\" must be a non-negative integer",
            name
        ))),
        other => Ok(other.map(i64::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(first: Option<i32>, after: Option<i64>, last: Option<i32>, before: Option<i64>) -> ConnectionArgs {
        ConnectionArgs {
            first,
            after: after.map(encode_cursor),
            last,
            before: before.map(encode_cursor),
        }
    }

    #[test]
    fn test_cursor_roundtrip() {
        for offset in [0, 1, 100, 999999] {
            let cursor = encode_cursor(offset);
            let decoded = decode_cursor(&cursor).unwrap();
            assert_eq!(offset, decoded);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_cursor("!!!").is_err());
        // base64("offset:3")
        assert!(decode_cursor("b2Zmc2V0OjM=").is_err());
        // base64("cursor:-1")
        assert!(decode_cursor("Y3Vyc29yOi0x").is_err());
    }

    #[test]
    fn test_window_defaults_to_max_page_size() {
        let window = args(None, None, None, None).window(250, 100).unwrap();
        assert_eq!(window, PageWindow { offset: 0, limit: 100 });
    }

    #[test]
    fn test_window_first_is_capped() {
        let window = args(Some(1000), None, None, None).window(250, 100).unwrap();
        assert_eq!(window, PageWindow { offset: 0, limit: 100 });
    }

    #[test]
    fn test_window_after_cursor() {
        let window = args(Some(25), Some(10), None, None).window(250, 100).unwrap();
        assert_eq!(window, PageWindow { offset: 11, limit: 25 });

        let window = args(Some(25), Some(240), None, None).window(250, 100).unwrap();
        assert_eq!(window, PageWindow { offset: 241, limit: 9 });
    }

    #[test]
    fn test_window_last_before() {
        let window = args(None, None, Some(3), Some(10)).window(250, 100).unwrap();
        assert_eq!(window, PageWindow { offset: 7, limit: 3 });

        let window = args(None, None, Some(5), None).window(12, 100).unwrap();
        assert_eq!(window, PageWindow { offset: 7, limit: 5 });
    }

    #[test]
    fn test_window_errors() {
        let bad_cursor = ConnectionArgs {
            after: Some("nope".to_string()),
            ..Default::default()
        };
        assert_matches!(bad_cursor.window(10, 100), Err(CrmError::InvalidCursor));
        assert_matches!(
            args(Some(-1), None, None, None).window(10, 100),
            Err(CrmError::InvalidPagination(_))
        );
    }

    #[test]
    fn test_after_last_representable_offset() {
        assert_matches!(
            args(Some(5), Some(i64::MAX), None, None).window(1, 100),
            Err(CrmError::InvalidCursor)
        );
        assert_eq!(
            args(None, None, None, Some(i64::MAX)).window(3, 100).unwrap(),
            PageWindow { offset: 0, limit: 3 }
        );
    }

    #[test]
    fn test_from_items_page_info() {
        let conn = Connection::from_items(vec!["b", "c"], 1, 4);
        assert!(conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
        assert_eq!(conn.page_info.start_cursor, Some(encode_cursor(1)));
        assert_eq!(conn.page_info.end_cursor, Some(encode_cursor(2)));
        assert_eq!(conn.page_info.total_count, Some(4));
    }
}
