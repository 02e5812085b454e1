//! Relay global object identifiers
//!
//! A global ID is the base64 encoding of `<TypeName>:<primary key>`.

use async_graphql::ID;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

/// Types reachable through `Query.node`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Customer,
    Product,
    Order,
}

impl NodeKind {
    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::Customer => "Customer",
            NodeKind::Product => "Product",
            NodeKind::Order => "Order",
        }
    }

    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Customer" => Some(NodeKind::Customer),
            "Product" => Some(NodeKind::Product),
            "Order" => Some(NodeKind::Order),
            _ => None,
        }
    }
}

/// Encode a primary key as a global ID
pub fn encode_global_id(kind: NodeKind, id: i64) -> ID {
    ID(BASE64.encode(format!("{}:{}", kind.type_name(), id)))
}

/// Decode a global ID into its type and primary key
pub fn decode_global_id(raw: &str) -> Option<(NodeKind, i64)> {
    let decoded = BASE64.decode(raw.trim()).ok()?;
    let s = String::from_utf8(decoded).ok()?;
    let (type_name, pk) = s.split_once(':')?;
    let kind = NodeKind::from_type_name(type_name)?;
    let id = pk.parse().ok()?;
    Some((kind, id))
}

/// Accept either a raw integer primary key or a global ID of `kind`
pub fn parse_entity_id(raw: &str, kind: NodeKind) -> Option<i64> {
    if let Ok(id) = raw.trim().parse::<i64>() {
        return Some(id);
    }
    match decode_global_id(raw)? {
        (decoded_kind, id) if decoded_kind == kind => Some(id),
        _ => None,
    }
}
