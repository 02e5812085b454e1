//! Non-GraphQL HTTP routes
//!
//! The primary API is GraphQL at /graphql; only liveness and readiness
//! probes live here.

pub mod health;
