//! CRM backend library
//!
//! Customers, products and orders over a GraphQL API backed by SQLite.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod graphql;
pub mod services;
