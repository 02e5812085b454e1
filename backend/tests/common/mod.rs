//! Shared helpers for GraphQL integration tests

use async_graphql::{Request, Variables};
use serde_json::Value;

use crm::db::Database;
use crm::graphql::{CrmSchema, GraphqlSettings, build_schema};

/// Fresh schema over an empty in-memory database
pub async fn schema() -> CrmSchema {
    schema_with(GraphqlSettings::default()).await
}

pub async fn schema_with(settings: GraphqlSettings) -> CrmSchema {
    let db = Database::in_memory().await.expect("in-memory database");
    build_schema(db, settings)
}

/// Execute an operation and return `data`, failing on GraphQL errors
pub async fn execute(schema: &CrmSchema, query: &str, variables: Value) -> Value {
    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().expect("json data")
}

/// Execute an operation that must fail and return its error messages
pub async fn execute_err(schema: &CrmSchema, query: &str, variables: Value) -> Vec<String> {
    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    assert!(!response.errors.is_empty(), "expected errors");
    response.errors.into_iter().map(|e| e.message).collect()
}

pub const CREATE_CUSTOMER: &str = r#"
    mutation ($input: CustomerInput!) {
        createCustomer(input: $input) {
            customer { id name email phone }
            message
            errors
        }
    }
"#;

pub const CREATE_PRODUCT: &str = r#"
    mutation ($input: ProductInput!) {
        createProduct(input: $input) {
            product { id name price stock }
            errors
        }
    }
"#;

pub const CREATE_ORDER: &str = r#"
    mutation ($input: OrderInput!) {
        createOrder(input: $input) {
            order { id totalAmount customer { name } products { name } }
            errors
        }
    }
"#;

pub async fn create_customer(schema: &CrmSchema, name: &str, email: &str) -> String {
    let data = execute(
        schema,
        CREATE_CUSTOMER,
        serde_json::json!({ "input": { "name": name, "email": email } }),
    )
    .await;
    data["createCustomer"]["customer"]["id"]
        .as_str()
        .expect("customer id")
        .to_string()
}

pub async fn create_product(schema: &CrmSchema, name: &str, price: &str, stock: i32) -> String {
    let data = execute(
        schema,
        CREATE_PRODUCT,
        serde_json::json!({ "input": { "name": name, "price": price, "stock": stock } }),
    )
    .await;
    data["createProduct"]["product"]["id"]
        .as_str()
        .expect("product id")
        .to_string()
}
