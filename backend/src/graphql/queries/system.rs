use super::prelude::*;

#[derive(Default)]
pub struct SystemQueries;

#[Object]
impl SystemQueries {
    /// Greeting used as a connectivity check
    async fn hello(&self) -> &'static str {
        "Hello, GraphQL!"
    }

    /// Server version
    async fn version(&self) -> Result<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }
}
