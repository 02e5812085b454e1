//! Application state and HTTP router construction.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::{self, CrmSchema};

/// Shared state for HTTP handlers (GraphQL, health checks).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: CrmSchema,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let schema = graphql::build_schema(db.clone(), config.graphql_settings());
        Self {
            config: Arc::new(config),
            db,
            schema,
        }
    }
}

/// Build the full Axum router: /graphql, /healthz, /readyz and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(graphql::http::router())
        .merge(crate::api::health::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
