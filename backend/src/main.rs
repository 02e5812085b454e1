//! CRM Backend
//!
//! Entry point: serves the GraphQL API, seeds sample data, or prints the SDL.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crm::app::{AppState, build_app};
use crm::config::{Config, LogFormat};
use crm::db::{Database, seed};
use crm::graphql::build_schema;

#[derive(Debug, Parser)]
#[command(name = "crm", version, about = "GraphQL CRM backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Insert the sample customers, products and order
    Seed,
    /// Print the GraphQL schema in SDL form
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Seed => {
            let db = Database::connect(&config.database_url, config.database_max_connections).await?;
            let result = seed::run_seeds(&db).await?;
            tracing::info!(
                customers = result.customers_created,
                products = result.products_created,
                orders = result.orders_created,
                "Seed complete"
            );
            Ok(())
        }
        Command::Schema => {
            let db = Database::in_memory().await?;
            println!("{}", build_schema(db, config.graphql_settings()).sdl());
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crm=debug,tower_http=info,async_graphql=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting CRM backend");

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    let addr = config.bind_address();
    let port = config.port;

    let app = build_app(AppState::new(config, db));
    tracing::info!("GraphQL schema built");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphiQL: http://localhost:{}/graphql", port);

    axum::serve(listener, app).await?;
    Ok(())
}
