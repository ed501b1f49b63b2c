use std::net::SocketAddr;

use engine::{EngineError, RetryPolicy};
use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendline={level},server={level},engine={level},report={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.server.database, settings.retry).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .retry(settings.retry)
        .build()?;

    let bind = settings
        .server
        .bind
        .as_deref()
        .unwrap_or("127.0.0.1")
        .to_string();
    let addr: SocketAddr = format!("{bind}:{}", settings.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

/// Connects (retrying while the store is unreachable) and applies migrations.
async fn connect_database(
    config: &settings::Database,
    retry: RetryPolicy,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = config.url();
    tracing::info!("connecting to {url}");

    let database = retry
        .run("database connection", || async {
            sea_orm::Database::connect(url.as_str())
                .await
                .map_err(EngineError::from)
        })
        .await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
