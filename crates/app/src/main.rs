use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server).await.inspect_err(|err| {
        tracing::error!("failed to initialize database: {err}");
    })?;

    let mut builder = engine::Engine::builder().database(db);
    if let Some(timeout) = server.unit_timeout_ms {
        builder = builder.unit_timeout(Duration::from_millis(timeout));
    }
    let engine = builder.build().await.inspect_err(|err| {
        tracing::error!("failed to build engine from database: {err}");
    })?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await.inspect_err(|err| {
        tracing::error!("failed to bind server listener: {err}");
    })?;

    server::run_with_listener(engine, listener).await?;
    Ok(())
}

async fn parse_database(
    config: &settings::Server,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match &config.database {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
        Database::Url(url) => url.clone(),
    };

    let mut options = ConnectOptions::new(url);
    options.sqlx_logging(false);
    match (&config.database, config.max_connections) {
        // Every pooled connection would open its own empty in-memory database.
        (Database::Memory, _) => {
            options.max_connections(1);
        }
        (_, Some(max)) => {
            options.max_connections(max);
        }
        (_, None) => {}
    }

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
