use std::time::Duration;

use clap::Parser;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use settings::{Cli, Database, Settings};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "expense_approvals={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let rates = settings.rate_table()?;
    let db = connect(&settings).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .rates(rates)
        .build()
        .await?;

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn connect(
    settings: &Settings,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let (url, max_connections) = match &settings.database {
        // every connection to `:memory:` opens its own database
        Database::Memory => (String::from("sqlite::memory:"), 1),
        Database::Sqlite(path) => (
            format!("sqlite:{path}?mode=rwc"),
            settings.pool.max_connections,
        ),
    };

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(settings.pool.acquire_timeout_secs))
        .sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
