use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sdqa_core::persistence::MemoryRatingStore;
use sdqa_db::PgRatingStore;
use sdqa_worker::config::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sdqa_worker=debug,sdqa_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env()?;
    tracing::info!(
        input = %config.input_path.display(),
        persist = config.database_url.is_some(),
        "Loaded worker configuration"
    );

    // --- Run ---
    let summary = match &config.database_url {
        Some(database_url) => {
            let pool = sdqa_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            sdqa_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            if config.run_migrations {
                sdqa_db::run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            let store = PgRatingStore::new(pool);
            sdqa_worker::run(&config, &store).await?
        }
        None => {
            tracing::warn!("DATABASE_URL not set, ratings are kept in memory only");
            let store = MemoryRatingStore::new();
            sdqa_worker::run(&config, &store).await?
        }
    };

    for (key, rows) in &summary.persisted {
        tracing::info!(key = %key, rows, "Ratings persisted");
    }
    if let Some(e) = summary.failure {
        return Err(e).context("SDQA stage failed");
    }
    if !summary.persist_failures.is_empty() {
        let keys: Vec<&str> = summary.persist_failures.iter().map(|(k, _)| k.as_str()).collect();
        anyhow::bail!("Failed to persist ratings under {}", keys.join(", "));
    }
    Ok(())
}
