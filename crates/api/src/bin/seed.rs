//! Populate the database with the sample categories, user and listing.
//!
//! Safe to run repeatedly; existing rows are left as they are.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use piata_api::auth::password::{hash_password, verify_password, SEED_PASSWORD};
use piata_db::repositories::UserRepo;
use piata_db::seed::{seed_sample_data, SAMPLE_USERNAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "piata_db=info,piata_seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = piata_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    piata_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let password_hash = hash_password(SEED_PASSWORD)
        .map_err(|e| anyhow::anyhow!("Failed to hash seed password: {e}"))?;

    let report = seed_sample_data(&pool, &password_hash)
        .await
        .context("Seeding failed")?;

    if report.is_noop() {
        tracing::info!("Sample data already present, nothing created");
    }

    if let Some(user) = UserRepo::find_by_username(&pool, SAMPLE_USERNAME).await? {
        let matches = verify_password(SEED_PASSWORD, &user.password_hash).unwrap_or(false);
        if !matches {
            tracing::warn!(
                username = SAMPLE_USERNAME,
                "Existing sample user has a different password"
            );
        }
    }

    pool.close().await;
    Ok(())
}
