// cardsynctool/src/cards/logic.rs
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::analytics::RunAnalytics;
use crate::cards::upsert::{self, PgCardStore};
use crate::config::CardSyncConfig;
use crate::remote::ApiClient;
use crate::utils::setting::check_db_connection;
use crate::version::{self, PgVersionStore};

/// Orchestrates the card catalog sync: version gate, full fetch, per-card
/// upsert, final report. The pool is released exactly once, on every path,
/// including the "no update needed" early exit.
pub async fn perform_card_sync(config: &CardSyncConfig) -> Result<()> {
    println!("🚀 Starting card catalog sync");

    if !check_db_connection(&config.database_url).await {
        anyhow::bail!("Cannot proceed with card sync - database connection failed");
    }

    let api = ApiClient::new(&config.api_base_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the card database")?;

    let result = sync_cards(&api, &pool).await;
    pool.close().await;
    result
}

async fn sync_cards(api: &ApiClient, pool: &PgPool) -> Result<()> {
    println!("Checking DB versions...");
    let remote = api.fetch_version().await?;

    let version_store = PgVersionStore::new(pool.clone());
    if !version::should_run(&version_store, &remote.database_version).await? {
        println!("No new data to fetch...");
        return Ok(());
    }

    println!("Fetching cards...");
    let cards = api.fetch_catalog().await?;
    println!("Copying {} cards...", cards.len());

    let analytics = RunAnalytics::new();
    let store = PgCardStore::new(pool.clone());
    upsert::upsert_catalog(&store, &cards, &analytics).await;

    analytics.report();
    Ok(())
}
