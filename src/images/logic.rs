// cardsynctool/src/images/logic.rs
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tempfile::Builder as TempFileBuilder;

use crate::analytics::RunAnalytics;
use crate::config::{ImageSyncConfig, SpacesConfig};
use crate::images::resolve;
use crate::images::s3_store::S3ImageStore;
use crate::images::scheduler;
use crate::images::transfer;
use crate::remote::ApiClient;
use crate::utils::setting::check_db_connection;
use crate::version::{self, PgVersionStore};

/// Orchestrates the image rehosting run: version gate, catalog fetch, asset
/// resolution, batched deduplicating transfer, final report. The pool is
/// released exactly once on every path; the staging tree lives in a temp
/// directory that is removed when the run ends.
pub async fn perform_image_sync(config: &ImageSyncConfig, spaces: &SpacesConfig) -> Result<()> {
    println!("🚀 Starting image rehosting process");

    if !check_db_connection(&config.database_url).await {
        anyhow::bail!("Cannot proceed with image sync - database connection failed");
    }

    let api = ApiClient::new(&config.api_base_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the card database")?;

    let result = mirror_images(&api, &pool, config, spaces).await;
    pool.close().await;
    result
}

async fn mirror_images(
    api: &ApiClient,
    pool: &PgPool,
    config: &ImageSyncConfig,
    spaces: &SpacesConfig,
) -> Result<()> {
    println!("Checking DB versions...");
    let remote = api.fetch_version().await?;

    let version_store = PgVersionStore::new(pool.clone());
    if !version::should_run(&version_store, &remote.database_version).await? {
        println!("No new data to fetch...");
        return Ok(());
    }

    println!("Fetching image URLs...");
    let cards = api.fetch_catalog().await?;
    let references = resolve::resolve_image_references(&cards);
    println!("Total images to process: {}", references.len());

    let destination = S3ImageStore::connect(spaces).await;
    let staging = TempFileBuilder::new()
        .prefix("card_images_")
        .tempdir()
        .context("Failed to create staging directory for image transfers")?;

    let analytics = RunAnalytics::new();
    let staging_path = staging.path();
    let destination_ref = &destination;
    let analytics_ref = &analytics;
    let pause = Duration::from_millis(config.batch_pause_ms);

    let report = scheduler::run_in_batches(&references, config.batch_size, pause, |reference| {
        async move {
            let outcome = transfer::transfer_image(
                api,
                destination_ref,
                staging_path,
                &reference,
                analytics_ref,
            )
            .await;
            Ok(outcome)
        }
    })
    .await;

    println!("All images have been processed and uploaded.");
    if report.batch_failures > 0 {
        eprintln!(
            "⚠️ {} of {} batches hit an unexpected failure; see the log above.",
            report.batch_failures, report.batches
        );
    }
    analytics.report();
    Ok(())
}
