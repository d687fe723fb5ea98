// cardsynctool/src/seed/logic.rs
use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashSet;
use std::time::Duration;

use crate::analytics::RunAnalytics;
use crate::config::SeedConfig;
use crate::remote::ApiClient;
use crate::seed::data;
use crate::images::scheduler::{self, TaskOutcome};
use crate::utils::setting::check_db_connection;

/// One static record to ensure exists.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SeedRecord {
    Binder { s3_key: String, artist: String },
    Avatar { filename: String, artist: String },
}

/// Seeds the tag table from the base list plus the remote archetype names,
/// and the binder/avatar tables from the static lists. Existing records are
/// skipped; the binder/avatar inserts run through the bounded batch
/// scheduler so each record reports its own outcome.
pub async fn perform_seed(config: &SeedConfig) -> Result<()> {
    println!("🚀 Starting seed process");

    if !check_db_connection(&config.database_url).await {
        anyhow::bail!("Cannot proceed with seeding - database connection failed");
    }

    let api = ApiClient::new(&config.api_base_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the card database")?;

    let result = seed_all(&api, &pool, config.batch_size).await;
    pool.close().await;
    result
}

async fn seed_all(api: &ApiClient, pool: &PgPool, batch_size: usize) -> Result<()> {
    let analytics = RunAnalytics::new();

    seed_tags(api, pool, &analytics).await?;
    seed_images(pool, batch_size, &analytics).await;

    analytics.report();
    Ok(())
}

/// Tag titles come from the static base list plus every archetype the
/// remote declares, first occurrence wins, insertion order preserved.
async fn seed_tags(api: &ApiClient, pool: &PgPool, analytics: &RunAnalytics) -> Result<()> {
    println!("Generating tags...");
    let archetypes = api.fetch_archetypes().await?;

    let mut seen = HashSet::new();
    let mut titles: Vec<String> = Vec::new();
    for title in data::BASE_TAGS
        .iter()
        .map(|tag| tag.to_string())
        .chain(archetypes.into_iter().map(|a| a.archetype_name))
    {
        if seen.insert(title.clone()) {
            titles.push(title);
        }
    }

    println!("Seeding {} tags...", titles.len());
    for title in &titles {
        match ensure_tag(pool, title).await {
            Ok(outcome) => match outcome {
                TaskOutcome::Skipped => analytics.mark_skipped(),
                _ => analytics.mark_processed(),
            },
            Err(err) => {
                analytics.mark_failed(title.clone());
                eprintln!("❌ Failed to seed tag {}: {:#}", title, err);
            }
        }
        analytics.bump_total();
    }

    Ok(())
}

async fn seed_images(pool: &PgPool, batch_size: usize, analytics: &RunAnalytics) {
    let records: Vec<SeedRecord> = data::BINDERS
        .iter()
        .map(|(s3_key, artist)| SeedRecord::Binder {
            s3_key: s3_key.to_string(),
            artist: artist.to_string(),
        })
        .chain(data::AVATARS.iter().map(|(filename, artist)| {
            SeedRecord::Avatar {
                filename: filename.to_string(),
                artist: artist.to_string(),
            }
        }))
        .collect();

    println!("Seeding {} binder/avatar records...", records.len());
    scheduler::run_in_batches(&records, batch_size, Duration::from_millis(0), |record| {
        async move {
            match ensure_seed_record(pool, &record).await {
                Ok(outcome) => {
                    match outcome {
                        TaskOutcome::Skipped => analytics.mark_skipped(),
                        _ => analytics.mark_processed(),
                    }
                    analytics.bump_total();
                    Ok(outcome)
                }
                Err(err) => {
                    let identifier = match &record {
                        SeedRecord::Binder { s3_key, .. } => s3_key.clone(),
                        SeedRecord::Avatar { filename, .. } => filename.clone(),
                    };
                    eprintln!("❌ Failed to seed record {}: {:#}", identifier, err);
                    analytics.mark_failed(identifier);
                    analytics.bump_total();
                    Ok(TaskOutcome::Failed)
                }
            }
        }
    })
    .await;
}

async fn ensure_tag(pool: &PgPool, title: &str) -> Result<TaskOutcome> {
    let existing = sqlx::query("SELECT 1 FROM tags WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to look up tag {}", title))?;

    if existing.is_some() {
        return Ok(TaskOutcome::Skipped);
    }

    sqlx::query("INSERT INTO tags (title) VALUES ($1)")
        .bind(title)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert tag {}", title))?;

    Ok(TaskOutcome::Completed)
}

async fn ensure_seed_record(pool: &PgPool, record: &SeedRecord) -> Result<TaskOutcome> {
    match record {
        SeedRecord::Binder { s3_key, artist } => {
            let existing = sqlx::query("SELECT 1 FROM binder_images WHERE s3_key = $1")
                .bind(s3_key)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("Failed to look up binder {}", s3_key))?;

            if existing.is_some() {
                return Ok(TaskOutcome::Skipped);
            }

            sqlx::query("INSERT INTO binder_images (s3_key, artist) VALUES ($1, $2)")
                .bind(s3_key)
                .bind(artist)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to insert binder {}", s3_key))?;
        }
        SeedRecord::Avatar { filename, artist } => {
            let existing = sqlx::query("SELECT 1 FROM avatars WHERE filename = $1")
                .bind(filename)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("Failed to look up avatar {}", filename))?;

            if existing.is_some() {
                return Ok(TaskOutcome::Skipped);
            }

            sqlx::query("INSERT INTO avatars (filename, artist) VALUES ($1, $2)")
                .bind(filename)
                .bind(artist)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to insert avatar {}", filename))?;
        }
    }

    Ok(TaskOutcome::Completed)
}
