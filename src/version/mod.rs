// cardsynctool/src/version/mod.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Storage of the single "current dataset version" record.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// The most recent recorded version, if any.
    async fn latest(&self) -> Result<Option<String>>;

    async fn insert(&self, version: &str, checked_at: DateTime<Utc>) -> Result<()>;

    /// Updates the record currently holding `previous`, returning the number
    /// of rows affected. Zero rows is not an error; the gate branches on it.
    async fn update(
        &self,
        previous: &str,
        version: &str,
        checked_at: DateTime<Utc>,
    ) -> Result<u64>;
}

/// Decides whether a sync run is needed, recording the remote version as a
/// side effect. Returns true on the first run and whenever the remote
/// version differs from the stored one.
///
/// A concurrent run may delete or replace the record between our read and
/// our update; an update that matches zero rows falls back to inserting a
/// fresh record instead of failing.
pub async fn should_run<S: VersionStore + ?Sized>(store: &S, remote_version: &str) -> Result<bool> {
    let checked_at = Utc::now();

    match store.latest().await? {
        None => {
            store.insert(remote_version, checked_at).await?;
            Ok(true)
        }
        Some(current) if current != remote_version => {
            let affected = store.update(&current, remote_version, checked_at).await?;
            if affected == 0 {
                store.insert(remote_version, checked_at).await?;
            }
            Ok(true)
        }
        Some(_) => Ok(false),
    }
}

/// Production implementation over the `db_info` table.
pub struct PgVersionStore {
    pool: PgPool,
}

impl PgVersionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionStore for PgVersionStore {
    async fn latest(&self) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT downloaded_version FROM db_info ORDER BY downloaded_version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to read the recorded dataset version")
    }

    async fn insert(&self, version: &str, checked_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO db_info (downloaded_version, last_updated) VALUES ($1, $2)")
            .bind(version)
            .bind(checked_at)
            .execute(&self.pool)
            .await
            .context("Failed to insert the dataset version record")?;
        Ok(())
    }

    async fn update(
        &self,
        previous: &str,
        version: &str,
        checked_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE db_info SET downloaded_version = $2, last_updated = $3 WHERE downloaded_version = $1",
        )
        .bind(previous)
        .bind(version)
        .bind(checked_at)
        .execute(&self.pool)
        .await
        .context("Failed to update the dataset version record")?;

        Ok(result.rows_affected())
    }
}
