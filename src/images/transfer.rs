// cardsynctool/src/images/transfer.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::analytics::RunAnalytics;
use crate::images::resolve::{self, ImageReference};
use crate::images::s3_store::ImageDestination;
use crate::images::scheduler::TaskOutcome;
use crate::remote::ImageSource;

/// All mirrored card images are JPEGs upstream.
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Staging file that is removed on every exit path, success or error.
struct StagingFile {
    path: PathBuf,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        // May not exist if the download never started; nothing to do then.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Mirrors one asset: skip when the destination already has it, otherwise
/// download to staging and upload. Every error is absorbed here — the caller
/// only ever sees an outcome plus the analytics side effect, which is what
/// lets the scheduler batch these safely.
pub async fn transfer_image<S, D>(
    source: &S,
    destination: &D,
    staging_root: &Path,
    reference: &ImageReference,
    analytics: &RunAnalytics,
) -> TaskOutcome
where
    S: ImageSource + ?Sized,
    D: ImageDestination + ?Sized,
{
    let outcome = match try_transfer(source, destination, staging_root, reference).await {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("❌ Failed to process image {}: {:#}", reference.source_url, err);
            analytics.mark_failed(reference.source_url.clone());
            TaskOutcome::Failed
        }
    };

    match outcome {
        TaskOutcome::Skipped => analytics.mark_skipped(),
        TaskOutcome::Completed => analytics.mark_processed(),
        TaskOutcome::Failed => {} // already recorded above
    }
    analytics.bump_total();

    outcome
}

async fn try_transfer<S, D>(
    source: &S,
    destination: &D,
    staging_root: &Path,
    reference: &ImageReference,
) -> Result<TaskOutcome>
where
    S: ImageSource + ?Sized,
    D: ImageDestination + ?Sized,
{
    let key = resolve::destination_key(reference.variant, &reference.source_url)?;

    if destination.exists(&key).await? {
        return Ok(TaskOutcome::Skipped);
    }

    let staging_dir = staging_root.join(reference.variant.as_str());
    tokio::fs::create_dir_all(&staging_dir)
        .await
        .with_context(|| format!("Failed to create staging directory {}", staging_dir.display()))?;

    // Basename is unique per variant upstream, so concurrent tasks never
    // collide on disk.
    let basename = resolve::image_basename(&reference.source_url)?;
    let staged = StagingFile::new(staging_dir.join(basename));

    source.download(&reference.source_url, staged.path()).await?;
    destination
        .put_file(&key, staged.path(), IMAGE_CONTENT_TYPE)
        .await?;

    Ok(TaskOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::resolve::ImageVariant;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        downloads: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ImageSource for FakeSource {
        async fn download(&self, url: &str, destination: &Path) -> Result<()> {
            if self.fail {
                anyhow::bail!("simulated download failure");
            }
            tokio::fs::write(destination, b"jpeg-bytes").await?;
            self.downloads.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeDestination {
        existing: BTreeSet<String>,
        stored: Mutex<BTreeMap<String, String>>,
        check_fails: bool,
    }

    #[async_trait]
    impl ImageDestination for FakeDestination {
        async fn exists(&self, key: &str) -> Result<bool> {
            if self.check_fails {
                anyhow::bail!("simulated existence-check outage");
            }
            Ok(self.existing.contains(key) || self.stored.lock().unwrap().contains_key(key))
        }

        async fn put_file(&self, key: &str, file_path: &Path, content_type: &str) -> Result<()> {
            assert!(file_path.exists(), "staged file must exist during upload");
            self.stored
                .lock()
                .unwrap()
                .insert(key.to_string(), content_type.to_string());
            Ok(())
        }
    }

    fn reference(url: &str) -> ImageReference {
        ImageReference {
            image_id: 100,
            variant: ImageVariant::Normal,
            source_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_existing_key_is_skipped_without_download() {
        let source = FakeSource::default();
        let destination = FakeDestination {
            existing: BTreeSet::from(["cards/normal/100.jpg".to_string()]),
            ..FakeDestination::default()
        };
        let staging = tempfile::tempdir().unwrap();
        let analytics = RunAnalytics::new();

        let outcome = transfer_image(
            &source,
            &destination,
            staging.path(),
            &reference("https://images.test/cards/100.jpg"),
            &analytics,
        )
        .await;

        assert_eq!(outcome, TaskOutcome::Skipped);
        assert!(source.downloads.lock().unwrap().is_empty());
        assert!(destination.stored.lock().unwrap().is_empty());
        let snapshot = analytics.snapshot();
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.total, 1);
    }

    #[tokio::test]
    async fn test_absent_key_is_downloaded_uploaded_and_staging_cleared() {
        let source = FakeSource::default();
        let destination = FakeDestination::default();
        let staging = tempfile::tempdir().unwrap();
        let analytics = RunAnalytics::new();

        let outcome = transfer_image(
            &source,
            &destination,
            staging.path(),
            &reference("https://images.test/cards/100.jpg"),
            &analytics,
        )
        .await;

        assert_eq!(outcome, TaskOutcome::Completed);
        let stored = destination.stored.lock().unwrap().clone();
        assert_eq!(
            stored.get("cards/normal/100.jpg").map(String::as_str),
            Some(IMAGE_CONTENT_TYPE)
        );
        assert!(
            !staging.path().join("normal/100.jpg").exists(),
            "staging file must be removed after upload"
        );
        assert_eq!(analytics.snapshot().processed, 1);
    }

    #[tokio::test]
    async fn test_check_outage_is_absorbed_as_failed() {
        let source = FakeSource::default();
        let destination = FakeDestination {
            check_fails: true,
            ..FakeDestination::default()
        };
        let staging = tempfile::tempdir().unwrap();
        let analytics = RunAnalytics::new();

        let outcome = transfer_image(
            &source,
            &destination,
            staging.path(),
            &reference("https://images.test/cards/100.jpg"),
            &analytics,
        )
        .await;

        assert_eq!(outcome, TaskOutcome::Failed);
        let snapshot = analytics.snapshot();
        assert_eq!(snapshot.failed, 1);
        assert_eq!(
            snapshot.failed_sources,
            vec!["https://images.test/cards/100.jpg"]
        );
    }

    #[tokio::test]
    async fn test_download_failure_leaves_no_staging_file() {
        let source = FakeSource {
            fail: true,
            ..FakeSource::default()
        };
        let destination = FakeDestination::default();
        let staging = tempfile::tempdir().unwrap();
        let analytics = RunAnalytics::new();

        let outcome = transfer_image(
            &source,
            &destination,
            staging.path(),
            &reference("https://images.test/cards/100.jpg"),
            &analytics,
        )
        .await;

        assert_eq!(outcome, TaskOutcome::Failed);
        assert!(!staging.path().join("normal/100.jpg").exists());
        assert!(destination.stored.lock().unwrap().is_empty());
    }
}
