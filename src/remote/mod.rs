// cardsynctool/src/remote/mod.rs
pub mod types;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use types::{ArchetypeRecord, CardRecord, CatalogResponse, VersionDescriptor};

/// Client for the remote card database. Catalog and version reads are fatal
/// on failure; per-image downloads behind [`ImageSource`] are absorbed at the
/// transfer boundary instead.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the remote's declared dataset version. The endpoint returns a
    /// one-element array; an empty array is treated as a malformed response.
    pub async fn fetch_version(&self) -> Result<VersionDescriptor> {
        let url = format!("{}/checkDBVer.php", self.base_url);
        let versions: Vec<VersionDescriptor> = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request remote version from {}", url))?
            .error_for_status()
            .context("Version check returned an error status")?
            .json()
            .await
            .context("Failed to parse remote version descriptor")?;

        versions
            .into_iter()
            .next()
            .context("Remote version endpoint returned an empty list")
    }

    /// Retrieves the entire card catalog in one structured response.
    pub async fn fetch_catalog(&self) -> Result<Vec<CardRecord>> {
        let url = format!("{}/cardinfo.php?misc=yes", self.base_url);
        let response: CatalogResponse = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request card catalog from {}", url))?
            .error_for_status()
            .context("Catalog fetch returned an error status")?
            .json()
            .await
            .context("Failed to parse card catalog")?;

        Ok(response.data)
    }

    pub async fn fetch_archetypes(&self) -> Result<Vec<ArchetypeRecord>> {
        let url = format!("{}/archetypes.php", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request archetypes from {}", url))?
            .error_for_status()
            .context("Archetype fetch returned an error status")?
            .json()
            .await
            .context("Failed to parse archetype list")
    }
}

/// Source of raw asset bytes, separated from the catalog client so the
/// transfer path can be exercised against a fake.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Streams the asset at `url` into `destination`.
    async fn download(&self, url: &str, destination: &Path) -> Result<()>;
}

#[async_trait]
impl ImageSource for ApiClient {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request image {}", url))?
            .error_for_status()
            .with_context(|| format!("Image download returned an error status for {}", url))?;

        let mut file = tokio::fs::File::create(destination)
            .await
            .with_context(|| format!("Failed to create staging file {}", destination.display()))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.with_context(|| format!("Failed while streaming {}", url))?;
            file.write_all(&bytes)
                .await
                .with_context(|| format!("Failed to write staging file {}", destination.display()))?;
        }
        file.flush()
            .await
            .with_context(|| format!("Failed to flush staging file {}", destination.display()))?;

        Ok(())
    }
}
