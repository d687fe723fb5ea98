// cardsynctool/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Default remote API root (the YGOPRODeck v7 endpoints).
pub const DEFAULT_API_BASE_URL: &str = "https://db.ygoprodeck.com/api/v7";

/// Batch size and inter-batch pause used by the image mirror when the
/// config file does not override them.
pub const DEFAULT_BATCH_SIZE: usize = 19;
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 1000;

// Structs for deserializing config.json
#[derive(Debug, Clone, Deserialize)]
pub struct JsonS3StorageConfig {
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub folder_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawJsonConfig {
    pub database_url: Option<String>,
    pub api_base_url: Option<String>,
    pub batch_size: Option<usize>,
    pub batch_pause_ms: Option<u64>,
    pub s3_storage: Option<JsonS3StorageConfig>,
}

// Application's internal configuration structs
#[derive(Debug, Clone)]
pub struct SpacesConfig {
    pub endpoint_url: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub folder_prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CardSyncConfig {
    pub database_url: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct ImageSyncConfig {
    pub database_url: String,
    pub api_base_url: String,
    pub batch_size: usize,
    pub batch_pause_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub database_url: String,
    pub api_base_url: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub enum OperationConfig {
    Cards(CardSyncConfig),
    Images(ImageSyncConfig),
    Seed(SeedConfig),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub operation: Option<OperationConfig>,
    pub spaces_config: Option<SpacesConfig>,
    pub raw_json_config: RawJsonConfig,
}

impl AppConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw_json_config: RawJsonConfig = serde_json::from_str(&config_content)
            .with_context(|| {
                format!(
                    "Failed to parse JSON from config file at {}",
                    config_path.display()
                )
            })?;

        let spaces_config = build_spaces_config(&raw_json_config);

        Ok(AppConfig {
            operation: None, // To be filled by main after parsing CLI args
            spaces_config,
            raw_json_config,
        })
    }
}

fn build_spaces_config(raw_json_config: &RawJsonConfig) -> Option<SpacesConfig> {
    raw_json_config.s3_storage.as_ref().and_then(|s3_raw| {
        if let (
            Some(bucket),
            Some(region),
            Some(key_id),
            Some(secret),
            Some(endpoint),
        ) = (
            s3_raw.bucket_name.as_ref().filter(|s| !s.is_empty()),
            s3_raw.region.as_ref().filter(|s| !s.is_empty()),
            s3_raw.access_key_id.as_ref().filter(|s| !s.is_empty()),
            s3_raw.secret_access_key.as_ref().filter(|s| !s.is_empty()),
            s3_raw.endpoint_url.as_ref().filter(|s| !s.is_empty()),
        ) {
            Some(SpacesConfig {
                bucket_name: bucket.clone(),
                region: region.clone(),
                access_key_id: key_id.clone(),
                secret_access_key: secret.clone(),
                endpoint_url: endpoint.clone(),
                folder_prefix: s3_raw.folder_prefix.clone().filter(|s| !s.is_empty()),
            })
        } else {
            if s3_raw.bucket_name.is_some()
                || s3_raw.region.is_some()
                || s3_raw.access_key_id.is_some()
                || s3_raw.secret_access_key.is_some()
                || s3_raw.endpoint_url.is_some()
            {
                // Only print warning if some S3 fields were provided but were incomplete/empty
                println!("S3 configuration is present in config.json but some required fields (bucket_name, region, access_key_id, secret_access_key, endpoint_url) are missing or empty. Image mirroring will be disabled.");
            }
            None
        }
    })
}

/// Resolves the database URL from config.json, falling back to the
/// DATABASE_URL environment variable (loaded from .env by main).
fn resolve_database_url(raw_config: &RawJsonConfig) -> Result<String> {
    raw_config
        .database_url
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()))
        .context("database_url must be set in config.json or via the DATABASE_URL environment variable")
}

fn resolve_api_base_url(raw_config: &RawJsonConfig) -> String {
    raw_config
        .api_base_url
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub fn load_card_sync_config_from_json(raw_config: &RawJsonConfig) -> Result<CardSyncConfig> {
    Ok(CardSyncConfig {
        database_url: resolve_database_url(raw_config)?,
        api_base_url: resolve_api_base_url(raw_config),
    })
}

pub fn load_image_sync_config_from_json(
    raw_config: &RawJsonConfig,
    spaces_is_configured: bool,
) -> Result<ImageSyncConfig> {
    if !spaces_is_configured {
        return Err(anyhow::anyhow!(
            "Image mirroring requires a fully configured s3_storage block in config.json."
        ));
    }

    let batch_size = raw_config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        return Err(anyhow::anyhow!("batch_size must be greater than zero."));
    }

    Ok(ImageSyncConfig {
        database_url: resolve_database_url(raw_config)?,
        api_base_url: resolve_api_base_url(raw_config),
        batch_size,
        batch_pause_ms: raw_config.batch_pause_ms.unwrap_or(DEFAULT_BATCH_PAUSE_MS),
    })
}

pub fn load_seed_config_from_json(raw_config: &RawJsonConfig) -> Result<SeedConfig> {
    let batch_size = raw_config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        return Err(anyhow::anyhow!("batch_size must be greater than zero."));
    }

    Ok(SeedConfig {
        database_url: resolve_database_url(raw_config)?,
        api_base_url: resolve_api_base_url(raw_config),
        batch_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_from(value: serde_json::Value) -> RawJsonConfig {
        serde_json::from_value(value).expect("raw config should parse")
    }

    #[test]
    fn test_spaces_config_complete() {
        let raw = raw_from(json!({
            "database_url": "postgres://localhost/cards",
            "s3_storage": {
                "bucket_name": "card-images",
                "region": "nyc3",
                "access_key_id": "key",
                "secret_access_key": "secret",
                "endpoint_url": "https://nyc3.digitaloceanspaces.com",
                "folder_prefix": ""
            }
        }));
        let spaces = build_spaces_config(&raw).expect("complete block should build");

        assert_eq!(spaces.bucket_name, "card-images");
        assert_eq!(spaces.region, "nyc3");
        assert_eq!(spaces.folder_prefix, None); // empty prefix is dropped
    }

    #[test]
    fn test_spaces_config_incomplete_is_none() {
        let raw = raw_from(json!({
            "s3_storage": {
                "bucket_name": "card-images",
                "region": "nyc3"
            }
        }));
        assert!(build_spaces_config(&raw).is_none());
    }

    #[test]
    fn test_image_sync_defaults() -> anyhow::Result<()> {
        let raw = raw_from(json!({
            "database_url": "postgres://localhost/cards"
        }));
        let config = load_image_sync_config_from_json(&raw, true)?;

        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.batch_pause_ms, DEFAULT_BATCH_PAUSE_MS);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        Ok(())
    }

    #[test]
    fn test_image_sync_requires_spaces() {
        let raw = raw_from(json!({
            "database_url": "postgres://localhost/cards"
        }));
        assert!(load_image_sync_config_from_json(&raw, false).is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let raw = raw_from(json!({
            "database_url": "postgres://localhost/cards",
            "batch_size": 0
        }));
        assert!(load_image_sync_config_from_json(&raw, true).is_err());
        assert!(load_seed_config_from_json(&raw).is_err());
    }

    #[test]
    fn test_api_base_url_trailing_slash_trimmed() -> anyhow::Result<()> {
        let raw = raw_from(json!({
            "database_url": "postgres://localhost/cards",
            "api_base_url": "https://example.test/api/v7/"
        }));
        let config = load_card_sync_config_from_json(&raw)?;
        assert_eq!(config.api_base_url, "https://example.test/api/v7");
        Ok(())
    }
}
