// cardsynctool/src/images/mod.rs
pub(crate) mod logic;
pub mod resolve;
pub mod s3_store;
pub mod scheduler;
pub mod transfer;

use anyhow::Result;
use crate::config::AppConfig;

/// Public entry point for the image rehosting process.
pub async fn run_images_flow(app_config: &AppConfig) -> Result<()> {
    let image_config = match &app_config.operation {
        Some(crate::config::OperationConfig::Images(cfg)) => cfg,
        _ => anyhow::bail!("Image sync selected but no image sync configuration found."),
    };

    let spaces_config = app_config
        .spaces_config
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Image sync requires a configured s3_storage block."))?;

    logic::perform_image_sync(image_config, spaces_config).await
}
