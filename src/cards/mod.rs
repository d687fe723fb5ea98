// cardsynctool/src/cards/mod.rs
pub(crate) mod logic;
pub mod upsert;

use anyhow::Result;
use crate::config::AppConfig;

/// Public entry point for the card catalog sync.
pub async fn run_cards_flow(app_config: &AppConfig) -> Result<()> {
    let card_config = match &app_config.operation {
        Some(crate::config::OperationConfig::Cards(cfg)) => cfg,
        _ => anyhow::bail!("Card sync selected but no card sync configuration found."),
    };

    logic::perform_card_sync(card_config).await
}
