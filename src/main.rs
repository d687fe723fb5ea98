//! Card Database Sync Tool
//!
//! Provides CLI interface for the card catalog sync, image rehosting and
//! seed operations.

// cardsynctool/src/main.rs
use anyhow::{Context, Result};
use cardsynctool::cards;
use cardsynctool::config::{
    AppConfig, OperationConfig, load_card_sync_config_from_json,
    load_image_sync_config_from_json, load_seed_config_from_json,
};
use cardsynctool::images;
use cardsynctool::seed;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Main entry point for the sync tool
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => {
            println!("✅ Operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    // DATABASE_URL may live in a .env file next to the executable.
    dotenv::dotenv().ok();

    // Define the path to config.json. Expects it in the same directory as
    // the executable or the project root if running with `cargo run`.
    let config_path = PathBuf::from("config.json");
    let mut app_config = AppConfig::load_from_json(&config_path)
        .context(format!("Failed to load application configuration from {}", config_path.display()))?;

    let args: Vec<String> = env::args().collect();
    let choice = if args.len() > 1 {
        args[1].trim().to_string()
    } else {
        prompt_choice()?
    };

    let spaces_is_configured = app_config.spaces_config.is_some();

    match choice.as_str() {
        "1" | "cards" => {
            println!("🚀 Starting Card Catalog Sync...");
            let card_config = load_card_sync_config_from_json(&app_config.raw_json_config)
                .context("Failed to load card sync configuration from JSON")?;
            app_config.operation = Some(OperationConfig::Cards(card_config));
            cards::run_cards_flow(&app_config).await
                .context("Card sync process failed")?;
        }
        "2" | "images" => {
            println!("🖼 Starting Image Rehosting...");
            let image_config = load_image_sync_config_from_json(&app_config.raw_json_config, spaces_is_configured)
                .context("Failed to load image sync configuration from JSON")?;
            app_config.operation = Some(OperationConfig::Images(image_config));
            images::run_images_flow(&app_config).await
                .context("Image rehosting process failed")?;
        }
        "3" | "seed" => {
            println!("🌱 Starting Seed Process...");
            let seed_config = load_seed_config_from_json(&app_config.raw_json_config)
                .context("Failed to load seed configuration from JSON")?;
            app_config.operation = Some(OperationConfig::Seed(seed_config));
            seed::run_seed_flow(&app_config).await
                .context("Seed process failed")?;
        }
        _ => {
            println!("❌ Invalid choice. Please enter '1' (cards), '2' (images), or '3' (seed).");
            anyhow::bail!("Invalid operation choice");
        }
    }
    Ok(())
}

/// Prompts user to select an operation
///
/// Returns the user's choice as String
fn prompt_choice() -> Result<String> {
    use std::io::{stdin, stdout, Write};

    println!("Select an operation:");
    println!("1. Sync Card Catalog (or type 'cards')");
    println!("2. Rehost Card Images (or type 'images')");
    println!("3. Seed Tags and Binder Images (or type 'seed')");
    print!("Enter your choice: ");
    let _ = stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    stdin().read_line(&mut input).context("Failed to read user input")?;
    Ok(input.trim().to_string())
}
