// cardsynctool/src/cards/upsert.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::analytics::RunAnalytics;
use crate::remote::types::CardRecord;

/// Relational home of the card catalog.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Inserts the card, or overwrites all mutable fields in place when a
    /// row with the same id already exists.
    async fn upsert_card(&self, card: &CardRecord) -> Result<()>;
}

/// Applies the whole catalog item by item. Each card's outcome is isolated:
/// a failed upsert is counted and logged with its identifier, and the loop
/// moves on to the next card. No transaction spans the catalog.
pub async fn upsert_catalog<S: CardStore + ?Sized>(
    store: &S,
    cards: &[CardRecord],
    analytics: &RunAnalytics,
) {
    analytics.set_total(cards.len());

    for (index, card) in cards.iter().enumerate() {
        match store.upsert_card(card).await {
            Ok(()) => analytics.mark_processed(),
            Err(err) => {
                analytics.mark_failed(card.id.to_string());
                eprintln!("❌ Failed to upsert card {} ({}): {:#}", card.id, card.name, err);
            }
        }

        let done = index + 1;
        if done % 500 == 0 || done == cards.len() {
            println!("   … {}/{} cards", done, cards.len());
        }
    }
}

pub struct PgCardStore {
    pool: PgPool,
}

impl PgCardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn upsert_card(&self, card: &CardRecord) -> Result<()> {
        let image_ids: Vec<i64> = card.card_images.iter().map(|image| image.id).collect();
        let formats: Option<Vec<String>> = card.misc().map(|misc| misc.formats.clone());
        let konami_id: Option<i64> = card.misc().and_then(|misc| misc.konami_id);

        sqlx::query(
            r#"
            INSERT INTO cards (
                id, name, type, description, frame_type, attack, defense,
                level, typeline, attribute, archetype, race, card_sets,
                formats, konami_id, card_prices, card_images, banlist_info
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18
            )
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                type = EXCLUDED.type,
                description = EXCLUDED.description,
                frame_type = EXCLUDED.frame_type,
                attack = EXCLUDED.attack,
                defense = EXCLUDED.defense,
                level = EXCLUDED.level,
                typeline = EXCLUDED.typeline,
                attribute = EXCLUDED.attribute,
                archetype = EXCLUDED.archetype,
                race = EXCLUDED.race,
                card_sets = EXCLUDED.card_sets,
                formats = EXCLUDED.formats,
                konami_id = EXCLUDED.konami_id,
                card_prices = EXCLUDED.card_prices,
                card_images = EXCLUDED.card_images,
                banlist_info = EXCLUDED.banlist_info
            "#,
        )
        .bind(card.id)
        .bind(&card.name)
        .bind(&card.card_type)
        .bind(&card.desc)
        .bind(&card.frame_type)
        .bind(card.atk)
        .bind(card.def)
        .bind(card.level)
        .bind(&card.typeline)
        .bind(&card.attribute)
        .bind(&card.archetype)
        .bind(&card.race)
        .bind(&card.card_sets)
        .bind(formats)
        .bind(konami_id)
        .bind(&card.card_prices)
        .bind(image_ids)
        .bind(&card.banlist_info)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Upsert failed for card id {}", card.id))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn card(id: i64, name: &str) -> CardRecord {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "type": "Normal Monster",
            "frameType": "normal",
            "desc": "A test card.",
        }))
        .expect("card fixture should parse")
    }

    /// In-memory card store keyed by id; ids listed in `poisoned` fail.
    #[derive(Default)]
    struct FakeCardStore {
        rows: Mutex<BTreeMap<i64, String>>,
        poisoned: Vec<i64>,
    }

    #[async_trait]
    impl CardStore for FakeCardStore {
        async fn upsert_card(&self, card: &CardRecord) -> Result<()> {
            if self.poisoned.contains(&card.id) {
                anyhow::bail!("simulated store failure");
            }
            self.rows.lock().unwrap().insert(card.id, card.name.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reingest_overwrites_without_duplicating() {
        let store = FakeCardStore::default();
        let analytics = RunAnalytics::new();

        upsert_catalog(&store, &[card(1, "First Name")], &analytics).await;
        upsert_catalog(&store, &[card(1, "Second Name")], &analytics).await;

        let rows = store.rows.lock().unwrap().clone();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.get(&1).map(String::as_str), Some("Second Name"));
    }

    #[tokio::test]
    async fn test_one_bad_card_does_not_stop_the_pass() {
        let store = FakeCardStore {
            poisoned: vec![2],
            ..FakeCardStore::default()
        };
        let analytics = RunAnalytics::new();
        let cards = vec![card(1, "Alpha"), card(2, "Broken"), card(3, "Gamma")];

        upsert_catalog(&store, &cards, &analytics).await;

        let rows = store.rows.lock().unwrap().clone();
        assert_eq!(rows.len(), 2);
        let snapshot = analytics.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.failed_sources, vec!["2"]);
    }
}
