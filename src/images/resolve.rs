// cardsynctool/src/images/resolve.rs
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::remote::types::CardRecord;

/// Hosted size of a card image. Destination keys are namespaced per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageVariant {
    Normal,
    Small,
    Cropped,
}

impl ImageVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageVariant::Normal => "normal",
            ImageVariant::Small => "small",
            ImageVariant::Cropped => "cropped",
        }
    }
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote asset to mirror: owning image id, variant and source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub image_id: i64,
    pub variant: ImageVariant,
    pub source_url: String,
}

/// Derives the distinct (image id, variant) references from the catalog.
/// Duplicate keys take the most recent definition; entries with an empty or
/// absent URL are dropped. Output is sorted by id then variant so runs are
/// reproducible.
pub fn resolve_image_references(cards: &[CardRecord]) -> Vec<ImageReference> {
    let mut by_image: BTreeMap<i64, BTreeMap<ImageVariant, String>> = BTreeMap::new();

    for card in cards {
        for image in &card.card_images {
            let variants = by_image.entry(image.id).or_default();
            variants.insert(ImageVariant::Normal, image.image_url.clone());
            variants.insert(ImageVariant::Small, image.image_url_small.clone());
            if let Some(cropped) = &image.image_url_cropped {
                variants.insert(ImageVariant::Cropped, cropped.clone());
            }
        }
    }

    by_image
        .into_iter()
        .flat_map(|(image_id, variants)| {
            variants
                .into_iter()
                .filter(|(_, url)| !url.is_empty())
                .map(move |(variant, source_url)| ImageReference {
                    image_id,
                    variant,
                    source_url,
                })
        })
        .collect()
}

/// Computes the destination key for a reference: `cards/<variant>/<basename>`.
/// Deterministic for a fixed variant and URL, so re-runs and concurrent runs
/// always target the same object.
pub fn destination_key(variant: ImageVariant, source_url: &str) -> Result<String> {
    let basename = image_basename(source_url)?;
    Ok(format!("cards/{}/{}", variant.as_str(), basename))
}

/// The source URL's final path segment, also used as the staging filename.
pub fn image_basename(source_url: &str) -> Result<String> {
    let parsed = Url::parse(source_url)
        .with_context(|| format!("Invalid image URL: {}", source_url))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .with_context(|| format!("Image URL has no basename: {}", source_url))
}
