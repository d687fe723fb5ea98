// cardsynctool/src/remote/types.rs
use serde::Deserialize;

/// Envelope of the full-catalog endpoint: `{ "data": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    pub data: Vec<CardRecord>,
}

/// One card as declared by the remote catalog. Structured fields the local
/// store does not interpret (sets, prices, banlist) are carried verbatim as
/// JSON values.
#[derive(Debug, Clone, Deserialize)]
pub struct CardRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub desc: String,
    #[serde(rename = "frameType")]
    pub frame_type: String,
    pub atk: Option<i32>,
    pub def: Option<i32>,
    pub level: Option<i32>,
    pub typeline: Option<Vec<String>>,
    pub attribute: Option<String>,
    pub archetype: Option<String>,
    pub race: Option<String>,
    pub card_sets: Option<serde_json::Value>,
    pub card_prices: Option<serde_json::Value>,
    pub banlist_info: Option<serde_json::Value>,
    #[serde(default)]
    pub misc_info: Vec<MiscInfo>,
    #[serde(default)]
    pub card_images: Vec<CardImage>,
}

impl CardRecord {
    /// The extra metadata block is a one-element array when requested with
    /// `misc=yes`; absent otherwise.
    pub fn misc(&self) -> Option<&MiscInfo> {
        self.misc_info.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiscInfo {
    #[serde(default)]
    pub formats: Vec<String>,
    pub konami_id: Option<i64>,
}

/// Image descriptor attached to a card: one id, one URL per variant.
#[derive(Debug, Clone, Deserialize)]
pub struct CardImage {
    pub id: i64,
    pub image_url: String,
    pub image_url_small: String,
    pub image_url_cropped: Option<String>,
}

/// The version-check endpoint returns a one-element array of these.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionDescriptor {
    pub database_version: String,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchetypeRecord {
    pub archetype_name: String,
}
