// cardsynctool/src/seed/data.rs

/// Tag titles that exist independently of any archetype.
pub const BASE_TAGS: &[&str] = &[
    "Interruption",
    "Monster",
    "Spell",
    "Trap",
    "Effect",
    "Normal",
    "Fusion",
    "Ritual",
    "Synchro",
    "Xyz",
    "Pendulum",
    "Link",
    "Continuous",
    "Counter",
    "Quick-Play",
    "Equip",
    "Field",
];

// ("object key or filename", "artist credit")
// TODO: Remove the AI binder once every slot has a commissioned artist.
pub const BINDERS: &[(&str, &str)] = &[
    ("binder.webp", "AI"),
    ("vintage_binder.jpg", "Elina Shepherd/@elinasheph.bsky.social"),
    ("blue_warp.jpg", "Ava James/@avajame.bsky.social"),
];

pub const AVATARS: &[(&str, &str)] = &[];
