//! Card Database Sync Tool
//!
//! Mirrors a remote card-game catalog into Postgres and rehosts the
//! referenced card images into S3-compatible object storage, gated on the
//! remote's declared dataset version so unchanged data is never re-fetched
//! or re-uploaded.

pub mod analytics;
pub mod cards;
pub mod config;
pub mod images;
pub mod remote;
pub mod seed;
pub mod utils;
pub mod version;
