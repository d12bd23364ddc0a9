//! # Song Library Common
//!
//! Shared code for the song library service:
//! - Song models and request payloads
//! - Storage connector (pool, connectivity check, song queries)
//! - Error types

pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{NewSong, Song, SongDetail, SongPayload};
