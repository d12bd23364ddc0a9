//! Song models
//!
//! `Song` mirrors a row of the `songs` table. The remaining types are request
//! and upstream payloads that are consumed once and never stored as-is.

use serde::{Deserialize, Deserializer, Serialize};

/// A persisted song row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    /// Storage-assigned identifier, immutable once assigned
    #[sqlx(rename = "song_id")]
    pub id: i32,
    #[sqlx(rename = "group_name")]
    pub group: String,
    #[sqlx(rename = "song_name")]
    pub song: String,
    /// Free-form display date (e.g. "16.07.2006")
    #[serde(rename = "releaseDate", default, skip_serializing_if = "is_blank")]
    pub release_date: Option<String>,
    /// Full text, verses separated by blank lines
    #[serde(default, skip_serializing_if = "is_blank")]
    pub lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub link: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// JSON `null` reads as "", the same as an omitted field
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Full replacement payload for `PUT /songs/:id`
///
/// Every field defaults to the empty string, so an omitted or null field
/// overwrites the stored value with "" rather than keeping it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub song: String,
    #[serde(rename = "releaseDate", default, deserialize_with = "null_as_empty")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lyrics: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
}

/// Minimal payload for `POST /songs`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub song: String,
}

impl NewSong {
    /// Both group and song name must be present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.group.trim().is_empty() && !self.song.trim().is_empty()
    }
}

/// Song details returned by the external metadata service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
    #[serde(rename = "releaseDate", default, deserialize_with = "null_as_empty")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lyrics: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
}
