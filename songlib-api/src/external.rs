//! Song metadata client
//!
//! Looks up release date, lyrics and link for a (group, song) pair:
//! `GET {base}/info?group=...&song=...` must answer 200 with
//! `{"releaseDate": ..., "lyrics": ..., "link": ...}`.

use async_trait::async_trait;
use reqwest::Client;
use songlib_common::SongDetail;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ExternalApiSettings;

/// Why a lookup produced no usable detail
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport failure, non-success status, or no service configured
    #[error("Song info unavailable: {0}")]
    Unavailable(String),

    /// Success status with a body that is not the expected JSON
    #[error("Song info decode failed: {0}")]
    Decode(String),
}

/// Source of song details for newly created songs
#[async_trait]
pub trait SongInfoSource: Send + Sync {
    async fn fetch(&self, group: &str, song: &str) -> Result<SongDetail, LookupError>;
}

/// `SongInfoSource` backed by the external metadata HTTP service
#[derive(Debug, Clone)]
pub struct HttpSongInfoClient {
    http_client: Client,
    base_url: Option<String>,
}

impl HttpSongInfoClient {
    pub fn new(settings: &ExternalApiSettings) -> reqwest::Result<Self> {
        Ok(Self {
            http_client: Client::builder().timeout(settings.timeout).build()?,
            base_url: settings.base_url.clone(),
        })
    }
}

#[async_trait]
impl SongInfoSource for HttpSongInfoClient {
    async fn fetch(&self, group: &str, song: &str) -> Result<SongDetail, LookupError> {
        let Some(base_url) = &self.base_url else {
            warn!("EXTERNAL_API_URL is not configured, cannot look up song info");
            return Err(LookupError::Unavailable(
                "no metadata service configured".to_string(),
            ));
        };

        let url = format!("{}/info", base_url);
        debug!(url = %url, group = %group, song = %song, "Calling metadata service");

        // query() percent-encodes both values
        let response = self
            .http_client
            .get(&url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!(
                "metadata service returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LookupError::Unavailable(format!("reading body failed: {}", e)))?;

        serde_json::from_slice(&bytes).map_err(|e| LookupError::Decode(e.to_string()))
    }
}
