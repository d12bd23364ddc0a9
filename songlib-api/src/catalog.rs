//! Song entity operations
//!
//! `SongCatalog` implements list, lyrics, delete, update and create on top of
//! a `SongStore` and a `SongInfoSource`. Every call is independent; nothing is
//! cached and nothing is retried.

use std::sync::Arc;

use songlib_common::db::{PageWindow, SongFilter, SongStore};
use songlib_common::{NewSong, Song, SongPayload};
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::external::{LookupError, SongInfoSource};
use crate::lyrics::{paginate_lyrics, VerseWindow};

/// Entity operations over the song table
#[derive(Clone)]
pub struct SongCatalog {
    store: Arc<dyn SongStore>,
    info: Arc<dyn SongInfoSource>,
}

impl SongCatalog {
    pub fn new(store: Arc<dyn SongStore>, info: Arc<dyn SongInfoSource>) -> Self {
        Self { store, info }
    }

    /// Filtered, windowed song list ordered by id
    ///
    /// Rows that fail to decode are left out of the result; the request still
    /// succeeds with the remaining rows.
    pub async fn list(&self, filter: &SongFilter, window: PageWindow) -> ApiResult<Vec<Song>> {
        debug!(?filter, page = window.page, limit = window.limit, "Listing songs");

        let rows = self.store.list_songs(filter, window).await.map_err(|e| {
            error!(error = %e, "Song listing query failed");
            ApiError::Database
        })?;

        let fetched = rows.len();
        let songs: Vec<Song> = rows
            .into_iter()
            .filter_map(|row| match row {
                Ok(song) => Some(song),
                Err(e) => {
                    error!(error = %e, "Failed to decode song row");
                    None
                }
            })
            .collect();

        if songs.len() < fetched {
            warn!(
                skipped = fetched - songs.len(),
                returned = songs.len(),
                "Returning partial song list"
            );
        }
        info!(count = songs.len(), "Found songs");

        Ok(songs)
    }

    /// Verses of one song's lyrics, optionally windowed
    pub async fn lyrics(&self, id: i32, window: Option<VerseWindow>) -> ApiResult<Vec<String>> {
        let lyrics = match self.store.song_lyrics(id).await {
            Ok(Some(lyrics)) => lyrics,
            Ok(None) => {
                warn!(song_id = id, "Song not found");
                return Err(ApiError::NotFound);
            }
            Err(e) => {
                error!(song_id = id, error = %e, "Failed to read lyrics");
                return Err(ApiError::NotFound);
            }
        };

        let verses = paginate_lyrics(&lyrics, window);
        info!(song_id = id, verses = verses.len(), "Returning lyrics");
        Ok(verses)
    }

    /// Remove one song; an id that matches nothing is always NotFound
    pub async fn delete(&self, id: i32) -> ApiResult<()> {
        let affected = self.store.delete_song(id).await.map_err(|e| {
            error!(song_id = id, error = %e, "Error deleting song");
            ApiError::Database
        })?;

        if affected == 0 {
            warn!(song_id = id, "Song not found");
            return Err(ApiError::NotFound);
        }

        info!(song_id = id, "Song deleted");
        Ok(())
    }

    /// Replace every mutable field of one song
    pub async fn update(&self, id: i32, payload: &SongPayload) -> ApiResult<()> {
        let affected = self.store.update_song(id, payload).await.map_err(|e| {
            error!(song_id = id, error = %e, "Error updating song");
            ApiError::Database
        })?;

        if affected == 0 {
            warn!(song_id = id, "Song not found");
            return Err(ApiError::NotFound);
        }

        info!(song_id = id, "Song updated");
        Ok(())
    }

    /// Look up details for a new song and insert it, returning the new id
    ///
    /// Nothing is written unless the lookup succeeds and decodes.
    pub async fn create(&self, new_song: &NewSong) -> ApiResult<i32> {
        if !new_song.is_complete() {
            warn!("Create request is missing group or song");
            return Err(ApiError::InvalidData);
        }

        let detail = self
            .info
            .fetch(&new_song.group, &new_song.song)
            .await
            .map_err(|e| {
                error!(group = %new_song.group, song = %new_song.song, error = %e, "Song info lookup failed");
                match e {
                    LookupError::Unavailable(_) => ApiError::LookupFailed,
                    LookupError::Decode(_) => ApiError::LookupDecode,
                }
            })?;

        let id = self.store.insert_song(new_song, &detail).await.map_err(|e| {
            error!(error = %e, "Error inserting song");
            ApiError::Database
        })?;

        info!(song_id = id, group = %new_song.group, song = %new_song.song, "Song added");
        Ok(id)
    }
}
