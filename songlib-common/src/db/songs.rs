//! Song table access
//!
//! `SongStore` is the seam between the request layer and storage. The
//! PostgreSQL implementation issues one statement per call and never retries.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::filter::{PageWindow, SongFilter, SongQuery};
use crate::models::{NewSong, Song, SongDetail, SongPayload};
use crate::Result;

/// Storage operations required by the song endpoints
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Fetch one window of songs ordered by id
    ///
    /// The outer result fails when the query itself fails. Each inner result
    /// is one fetched row, which may individually fail to decode.
    async fn list_songs(&self, filter: &SongFilter, window: PageWindow)
        -> Result<Vec<Result<Song>>>;

    /// Lyrics text of one song, `None` when no row matches
    async fn song_lyrics(&self, id: i32) -> Result<Option<String>>;

    /// Delete one song, returning the number of rows removed
    async fn delete_song(&self, id: i32) -> Result<u64>;

    /// Overwrite every mutable field, returning the number of rows changed
    async fn update_song(&self, id: i32, payload: &SongPayload) -> Result<u64>;

    /// Insert a new song and return its generated id
    async fn insert_song(&self, song: &NewSong, detail: &SongDetail) -> Result<i32>;
}

/// `SongStore` backed by the shared PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgSongStore {
    pool: PgPool,
}

impl PgSongStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongStore for PgSongStore {
    async fn list_songs(
        &self,
        filter: &SongFilter,
        window: PageWindow,
    ) -> Result<Vec<Result<Song>>> {
        let rendered = SongQuery::new(window).with_filter(filter).render();
        debug!(sql = %rendered.sql, args = ?rendered.args, "Executing song listing query");

        let mut query = sqlx::query(&rendered.sql);
        for arg in &rendered.args {
            query = query.bind(arg);
        }
        let rows = query
            .bind(rendered.limit)
            .bind(rendered.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Song::from_row(row).map_err(Into::into))
            .collect())
    }

    async fn song_lyrics(&self, id: i32) -> Result<Option<String>> {
        // A NULL lyrics column is indistinguishable from a missing row to callers
        let lyrics: Option<Option<String>> =
            sqlx::query_scalar("SELECT lyrics FROM songs WHERE song_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(lyrics.flatten())
    }

    async fn delete_song(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM songs WHERE song_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_song(&self, id: i32, payload: &SongPayload) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET group_name = $1, song_name = $2, release_date = $3, lyrics = $4, link = $5
            WHERE song_id = $6
            "#,
        )
        .bind(&payload.group)
        .bind(&payload.song)
        .bind(&payload.release_date)
        .bind(&payload.lyrics)
        .bind(&payload.link)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_song(&self, song: &NewSong, detail: &SongDetail) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO songs (group_name, song_name, release_date, lyrics, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING song_id
            "#,
        )
        .bind(&song.group)
        .bind(&song.song)
        .bind(&detail.release_date)
        .bind(&detail.lyrics)
        .bind(&detail.link)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
