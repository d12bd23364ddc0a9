//! Song endpoints
//!
//! Thin adapters between HTTP and `SongCatalog`: extract and validate request
//! parts, call one catalog operation, shape the JSON reply. Extractor
//! rejections are mapped onto `ApiError` so every reply is JSON.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Serialize;
use songlib_common::db::{PageWindow, SongFilter};
use songlib_common::{NewSong, Song, SongPayload};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::lyrics::VerseWindow;
use crate::AppState;

/// Raw query-string pairs, in request order
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Query-string lookup where the first occurrence of a key wins
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// An unreadable query string is treated as an empty one
    fn from_extracted(query: QueryPairs) -> Self {
        match query {
            Ok(Query(pairs)) => Self::new(pairs),
            Err(rejection) => {
                warn!(error = %rejection, "Ignoring unreadable query string");
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub song_id: i32,
}

/// Song ids are positive 32-bit integers
pub fn parse_song_id(raw: &str) -> ApiResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            warn!(raw_id = %raw, "Invalid song ID");
            ApiError::InvalidSongId
        })
}

fn path_song_id(path: Result<Path<String>, PathRejection>) -> ApiResult<i32> {
    match path {
        Ok(Path(raw)) => parse_song_id(&raw),
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable song ID in path");
            Err(ApiError::InvalidSongId)
        }
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        warn!(error = %rejection, "Error binding JSON");
        ApiError::InvalidData
    })
}

/// GET /songs
///
/// Filtered, paginated song list.
pub async fn list_songs(
    State(state): State<AppState>,
    query: QueryPairs,
) -> ApiResult<Json<Vec<Song>>> {
    debug!("Processing list songs request");

    let params = QueryParams::from_extracted(query);
    let filter = SongFilter::new(
        params.owned("group"),
        params.owned("song"),
        params.owned("releaseDate"),
    );
    let window = PageWindow::from_params(params.get("page"), params.get("limit"));

    let songs = state.catalog.list(&filter, window).await?;
    Ok(Json(songs))
}

/// GET /songs/:song_id/lyrics
///
/// Lyrics split into verses, paginated when `page` or `limit` is given.
pub async fn get_song_lyrics(
    State(state): State<AppState>,
    song_id: Result<Path<String>, PathRejection>,
    query: QueryPairs,
) -> ApiResult<Json<Vec<String>>> {
    debug!("Processing song lyrics request");

    let id = path_song_id(song_id)?;
    let params = QueryParams::from_extracted(query);
    let window = VerseWindow::from_params(params.get("page"), params.get("limit"));

    let verses = state.catalog.lyrics(id, window).await?;
    Ok(Json(verses))
}

/// DELETE /songs/:song_id
pub async fn delete_song(
    State(state): State<AppState>,
    song_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    debug!("Processing delete song request");

    let id = path_song_id(song_id)?;
    state.catalog.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Song was deleted".to_string(),
    }))
}

/// PUT /songs/:song_id
///
/// Full replace: omitted or null fields are stored as empty strings.
pub async fn update_song(
    State(state): State<AppState>,
    song_id: Result<Path<String>, PathRejection>,
    body: Result<Json<SongPayload>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    debug!("Processing update song request");

    let id = path_song_id(song_id)?;
    let payload = json_body(body)?;
    state.catalog.update(id, &payload).await?;

    Ok(Json(MessageResponse {
        message: "Song was updated".to_string(),
    }))
}

/// POST /songs
///
/// Creates a song from `{group, song}` plus details fetched from the
/// metadata service.
pub async fn create_song(
    State(state): State<AppState>,
    body: Result<Json<NewSong>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    debug!("Processing create song request");

    let new_song = json_body(body)?;
    let song_id = state.catalog.create(&new_song).await?;

    Ok(Json(CreatedResponse { song_id }))
}
