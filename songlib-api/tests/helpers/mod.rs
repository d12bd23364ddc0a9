//! In-memory doubles for the song store and the metadata service

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use songlib_api::external::{LookupError, SongInfoSource};
use songlib_api::{build_router, AppState, SongCatalog};
use songlib_common::db::{PageWindow, SongFilter, SongStore};
use songlib_common::{Error, NewSong, Song, SongDetail, SongPayload};
use tower::util::ServiceExt;

/// Song table kept in a BTreeMap so iteration is ordered by id
#[derive(Default)]
pub struct MemorySongStore {
    rows: Mutex<BTreeMap<i32, Song>>,
    next_id: Mutex<i32>,
    /// Rows with these ids fail to decode when listed
    corrupt_ids: Mutex<HashSet<i32>>,
    /// Every statement fails while set
    failing: AtomicBool,
    pub inserts: AtomicUsize,
}

impl MemorySongStore {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            ..Default::default()
        }
    }

    pub fn seed(&self, group: &str, song: &str, release_date: &str, lyrics: &str) -> i32 {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.rows.lock().unwrap().insert(
            id,
            Song {
                id,
                group: group.to_string(),
                song: song.to_string(),
                release_date: Some(release_date.to_string()),
                lyrics: Some(lyrics.to_string()),
                link: None,
            },
        );
        id
    }

    pub fn get(&self, id: i32) -> Option<Song> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn corrupt(&self, id: i32) {
        self.corrupt_ids.lock().unwrap().insert(id);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> songlib_common::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl SongStore for MemorySongStore {
    async fn list_songs(
        &self,
        filter: &SongFilter,
        window: PageWindow,
    ) -> songlib_common::Result<Vec<songlib_common::Result<Song>>> {
        self.check()?;
        let corrupt = self.corrupt_ids.lock().unwrap().clone();

        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| filter.group.as_ref().map_or(true, |g| contains_ignore_case(&s.group, g)))
            .filter(|s| filter.song.as_ref().map_or(true, |n| contains_ignore_case(&s.song, n)))
            .filter(|s| {
                filter
                    .release_date
                    .as_ref()
                    .map_or(true, |d| s.release_date.as_deref() == Some(d.as_str()))
            })
            .skip(window.offset() as usize)
            .take(window.limit as usize)
            .map(|s| {
                if corrupt.contains(&s.id) {
                    Err(Error::Database(sqlx::Error::ColumnNotFound("lyrics".to_string())))
                } else {
                    Ok(s.clone())
                }
            })
            .collect())
    }

    async fn song_lyrics(&self, id: i32) -> songlib_common::Result<Option<String>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().get(&id).and_then(|s| s.lyrics.clone()))
    }

    async fn delete_song(&self, id: i32) -> songlib_common::Result<u64> {
        self.check()?;
        Ok(self.rows.lock().unwrap().remove(&id).map_or(0, |_| 1))
    }

    async fn update_song(&self, id: i32, payload: &SongPayload) -> songlib_common::Result<u64> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(row) => {
                row.group = payload.group.clone();
                row.song = payload.song.clone();
                row.release_date = Some(payload.release_date.clone());
                row.lyrics = Some(payload.lyrics.clone());
                row.link = Some(payload.link.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_song(&self, song: &NewSong, detail: &SongDetail) -> songlib_common::Result<i32> {
        self.check()?;
        self.inserts.fetch_add(1, Ordering::SeqCst);

        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.rows.lock().unwrap().insert(
            id,
            Song {
                id,
                group: song.group.clone(),
                song: song.song.clone(),
                release_date: Some(detail.release_date.clone()),
                lyrics: Some(detail.lyrics.clone()),
                link: Some(detail.link.clone()),
            },
        );
        Ok(id)
    }
}

/// Canned answer from the metadata service
#[derive(Clone)]
pub enum StubInfo {
    Found(SongDetail),
    Unavailable,
    Malformed,
}

#[async_trait]
impl SongInfoSource for StubInfo {
    async fn fetch(&self, _group: &str, _song: &str) -> Result<SongDetail, LookupError> {
        match self {
            StubInfo::Found(detail) => Ok(detail.clone()),
            StubInfo::Unavailable => Err(LookupError::Unavailable("status 404".to_string())),
            StubInfo::Malformed => Err(LookupError::Decode("expected value".to_string())),
        }
    }
}

pub fn found_detail() -> StubInfo {
    StubInfo::Found(SongDetail {
        release_date: "16.07.2006".to_string(),
        lyrics: "Ooh baby, don't you know I suffer?\n\nOoh baby, can you hear me moan?".to_string(),
        link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".to_string(),
    })
}

pub fn setup_app(store: Arc<MemorySongStore>, info: StubInfo) -> Router {
    let catalog = SongCatalog::new(store, Arc::new(info));
    build_router(AppState::new(catalog))
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request and return status plus parsed JSON body
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}
