//! songlib-api library - song catalog HTTP service
//!
//! Five song routes plus a health check, all answering JSON.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod external;
pub mod lyrics;

pub use catalog::SongCatalog;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<SongCatalog>,
}

impl AppState {
    pub fn new(catalog: SongCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let songs = Router::new()
        .route("/songs", get(api::list_songs).post(api::create_song))
        .route(
            "/songs/:song_id",
            axum::routing::put(api::update_song).delete(api::delete_song),
        )
        .route("/songs/:song_id/lyrics", get(api::get_song_lyrics));

    Router::new()
        .merge(songs)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
