//! Storage connector
//!
//! Owns construction of the shared PostgreSQL pool and the startup
//! connectivity check. The pool is cheap to clone and safe to share between
//! concurrent handlers.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info};

use crate::Result;

pub mod filter;
pub mod songs;

pub use filter::{PageWindow, SongFilter, SongQuery};
pub use songs::{PgSongStore, SongStore};

/// Upper bound on waiting for a pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection parameters for the song database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DbSettings {
    /// Connect options built field by field, so no value needs URL escaping
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

/// Open the connection pool and verify the database answers
pub async fn connect(settings: &DbSettings) -> Result<PgPool> {
    debug!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "Connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(settings.connect_options())
        .await?;

    ping(&pool).await?;
    info!(database = %settings.name, "Connected to database");

    Ok(pool)
}

/// Round-trip a trivial statement to prove the pool is usable
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
