use chrono::{NaiveDateTime, Utc};
use diesel::r2d2::ConnectionManager;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{
    embed_migrations, EmbeddedMigrations, HarnessWithOutput, MigrationHarness,
};
use std::error::Error;
use std::fmt;

use crate::settings::Settings;

pub mod feed_items;

pub use feed_items::{FeedItemStore, SqliteStore};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
pub enum StoreError {
    Pool(r2d2::Error),
    Query(diesel::result::Error),
    Migration(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(error) => write!(f, "could not get a database connection: {}", error),
            Self::Query(error) => write!(f, "database query failed: {}", error),
            Self::Migration(msg) => write!(f, "database migration failed: {}", msg),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pool(error) => Some(error),
            Self::Query(error) => Some(error),
            Self::Migration(_) => None,
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::Pool(error)
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Query(error)
    }
}

/// Connects to the database and brings its schema up to date.
///
/// # Errors
///
/// Will return Err for any problem in connection to database or while migrating it
pub fn setup(settings: &Settings) -> Result<SqlitePool, StoreError> {
    let pool = create_pool(&settings.database_url, settings.database_pool_size)?;
    run_migrations(&pool, settings.debug)?;
    Ok(pool)
}

/// # Errors
///
/// Will return Err if the pool cannot open its first connection
pub fn create_pool(database_url: &str, max_size: u32) -> Result<SqlitePool, StoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Ok(r2d2::Pool::builder().max_size(max_size).build(manager)?)
}

/// # Errors
///
/// Will return Err if a pending migration fails to apply
pub fn run_migrations(pool: &SqlitePool, verbose: bool) -> Result<(), StoreError> {
    let mut conn = pool.get()?;
    let applied = if verbose {
        HarnessWithOutput::write_to_stdout(&mut conn)
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.iter().map(|v| v.as_owned()).collect::<Vec<_>>())
    } else {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.iter().map(|v| v.as_owned()).collect::<Vec<_>>())
    }
    .map_err(|error| StoreError::Migration(error.to_string()))?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

pub fn current_time() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[cfg(test)]
pub fn establish_test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedrelay-test.sqlite");
    let pool = create_pool(path.to_str().unwrap(), 1).unwrap();
    run_migrations(&pool, false).unwrap();
    (dir, pool)
}
