//! Database connection pool management.
//!
//! r2d2 pooling over SQLite. Every connection gets foreign keys enabled and
//! the schema is migrated before the pool is handed out.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use vkvideo_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 4;

/// Open (creating if needed) the SQLite file at `db_path` and migrate it.
///
/// # Example
///
/// ```no_run
/// use vkvideo_db::pool::init_pool;
///
/// let pool = init_pool("vkvideo.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    build_pool(manager, POOL_SIZE)
}

/// In-memory pool for tests.
///
/// A single connection is kept so every checkout sees the same database;
/// separate in-memory connections would each get an empty database.
///
/// ```
/// use vkvideo_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    build_pool(manager, 1)
}

fn build_pool(manager: SqliteConnectionManager, size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = get_conn(&pool)?;
    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    let version = migrations::current_version(&conn)
        .map_err(|e| Error::database(format!("Failed to read schema version: {}", e)))?;
    let latest = migrations::latest_version();
    if version > latest {
        return Err(Error::database(format!(
            "Database schema version {} is newer than the latest known version {}",
            version, latest
        )));
    }
    tracing::debug!(version, "Database schema ready");

    Ok(pool)
}

/// Get a connection from the pool, mapping the r2d2 error.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
