//! Database connection pool management.
//!
//! Connection pooling for SQLite snapshots using r2d2. Every pool runs
//! pending migrations before it is handed out.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use refreshsparse_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 4;

fn configure(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA busy_timeout = 5000;")
}

fn build_pool(manager: SqliteConnectionManager, what: &str) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create {}: {}", what, e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    let applied = migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;
    if applied > 0 {
        tracing::debug!(applied, "Snapshot schema migrated");
    }

    Ok(pool)
}

/// Open (or create) a snapshot database at `db_path`.
///
/// # Example
///
/// ```no_run
/// use refreshsparse_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/refreshsparse/snapshot.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(configure);
    build_pool(manager, "connection pool")
}

/// Initialize an in-memory snapshot pool.
///
/// All connections of the pool share one database, which is lost when the
/// pool is dropped.
///
/// ```
/// use refreshsparse_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(configure);
    build_pool(manager, "in-memory pool")
}

/// Get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), POOL_SIZE);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='items'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_pool_shares_database() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO items (id, item_kind, name, date_created, date_last_refreshed)
                 VALUES (?, 'series', ?, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
                rusqlite::params!["00000000000000000000000000000001", "Show"],
            )
            .unwrap();
        }

        let _held = get_conn(&pool).unwrap();
        let conn = get_conn(&pool).unwrap();
        let name: String = conn
            .query_row(
                "SELECT name FROM items WHERE id = ?",
                ["00000000000000000000000000000001"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(name, "Show");
    }

    #[test]
    fn test_file_pool_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.db");
        let path = path.to_str().unwrap();

        init_pool(path).unwrap();
        let pool = init_pool(path).unwrap();
        let conn = get_conn(&pool).unwrap();
        assert_eq!(
            crate::migrations::current_version(&conn).unwrap(),
            crate::migrations::latest_version()
        );
    }
}
