//! Database connection management
//!
//! A small round-robin pool of SQLite connections. Callers borrow a
//! connection for the duration of a closure; the guard is released on every
//! exit path, including errors and panics unwinding through the closure.

use parking_lot::{Mutex, MutexGuard};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::migrations::run_migrations;
use crate::error::{Result, SyliusError};
use crate::types::{StorageConfig, StorageMode};

/// Storage engine wrapping a pool of SQLite connections
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    config: StorageConfig,
    pool: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl Storage {
    /// Open or create a database with the given configuration
    pub fn open(config: StorageConfig) -> Result<Self> {
        // Every in-memory connection is its own database, so the pool
        // collapses to a single shared connection.
        let pool_size = if config.is_in_memory() {
            1
        } else {
            config.pool_size.max(1)
        };

        let mut pool = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            pool.push(Mutex::new(Self::create_connection(&config)?));
        }

        if let Some(first) = pool.first() {
            run_migrations(&first.lock())?;
        }

        tracing::debug!(
            db_path = %config.db_path,
            pool_size,
            "catalog storage opened"
        );

        Ok(Self {
            inner: Arc::new(StorageInner {
                config,
                pool,
                next: AtomicUsize::new(0),
            }),
        })
    }

    /// Open an empty in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open(StorageConfig {
            db_path: ":memory:".to_string(),
            storage_mode: StorageMode::Local,
            pool_size: 1,
        })
    }

    /// Create a new connection with pragmas and SQL helpers installed
    fn create_connection(config: &StorageConfig) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(&config.db_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open_with_flags(&config.db_path, flags)?
        };

        Self::configure_pragmas(&conn, config.storage_mode)?;
        register_functions(&conn)?;

        Ok(conn)
    }

    /// Configure SQLite pragmas based on storage mode
    fn configure_pragmas(conn: &Connection, mode: StorageMode) -> Result<()> {
        match mode {
            StorageMode::Local => {
                conn.execute_batch(
                    r#"
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                    PRAGMA busy_timeout=30000;
                    PRAGMA temp_store=MEMORY;
                    PRAGMA foreign_keys=ON;
                    "#,
                )?;
            }
            StorageMode::CloudSafe => {
                conn.execute_batch(
                    r#"
                    PRAGMA journal_mode=DELETE;
                    PRAGMA synchronous=FULL;
                    PRAGMA busy_timeout=30000;
                    PRAGMA temp_store=MEMORY;
                    PRAGMA foreign_keys=ON;
                    "#,
                )?;
            }
        }
        Ok(())
    }

    /// Borrow a connection from the pool.
    ///
    /// Prefers an idle connection; when all are busy, waits on the next one
    /// in round-robin order.
    fn acquire(&self) -> MutexGuard<'_, Connection> {
        let pool = &self.inner.pool;
        let start = self.inner.next.fetch_add(1, Ordering::Relaxed) % pool.len();
        for offset in 0..pool.len() {
            if let Some(guard) = pool[(start + offset) % pool.len()].try_lock() {
                return guard;
            }
        }
        pool[start].lock()
    }

    /// Execute a function with a pooled connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.acquire();
        f(&conn)
    }

    /// Execute a function inside a transaction, committing on success
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Get current storage mode
    pub fn storage_mode(&self) -> StorageMode {
        self.inner.config.storage_mode
    }

    /// Get database path
    pub fn db_path(&self) -> &str {
        &self.inner.config.db_path
    }

    /// Number of pooled connections
    pub fn pool_size(&self) -> usize {
        self.inner.pool.len()
    }

    /// Check if database is in a cloud-synced folder
    pub fn is_in_cloud_folder(&self) -> bool {
        let path = self.inner.config.db_path.to_lowercase();
        path.contains("dropbox")
            || path.contains("onedrive")
            || path.contains("icloud")
            || path.contains("google drive")
    }

    /// Get warning if storage mode doesn't match folder type
    pub fn storage_mode_warning(&self) -> Option<String> {
        if self.is_in_cloud_folder() && self.storage_mode() == StorageMode::Local {
            Some(format!(
                "Database '{}' appears to be in a cloud-synced folder; WAL mode may \
                 corrupt it. Set SYLIUS_STORAGE_MODE=cloud-safe or move the file.",
                self.db_path()
            ))
        } else {
            None
        }
    }
}

/// Install `contains_ci(haystack, needle)`: Unicode-aware, case-insensitive
/// substring test. NULL on either side never matches.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "contains_ci",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
                (Some(h), Some(n)) => h.to_lowercase().contains(&n.to_lowercase()),
                _ => false,
            })
        },
    )
    .map_err(|e| SyliusError::Internal(format!("failed to register contains_ci: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory_runs_migrations() {
        let storage = Storage::open_in_memory().unwrap();
        let count: i64 = storage
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM sylius_product", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(storage.pool_size(), 1);
    }

    #[test]
    fn test_contains_ci_folds_unicode() {
        let storage = Storage::open_in_memory().unwrap();
        let matched: bool = storage
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT contains_ci('Chaussures ÉLÉGANTES', 'élégantes')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert!(matched);

        let null_matched: bool = storage
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT contains_ci(NULL, 'x')", [], |row| row.get(0))?)
            })
            .unwrap();
        assert!(!null_matched);
    }

    #[test]
    fn test_file_backed_pool_shares_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");
        let storage = Storage::open(StorageConfig::local(path.to_string_lossy())).unwrap();
        assert_eq!(storage.pool_size(), 4);

        storage
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO sylius_product (code, enabled) VALUES ('A', 1)",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        // Every pooled connection observes the same file.
        for _ in 0..storage.pool_size() {
            let count: i64 = storage
                .with_connection(|conn| {
                    Ok(conn.query_row("SELECT COUNT(*) FROM sylius_product", [], |r| r.get(0))?)
                })
                .unwrap();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_connection_released_after_error() {
        let storage = Storage::open_in_memory().unwrap();
        let failed: Result<()> = storage.with_connection(|conn| {
            conn.execute("SELECT * FROM no_such_table", [])?;
            Ok(())
        });
        assert!(failed.is_err());

        // The single pooled connection is usable again.
        assert!(storage.with_connection(|_| Ok(())).is_ok());
    }

    #[test]
    fn test_cloud_folder_warning() {
        let storage = Storage {
            inner: Arc::new(StorageInner {
                config: StorageConfig::local("/home/me/Dropbox/catalog.db"),
                pool: vec![Mutex::new(Connection::open_in_memory().unwrap())],
                next: AtomicUsize::new(0),
            }),
        };
        assert!(storage.storage_mode_warning().is_some());
    }
}
