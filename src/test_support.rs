use std::{env, error::Error, fs, path::PathBuf, sync::Mutex};

use axum::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::services::tx_service::{error::{Result, TxError}, DbTxService, Tx, TxService};

///
/// In-memory database with migrations applied. A single connection is kept
/// alive for the lifetime of the pool, since every SQLite memory connection
/// is its own database.
///
pub async fn memory_db() -> SqlitePool {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!().run(&db).await.unwrap();
    db
}

///
/// Migrated database in a temporary file, removed again on drop. Unlike
/// `memory_db`, several connections share it, so writers really contend.
///
pub struct FileDb {
    pub db: SqlitePool,
    path: PathBuf,
}

pub async fn file_db() -> FileDb {
    let path = env::temp_dir().join(format!("todo-list-api-{}.db", rand::random::<u64>()));
    let db = crate::db::connect(&format!("sqlite://{}", path.display())).await.unwrap();

    sqlx::migrate!().run(&db).await.unwrap();
    FileDb { db, path }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = fs::remove_file(path);
        }
    }
}

///
/// `TxService` which really begins transactions, but can be told to fail
/// when closing them. Records whether each close was a commit or a rollback.
///
pub struct FlakyTxService {
    inner: DbTxService,
    fail_finish: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl FlakyTxService {
    pub fn working(db: SqlitePool) -> Self {
        Self { inner: DbTxService::new(db), fail_finish: false, calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(db: SqlitePool) -> Self {
        Self { inner: DbTxService::new(db), fail_finish: true, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxService for FlakyTxService {
    async fn begin(&self) -> Result<Tx> {
        self.inner.begin().await
    }

    async fn finish<'a>(&self, tx: Tx, error: Option<&'a (dyn Error + Send + Sync)>) -> Result<()> {
        let call = if error.is_some() { "rollback" } else { "commit" };
        self.calls.lock().unwrap().push(call);

        if !self.fail_finish {
            return self.inner.finish(tx, error).await;
        }

        drop(tx);
        if error.is_some() {
            Err(TxError::Rollback(sqlx::Error::PoolClosed))
        } else {
            Err(TxError::Commit(sqlx::Error::PoolClosed))
        }
    }
}
