pub mod error;

use std::error::Error;

use axum::async_trait;
use derive_more::Constructor;
use log::debug;
use sqlx::{Sqlite, SqlitePool};

use self::error::{Result, TxError};

///
/// Transaction handle passed to every mutating `DataLayer` call
///
pub type Tx = sqlx::Transaction<'static, Sqlite>;

///
/// Opens and closes the transaction which wraps a single logical
/// mutation.
///
#[async_trait]
pub trait TxService: Send + Sync {
    ///
    /// Begins a new write transaction. Fails with `TxError::Begin` if no
    /// connection can be acquired, or the write lock isn't granted within
    /// the connection's busy timeout.
    ///
    async fn begin(&self) -> Result<Tx>;
    ///
    /// Commits `tx` when `error` is `None`, and rolls it back otherwise.
    /// The returned error is the failure of the commit or rollback itself,
    /// never `error`.
    ///
    async fn finish<'a>(&self, tx: Tx, error: Option<&'a (dyn Error + Send + Sync)>) -> Result<()>;
}

#[derive(Clone, Constructor)]
pub struct DbTxService {
    db: SqlitePool,
}

#[async_trait]
impl TxService for DbTxService {
    async fn begin(&self) -> Result<Tx> {
        // Take the write lock up front. A deferred transaction that reads
        // and then writes can't be retried by SQLite, and fails with
        // SQLITE_BUSY as soon as another writer holds the lock.
        self.db.begin_with("BEGIN IMMEDIATE").await.map_err(TxError::Begin)
    }

    async fn finish<'a>(&self, tx: Tx, error: Option<&'a (dyn Error + Send + Sync)>) -> Result<()> {
        match error {
            None => tx.commit().await.map_err(TxError::Commit),
            Some(e) => {
                debug!("rolling back transaction: {}", e);
                tx.rollback().await.map_err(TxError::Rollback)
            }
        }
    }
}

///
/// Closes `tx` according to `result` and hands `result` back. If closing
/// the transaction fails, that failure replaces `result`, whether it held
/// a value or a business error.
///
pub async fn close<T, E>(tx_service: &dyn TxService, tx: Tx, result: std::result::Result<T, E>) -> std::result::Result<T, E>
where
    E: Error + Send + Sync + From<TxError>,
{
    let closed = match &result {
        Ok(_) => tx_service.finish(tx, None).await,
        Err(e) => tx_service.finish(tx, Some(e as &(dyn Error + Send + Sync))).await,
    };

    match closed {
        Ok(()) => result,
        Err(e) => Err(e.into()),
    }
}
