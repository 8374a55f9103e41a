use std::{str::FromStr, time::Duration};

use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, SqlitePool};

/// How long a connection waits for another writer to release the database
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

///
/// Connects to the database at `database_url`, creating the file if needed.
/// WAL mode lets readers proceed while a write transaction is open.
///
pub async fn connect(database_url: &str) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new().connect_with(options).await
}
