use std::error::Error;

///
/// Result type for the `DataLayer`s of every service. Lookups that may
/// legitimately find nothing return `Result<Option<T>>`, so "no rows" is
/// never reported through the error channel.
///
pub type Result<T> = std::result::Result<T, DataLayerError>;

///
/// Generic error returned by a `DataLayer`, which keeps the services
/// independent of the SQL driver behind them.
///
pub type DataLayerError = Box<dyn Error + Send + Sync>;
