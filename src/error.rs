use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Invalid period format: {0}")]
    PeriodParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Database(e.to_string())
    }
}

impl From<rusqlite_migration::Error> for Error {
    fn from(e: rusqlite_migration::Error) -> Self {
        Error::Migration(e.to_string())
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(e: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(e.to_string())
    }
}

/// Closures passed to `Connection::call` return our own error type, so unwrap
/// it instead of flattening it into a database message.
impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(e: tokio_rusqlite::Error<Error>) -> Self {
        match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => Error::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rusqlite_error_maps_to_database() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_call_error_keeps_inner_variant() {
        let err: Error =
            tokio_rusqlite::Error::Error(Error::NotFound("employee 7".into())).into();
        match err {
            Error::NotFound(msg) => assert_eq!(msg, "employee 7"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
