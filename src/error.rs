use thiserror::Error;

/// Errors raised by the SQLite layer.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// The database file (or in-memory instance) could not be opened.
    #[error("failed to open sqlite database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    /// The engine rejected a statement or failed while stepping a cursor.
    #[error("sqlite error: {0}")]
    Engine(#[from] rusqlite::Error),
}

pub type Result<T, E = SqliteError> = std::result::Result<T, E>;
