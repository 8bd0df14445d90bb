//! Typed failure surface for the persistence layer. Callers get three
//! distinguishable outcomes from every accessor: data (`Ok(Some(..))` or a
//! non-empty collection), genuinely absent data (`Ok(None)` or an empty
//! collection), and a backend failure (`Err(StoreError)`). The presentation
//! layer decides how much of a failure to show; the store never swallows one.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong underneath a store or library call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller named a version key that is not in the registry.
    #[error("unknown Bible version '{0}'")]
    UnknownVersion(String),

    /// A bundled database the registry promises is not on disk. Only raised
    /// for translation text; a missing commentary file is a normal "no note".
    #[error("reference database is missing: {0}")]
    MissingFile(PathBuf),

    /// Opening a database file failed.
    #[error("failed to open database at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A prepared statement or query failed after the connection opened.
    #[error("database query failed")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem trouble while locating or creating the data directory.
    #[error("data directory is unusable")]
    Io(#[from] std::io::Error),
}

/// Shorthand used by every accessor in this module tree.
pub type StoreResult<T> = Result<T, StoreError>;
