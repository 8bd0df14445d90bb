use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::Connection;

use super::error::{StoreError, StoreResult};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".biblia-reader";
/// Subdirectory holding the provisioned reference databases plus the user
/// database. The name matches the upstream bundle so provisioning is a plain
/// directory copy.
const VERSIONS_DIR_NAME: &str = "Versiones";
/// SQLite file holding bookmarks and settings.
const USER_DB_FILE: &str = "user_data.db";

/// Resolve and create the writable data directory that holds every database.
///
/// On Android builds the platform exposes `ANDROID_DATA` and confines writes
/// to `$HOME/files`; everywhere else the directory lives under the user's
/// home. The directory is created on first call so later opens can assume it
/// exists.
pub fn data_dir() -> StoreResult<PathBuf> {
    let base = if env::var_os("ANDROID_DATA").is_some() {
        let home = env::var_os("HOME")
            .ok_or_else(|| io::Error::other("HOME is unset on an Android host"))?;
        PathBuf::from(home).join("files")
    } else {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| io::Error::other("could not locate home directory"))?;
        base_dirs.home_dir().join(DATA_DIR_NAME)
    };

    let dir = base.join(VERSIONS_DIR_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Absolute path of the user database inside a data directory.
pub fn user_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(USER_DB_FILE)
}

/// Open a database file, keeping the path in the error so a broken bundle
/// names the exact file that refused to open.
pub(crate) fn open_database(path: &Path) -> StoreResult<Connection> {
    Connection::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })
}
