use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::connection::open_database;
use super::error::StoreResult;

/// Accessor for the single user-owned database: per-verse highlight bookmarks
/// and the key/value settings table. The store keeps only the file path;
/// every operation opens a short-lived connection and lets it drop at the end
/// of the call, so no lock outlives the query that needed it.
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Open the store, creating the schema on first run. The two tables match
    /// the upstream layout: bookmarks keyed by the (book, chapter, verse)
    /// triple, settings keyed by name.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self { path: path.into() };
        let conn = store.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS bookmarks (
                libro_id INTEGER NOT NULL,
                capitulo INTEGER NOT NULL,
                versiculo INTEGER NOT NULL,
                color TEXT NOT NULL,
                PRIMARY KEY (libro_id, capitulo, versiculo)
            );
            CREATE TABLE IF NOT EXISTS ajustes (
                clave TEXT PRIMARY KEY,
                valor TEXT
            );",
        )?;
        Ok(store)
    }

    /// Where the store lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StoreResult<Connection> {
        open_database(&self.path)
    }

    /// Upsert one setting by key.
    pub fn set_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO ajustes (clave, valor) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Read one setting. `Ok(None)` means the key was never written, which is
    /// distinct from a backend failure.
    pub fn setting(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT valor FROM ajustes WHERE clave = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Read one setting, collapsing "never written" to a caller-supplied
    /// default. Backend failures still surface as errors.
    pub fn setting_or(&self, key: &str, default: &str) -> StoreResult<String> {
        Ok(self.setting(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Upsert a highlight color for one verse, or clear it when `color` is
    /// `None`. Absence of a row is the unmarked state, so clearing deletes
    /// rather than storing a tombstone.
    pub fn set_bookmark(
        &self,
        book_id: i64,
        chapter: u32,
        verse: u32,
        color: Option<&str>,
    ) -> StoreResult<()> {
        let conn = self.connect()?;
        match color {
            Some(color) => {
                conn.execute(
                    "INSERT OR REPLACE INTO bookmarks (libro_id, capitulo, versiculo, color)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![book_id, chapter, verse, color],
                )?;
            }
            None => {
                conn.execute(
                    "DELETE FROM bookmarks
                     WHERE libro_id = ?1 AND capitulo = ?2 AND versiculo = ?3",
                    params![book_id, chapter, verse],
                )?;
            }
        }
        Ok(())
    }

    /// Fetch every highlight in one chapter as a verse-to-color map. One query
    /// paints a whole chapter; the render loop never asks per verse.
    pub fn bookmarks(&self, book_id: i64, chapter: u32) -> StoreResult<HashMap<u32, String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT versiculo, color FROM bookmarks
             WHERE libro_id = ?1 AND capitulo = ?2",
        )?;

        let mut rows = stmt.query(params![book_id, chapter])?;
        let mut marks = HashMap::new();
        while let Some(row) = rows.next()? {
            marks.insert(row.get(0)?, row.get(1)?);
        }
        Ok(marks)
    }
}
