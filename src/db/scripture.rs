use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::connection::open_database;
use super::error::{StoreError, StoreResult};
use crate::models::{version_files, Verse, VersionFiles};

/// Read-only accessor over the bundled translation and commentary databases.
/// The library keeps only the directory path and the static version registry;
/// like [`super::UserStore`], every lookup opens its own connection and drops
/// it when the call returns.
///
/// Nothing here caches across calls. Navigating to a chapter re-resolves the
/// book id and re-queries; a chapter is small enough that the simplicity wins
/// over a resolver cache on the low-memory targets this runs on.
pub struct ScriptureLibrary {
    dir: PathBuf,
}

impl ScriptureLibrary {
    /// Point the library at the directory holding the provisioned databases.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where the library reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn registry_entry(&self, version: &str) -> StoreResult<&'static VersionFiles> {
        version_files(version).ok_or_else(|| StoreError::UnknownVersion(version.to_string()))
    }

    /// Open the translation database for a version. A registered version
    /// whose file is missing on disk is a broken bundle and surfaces as an
    /// error rather than as empty chapters.
    fn open_translation(&self, version: &str) -> StoreResult<Connection> {
        let entry = self.registry_entry(version)?;
        let path = self.dir.join(entry.text_file);
        if !path.exists() {
            return Err(StoreError::MissingFile(path));
        }
        open_database(&path)
    }

    /// Open the commentary database for a version, or `None` when the bundle
    /// ships without one. Missing commentary is a normal condition, not an
    /// error: the reading view simply shows no note markers.
    fn open_commentary(&self, version: &str) -> StoreResult<Option<Connection>> {
        let entry = self.registry_entry(version)?;
        let path = self.dir.join(entry.notes_file);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(open_database(&path)?))
    }

    /// Resolve a book name fragment to its `book_number`, matching
    /// case-insensitively against both the long and the short name. When
    /// several books contain the fragment the lowest `book_number` wins, so
    /// repeated lookups are at least deterministic.
    pub fn resolve_book_id(&self, version: &str, name: &str) -> StoreResult<Option<i64>> {
        let conn = self.open_translation(version)?;
        let pattern = format!("%{name}%");
        let id = conn
            .query_row(
                "SELECT book_number FROM books
                 WHERE long_name LIKE ?1 OR short_name LIKE ?1
                 ORDER BY book_number
                 LIMIT 1",
                params![pattern],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Highest chapter number recorded for a book, or 0 when the name does
    /// not resolve or the book has no verses. The maximum is what the chapter
    /// picker needs; the data may skip chapters and that is fine.
    pub fn chapter_count(&self, version: &str, book: &str) -> StoreResult<u32> {
        let Some(book_id) = self.resolve_book_id(version, book)? else {
            return Ok(0);
        };
        let conn = self.open_translation(version)?;
        let max: Option<u32> = conn.query_row(
            "SELECT MAX(chapter) FROM verses WHERE book_number = ?1",
            params![book_id],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0))
    }

    /// Fetch one chapter as raw verses ascending by verse number, together
    /// with the resolved book id so the caller can reuse it for bookmarks and
    /// notes without a second name lookup. An unresolved book name yields an
    /// empty list and no id.
    pub fn chapter_verses(
        &self,
        version: &str,
        book: &str,
        chapter: u32,
    ) -> StoreResult<(Vec<Verse>, Option<i64>)> {
        let Some(book_id) = self.resolve_book_id(version, book)? else {
            return Ok((Vec::new(), None));
        };

        let conn = self.open_translation(version)?;
        let mut stmt = conn.prepare(
            "SELECT verse, text FROM verses
             WHERE book_number = ?1 AND chapter = ?2
             ORDER BY verse ASC",
        )?;

        let verses = stmt
            .query_map(params![book_id, chapter], |row| {
                Ok(Verse {
                    number: row.get(0)?,
                    text: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((verses, Some(book_id)))
    }

    /// Look up the study note attached to one verse, keyed exactly by book,
    /// chapter and verse. `Ok(None)` covers every normal miss: no commentary
    /// database on disk, or no row for the verse.
    pub fn note(
        &self,
        version: &str,
        book_id: i64,
        chapter: u32,
        verse: u32,
    ) -> StoreResult<Option<String>> {
        let Some(conn) = self.open_commentary(version)? else {
            return Ok(None);
        };

        let text = conn
            .query_row(
                "SELECT text FROM commentaries
                 WHERE book_number = ?1
                   AND chapter_number_from = ?2
                   AND verse_number_from = ?3
                 LIMIT 1",
                params![book_id, chapter, verse],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    /// Build a translation database shaped like the bundled ones, under the
    /// file name the registry expects for NVI.
    fn fixture_library() -> (TempDir, ScriptureLibrary) {
        let dir = tempdir().unwrap();
        let conn = Connection::open(dir.path().join("NVI'22.SQLite3")).unwrap();
        conn.execute_batch(
            "CREATE TABLE books (book_number INTEGER, long_name TEXT, short_name TEXT);
             CREATE TABLE verses (book_number INTEGER, chapter INTEGER, verse INTEGER, text TEXT);
             INSERT INTO books VALUES (1, 'Génesis', 'Gn');
             INSERT INTO books VALUES (9, '1 Samuel', '1 S');
             INSERT INTO books VALUES (10, '2 Samuel', '2 S');
             INSERT INTO verses VALUES (1, 1, 1, 'En el principio <i>creó</i> Dios[1] los cielos');
             INSERT INTO verses VALUES (1, 1, 3, 'Y dijo Dios: Sea la luz');
             INSERT INTO verses VALUES (1, 1, 2, 'Y la tierra estaba desordenada');
             INSERT INTO verses VALUES (1, 3, 1, 'La serpiente era astuta');
             INSERT INTO verses VALUES (9, 1, 1, 'Hubo un varón de Ramataim');",
        )
        .unwrap();
        drop(conn);

        let library = ScriptureLibrary::new(dir.path());
        (dir, library)
    }

    fn add_commentary_fixture(dir: &TempDir) {
        let conn = Connection::open(dir.path().join("NVI'22.commentaries.SQLite3")).unwrap();
        conn.execute_batch(
            "CREATE TABLE commentaries (
                 book_number INTEGER, chapter_number_from INTEGER,
                 verse_number_from INTEGER, text TEXT);
             INSERT INTO commentaries VALUES (1, 1, 1, 'Nota sobre <b>el principio</b>[2]');",
        )
        .unwrap();
    }

    #[test]
    fn resolves_by_case_insensitive_fragment() {
        let (_dir, library) = fixture_library();
        assert_eq!(library.resolve_book_id("NVI", "Génesis").unwrap(), Some(1));
        assert_eq!(library.resolve_book_id("NVI", "1 samuel").unwrap(), Some(9));
        assert_eq!(library.resolve_book_id("NVI", "Gn").unwrap(), Some(1));
        assert_eq!(library.resolve_book_id("NVI", "Job").unwrap(), None);
    }

    #[test]
    fn ambiguous_fragment_takes_lowest_book_number() {
        let (_dir, library) = fixture_library();
        // Both books of Samuel contain the fragment; resolution must not flap.
        assert_eq!(library.resolve_book_id("NVI", "Samuel").unwrap(), Some(9));
    }

    #[test]
    fn chapter_listing_is_ascending_and_returns_the_book_id() {
        let (_dir, library) = fixture_library();
        let (verses, book_id) = library.chapter_verses("NVI", "Génesis", 1).unwrap();
        assert_eq!(book_id, Some(1));
        let numbers: Vec<u32> = verses.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn unresolved_book_yields_empty_listing_and_no_id() {
        let (_dir, library) = fixture_library();
        let (verses, book_id) = library.chapter_verses("NVI", "Apocalipsis", 1).unwrap();
        assert!(verses.is_empty());
        assert_eq!(book_id, None);
    }

    #[test]
    fn chapter_count_is_the_maximum_even_with_gaps() {
        let (_dir, library) = fixture_library();
        // Génesis has verses in chapters 1 and 3 only; the picker still
        // offers up to 3.
        assert_eq!(library.chapter_count("NVI", "Génesis").unwrap(), 3);
        assert_eq!(library.chapter_count("NVI", "Job").unwrap(), 0);
    }

    #[test]
    fn note_lookup_without_commentary_file_is_a_miss() {
        let (_dir, library) = fixture_library();
        assert_eq!(library.note("NVI", 1, 1, 1).unwrap(), None);
    }

    #[test]
    fn note_lookup_hits_exact_key_only() {
        let (dir, library) = fixture_library();
        add_commentary_fixture(&dir);
        let note = library.note("NVI", 1, 1, 1).unwrap();
        assert!(note.unwrap().contains("el principio"));
        assert_eq!(library.note("NVI", 1, 1, 2).unwrap(), None);
        assert_eq!(library.note("NVI", 2, 1, 1).unwrap(), None);
    }

    #[test]
    fn unknown_version_is_an_error() {
        let (_dir, library) = fixture_library();
        assert!(matches!(
            library.resolve_book_id("RVR", "Génesis"),
            Err(StoreError::UnknownVersion(_))
        ));
    }

    #[test]
    fn registered_version_with_missing_file_is_an_error() {
        let (_dir, library) = fixture_library();
        assert!(matches!(
            library.resolve_book_id("LBLA", "Génesis"),
            Err(StoreError::MissingFile(_))
        ));
    }
}
