//! Domain models that mirror the bundled SQLite schemas and get passed
//! throughout the TUI. The intent is that these types stay light-weight data
//! holders so other layers can focus on presentation and persistence logic.

use std::fmt;

/// One verse row as stored in a translation database. The `text` field is the
/// raw value from the `verses` table; markup stripping happens later in the
/// sanitizer so callers can decide which cleaning rules apply.
#[derive(Debug, Clone)]
pub struct Verse {
    /// Verse number within its chapter. Always positive in the bundled data.
    pub number: u32,
    /// Raw text, possibly containing `<tag>` runs and `[N]` footnote markers.
    pub text: String,
}

/// Registry entry describing the files that back one Bible version. The
/// registry always names a commentary file but the bundle may ship without
/// it, in which case note lookups degrade to "no note".
#[derive(Debug, Clone, Copy)]
pub struct VersionFiles {
    /// Short key shown in the version selector, e.g. `"NVI"`.
    pub key: &'static str,
    /// File name of the translation database inside the data directory.
    pub text_file: &'static str,
    /// File name of the companion commentary database.
    pub notes_file: &'static str,
}

impl fmt::Display for VersionFiles {
    /// Write the selector key to any formatter so the type plays nicely with
    /// Ratatui widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// The versions this build knows how to open, in selector order. File names
/// match the upstream data provider's distribution verbatim, apostrophes
/// included.
pub static VERSIONS: [VersionFiles; 4] = [
    VersionFiles {
        key: "NVI",
        text_file: "NVI'22.SQLite3",
        notes_file: "NVI'22.commentaries.SQLite3",
    },
    VersionFiles {
        key: "LBLA",
        text_file: "LBLA.SQLite3",
        notes_file: "LBLA.commentaries.SQLite3",
    },
    VersionFiles {
        key: "DHHS",
        text_file: "DHHS'94.SQLite3",
        notes_file: "DHHS'94.commentaries.SQLite3",
    },
    VersionFiles {
        key: "PDT",
        text_file: "PDT.SQLite3",
        notes_file: "PDT.commentaries.SQLite3",
    },
];

/// Fixed book list driving the book picker. The order is the data provider's
/// reading plan order rather than the canonical print order, and the picker
/// preserves it verbatim. Name resolution against the databases is substring
/// based, so these entries only need to be unambiguous, not byte-exact.
pub const BOOK_ORDER: [&str; 66] = [
    "Génesis",
    "Éxodo",
    "Levítico",
    "Números",
    "Deuteronomio",
    "Josué",
    "Jueces",
    "Job",
    "Rut",
    "1 Samuel",
    "2 Samuel",
    "1 Reyes",
    "2 Reyes",
    "Salmo",
    "Proverbios",
    "Eclesiastés",
    "Cantares",
    "1 Crónicas",
    "2 Crónicas",
    "Joel",
    "Amós",
    "Oseas",
    "Miqueas",
    "Nahúm",
    "Jonás",
    "Habacuc",
    "Isaías",
    "Sofonías",
    "Jeremías",
    "Lamentaciones",
    "Abdías",
    "Daniel",
    "Ezequiel",
    "Ester",
    "Hageo",
    "Zacarías",
    "Malaquías",
    "Esdras",
    "Nehemías",
    "Mateo",
    "Marcos",
    "Lucas",
    "Juan",
    "Hechos",
    "Romanos",
    "1 Corintios",
    "2 Corintios",
    "Gálatas",
    "Efesios",
    "Filipenses",
    "Colosenses",
    "1 Tesalonicenses",
    "2 Tesalonicenses",
    "1 Timoteo",
    "2 Timoteo",
    "Tito",
    "Filemón",
    "Hebreos",
    "Santiago",
    "1 Pedro",
    "2 Pedro",
    "1 Juan",
    "2 Juan",
    "3 Juan",
    "Judas",
    "Apocalipsis",
];

/// Highlight palette offered by the color menu. Values are stored in the user
/// database verbatim as `#AARRGGBB` strings; the alpha channel is ignored when
/// the terminal renders the swatch.
pub const HIGHLIGHT_PALETTE: [&str; 5] = [
    "#99FFFF00",
    "#99AAFF00",
    "#9900CCFF",
    "#99CC99FF",
    "#99FF99CC",
];

/// Look up a version registry entry by its selector key.
pub fn version_files(key: &str) -> Option<&'static VersionFiles> {
    VERSIONS.iter().find(|version| version.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_lookup_finds_known_keys() {
        for version in &VERSIONS {
            let found = version_files(version.key).expect("registered version");
            assert_eq!(found.text_file, version.text_file);
        }
    }

    #[test]
    fn version_lookup_rejects_unknown_key() {
        assert!(version_files("RVR").is_none());
    }

    #[test]
    fn book_order_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for book in &BOOK_ORDER {
            assert!(seen.insert(*book), "duplicate book entry: {book}");
        }
    }
}
