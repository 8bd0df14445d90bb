//! Markup cleanup for verse and commentary text. The bundled databases carry
//! presentation markup from the upstream tooling: `<tag>` runs, `[N]` footnote
//! anchors, and decorative enclosed numerals. Readers only ever see the output
//! of these functions, and the chapter cache stores it verbatim, so the rules
//! live in one place.

use once_cell::sync::Lazy;
use regex::Regex;

/// Everything stripped from rendered verse text in a single pass: tag runs,
/// numeric footnote markers, and the enclosed-numeral block U+2460..U+24FF
/// some translations use as inline verse ornaments.
static VERSE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>|\[\d+\]|[\u{2460}-\u{24FF}]").unwrap());

/// Markup stripped from commentary popups. Notes keep their own line
/// structure, so the numeral block and whitespace collapsing do not apply.
static NOTE_MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>|\[\d+\]").unwrap());

/// Runs of whitespace, including the newlines the provider embeds mid-verse.
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean one verse for rendering: strip markup, collapse whitespace runs to a
/// single space, drop the stray space the stripping leaves before commas and
/// periods, and trim. Total over any input; malformed markup simply passes
/// through whatever the patterns do not match.
pub fn clean_verse(raw: &str) -> String {
    let stripped = VERSE_MARKUP.replace_all(raw, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.replace(" ,", ",").replace(" .", ".").trim().to_string()
}

/// Clean a study note for the popup: strip tag runs and footnote markers,
/// then trim. Line breaks inside the note survive.
pub fn clean_note(raw: &str) -> String {
    NOTE_MARKUP.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_footnotes_and_numerals() {
        let raw = "En el principio <i>creó</i> Dios[1] los cielos \u{2460} y la tierra .";
        assert_eq!(
            clean_verse(raw),
            "En el principio creó Dios los cielos y la tierra."
        );
    }

    #[test]
    fn collapses_whitespace_and_fixes_punctuation_spacing() {
        let raw = "Y dijo  Dios :  sea la luz ,\n y fue la luz .";
        assert_eq!(clean_verse(raw), "Y dijo Dios : sea la luz, y fue la luz.");
    }

    #[test]
    fn clean_verse_is_idempotent() {
        let inputs = [
            "texto <pb/> con [12] marcas \u{2463}",
            "  espacios   y <i>cursiva</i> ,",
            "sin marcas en absoluto",
        ];
        for raw in inputs {
            let once = clean_verse(raw);
            assert_eq!(clean_verse(&once), once);
        }
    }

    #[test]
    fn total_over_degenerate_inputs() {
        assert_eq!(clean_verse(""), "");
        assert_eq!(clean_verse("   \t\n  "), "");
        assert_eq!(clean_verse("[sin cerrar"), "[sin cerrar");
        assert_eq!(clean_verse("<sin cerrar"), "<sin cerrar");
        // A stray bracket pair reads as a tag; the content between is lost.
        assert_eq!(clean_verse("a < b > c"), "a c");
    }

    #[test]
    fn unmatched_brackets_survive_notes_too() {
        assert_eq!(clean_note("[nota"), "[nota");
        assert_eq!(clean_note(""), "");
    }

    #[test]
    fn notes_keep_line_structure() {
        let raw = "Primera línea.<br>\nSegunda línea[2].";
        assert_eq!(clean_note(raw), "Primera línea.\nSegunda línea.");
    }

    #[test]
    fn footnote_marker_must_be_numeric() {
        assert_eq!(clean_verse("ver [nota] aparte"), "ver [nota] aparte");
        assert_eq!(clean_note("ver [nota] aparte"), "ver [nota] aparte");
    }
}
