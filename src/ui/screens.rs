//! Per-screen state containers. Each navigation target owns exactly the data
//! that makes it renderable, so a screen value existing is proof the flow that
//! produced it ran: the chapter picker cannot exist without a chosen book and
//! the reading screen cannot exist without a loaded chapter.

use std::collections::{HashMap, HashSet};

use crate::models::{VersionFiles, BOOK_ORDER, HIGHLIGHT_PALETTE, VERSIONS};

/// Chapter-grid column count used by the picker's cursor movement.
pub(crate) const CHAPTER_GRID_COLUMNS: u32 = 10;

/// Version selector shown on the home screen.
pub(crate) struct HomeScreen {
    pub(crate) selected: usize,
}

impl HomeScreen {
    pub(crate) fn new(current: &VersionFiles) -> Self {
        let selected = VERSIONS
            .iter()
            .position(|v| v.key == current.key)
            .unwrap_or(0);
        Self { selected }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = VERSIONS.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn version(&self) -> &'static VersionFiles {
        &VERSIONS[self.selected]
    }
}

/// Cursor over the fixed master book list.
pub(crate) struct BookPickerScreen {
    pub(crate) selected: usize,
}

impl BookPickerScreen {
    pub(crate) fn focused_on(book: &str) -> Self {
        let selected = BOOK_ORDER.iter().position(|b| *b == book).unwrap_or(0);
        Self { selected }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = BOOK_ORDER.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = BOOK_ORDER.len() - 1;
    }

    pub(crate) fn current_book(&self) -> &'static str {
        BOOK_ORDER[self.selected]
    }
}

/// Numbered chapter grid for one already-chosen book. `total` of zero renders
/// as an empty grid with a hint instead of chapter buttons.
pub(crate) struct ChapterPickerScreen {
    pub(crate) book: String,
    pub(crate) total: u32,
    pub(crate) selected: u32,
}

impl ChapterPickerScreen {
    pub(crate) fn new(book: String, total: u32, current: u32) -> Self {
        let selected = if total == 0 {
            0
        } else {
            current.clamp(1, total) - 1
        };
        Self {
            book,
            total,
            selected,
        }
    }

    /// Move the cursor across the grid. Horizontal steps walk one chapter,
    /// vertical steps walk one grid row.
    pub(crate) fn move_selection(&mut self, dx: isize, dy: isize) {
        if self.total == 0 {
            return;
        }
        let max = self.total as isize - 1;
        let step = dx + dy * CHAPTER_GRID_COLUMNS as isize;
        let new = (self.selected as isize + step).clamp(0, max);
        self.selected = new as u32;
    }

    /// One-based chapter number under the cursor.
    pub(crate) fn current_chapter(&self) -> u32 {
        self.selected + 1
    }
}

/// One verse prepared for rendering. The text is already sanitized; the raw
/// database form never leaves the loader.
pub(crate) struct VerseLine {
    pub(crate) number: u32,
    pub(crate) text: String,
    pub(crate) color: Option<String>,
    pub(crate) note: Option<String>,
}

/// The loaded chapter: verse lines, the sanitized-text cache backing the copy
/// action, the multi-select set, and cursor position. Replaced wholesale on
/// every chapter navigation; nothing in it is invalidated piecemeal.
pub(crate) struct ReadingScreen {
    pub(crate) book: String,
    pub(crate) chapter: u32,
    pub(crate) book_id: Option<i64>,
    pub(crate) verses: Vec<VerseLine>,
    pub(crate) cache: HashMap<u32, String>,
    pub(crate) selection: HashSet<u32>,
    pub(crate) cursor: usize,
}

impl ReadingScreen {
    pub(crate) fn title(&self) -> String {
        format!("{} {}", self.book, self.chapter)
    }

    pub(crate) fn move_cursor(&mut self, offset: isize) {
        if self.verses.is_empty() {
            return;
        }
        let max = self.verses.len() as isize - 1;
        let new = (self.cursor as isize + offset).clamp(0, max);
        self.cursor = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn select_last(&mut self) {
        if !self.verses.is_empty() {
            self.cursor = self.verses.len() - 1;
        }
    }

    pub(crate) fn cursor_verse(&self) -> Option<&VerseLine> {
        self.verses.get(self.cursor)
    }

    /// Toggle the cursor verse in or out of the selection set.
    pub(crate) fn toggle_selection(&mut self) {
        if let Some(verse) = self.cursor_verse() {
            let number = verse.number;
            if !self.selection.remove(&number) {
                self.selection.insert(number);
            }
        }
    }

    /// Make sure the selection is non-empty before opening the color menu by
    /// seeding it with the cursor verse. Mirrors the long-press gesture that
    /// marks the pressed verse when nothing else was selected.
    pub(crate) fn seed_selection_from_cursor(&mut self) {
        if self.selection.is_empty() {
            if let Some(verse) = self.cursor_verse() {
                self.selection.insert(verse.number);
            }
        }
    }

    /// Selected verse numbers in ascending order.
    pub(crate) fn selected_ascending(&self) -> Vec<u32> {
        let mut ordered: Vec<u32> = self.selection.iter().copied().collect();
        ordered.sort_unstable();
        ordered
    }

    /// Build the clipboard payload for the current selection: a `book chapter`
    /// header followed by one `N. text` line per selected verse, ascending,
    /// each from the sanitized cache. `None` when nothing is selected.
    pub(crate) fn copy_payload(&self) -> Option<String> {
        if self.selection.is_empty() {
            return None;
        }
        let mut payload = format!("{} {}\n", self.book, self.chapter);
        for number in self.selected_ascending() {
            let text = self.cache.get(&number).map(String::as_str).unwrap_or("");
            payload.push_str(&format!("{number}. {text}\n"));
        }
        Some(payload)
    }
}

/// Which settings control has focus.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum SettingsField {
    Theme,
    FontSize,
}

/// Settings screen cursor. The values themselves live on the app since theme
/// and font size style every screen, not just this one.
pub(crate) struct SettingsScreen {
    pub(crate) field: SettingsField,
}

impl SettingsScreen {
    pub(crate) fn new() -> Self {
        Self {
            field: SettingsField::Theme,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.field = match self.field {
            SettingsField::Theme => SettingsField::FontSize,
            SettingsField::FontSize => SettingsField::Theme,
        };
    }
}

/// State of the highlight color menu overlay.
pub(crate) struct ColorMenuState {
    pub(crate) selected: usize,
}

impl ColorMenuState {
    pub(crate) fn new() -> Self {
        Self { selected: 0 }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = HIGHLIGHT_PALETTE.len() as isize;
        let new = (self.selected as isize + offset).rem_euclid(len);
        self.selected = new as usize;
    }

    pub(crate) fn current_color(&self) -> &'static str {
        HIGHLIGHT_PALETTE[self.selected]
    }
}

/// Scrollable study-note popup.
pub(crate) struct NoteView {
    pub(crate) verse: u32,
    pub(crate) text: String,
    pub(crate) scroll: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading_with_verses(numbers: &[u32]) -> ReadingScreen {
        let verses = numbers
            .iter()
            .map(|n| VerseLine {
                number: *n,
                text: format!("verso {n}"),
                color: None,
                note: None,
            })
            .collect();
        let cache = numbers
            .iter()
            .map(|n| (*n, format!("verso {n}")))
            .collect();
        ReadingScreen {
            book: "Génesis".to_string(),
            chapter: 1,
            book_id: Some(1),
            verses,
            cache,
            selection: HashSet::new(),
            cursor: 0,
        }
    }

    #[test]
    fn toggle_adds_then_removes_the_cursor_verse() {
        let mut reading = reading_with_verses(&[1, 2, 3]);
        reading.move_cursor(1);
        reading.toggle_selection();
        assert!(reading.selection.contains(&2));
        reading.toggle_selection();
        assert!(reading.selection.is_empty());
    }

    #[test]
    fn seeding_only_fills_an_empty_selection() {
        let mut reading = reading_with_verses(&[1, 2, 3]);
        reading.toggle_selection();
        reading.move_cursor(2);
        reading.seed_selection_from_cursor();
        assert_eq!(reading.selected_ascending(), vec![1]);

        reading.selection.clear();
        reading.seed_selection_from_cursor();
        assert_eq!(reading.selected_ascending(), vec![3]);
    }

    #[test]
    fn copy_payload_orders_verses_and_prefixes_the_reference() {
        let mut reading = reading_with_verses(&[3, 4, 5]);
        reading.selection.insert(5);
        reading.selection.insert(3);
        assert_eq!(
            reading.copy_payload().unwrap(),
            "Génesis 1\n3. verso 3\n5. verso 5\n"
        );
    }

    #[test]
    fn copy_payload_is_none_without_a_selection() {
        let reading = reading_with_verses(&[1]);
        assert_eq!(reading.copy_payload(), None);
    }

    #[test]
    fn chapter_grid_cursor_stays_in_bounds() {
        let mut picker = ChapterPickerScreen::new("Salmo".to_string(), 25, 1);
        picker.move_selection(0, 1);
        assert_eq!(picker.current_chapter(), 11);
        picker.move_selection(0, 2);
        assert_eq!(picker.current_chapter(), 25);
        picker.move_selection(-1, 0);
        assert_eq!(picker.current_chapter(), 24);

        let mut empty = ChapterPickerScreen::new("Job".to_string(), 0, 1);
        empty.move_selection(1, 1);
        assert_eq!(empty.selected, 0);
    }

    #[test]
    fn color_menu_wraps_around_the_palette() {
        let mut menu = ColorMenuState::new();
        menu.move_selection(-1);
        assert_eq!(menu.current_color(), HIGHLIGHT_PALETTE[4]);
        menu.move_selection(1);
        assert_eq!(menu.current_color(), HIGHLIGHT_PALETTE[0]);
    }
}
