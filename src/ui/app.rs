use std::collections::{HashMap, HashSet};
use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::{ScriptureLibrary, UserStore};
use crate::models::{VersionFiles, BOOK_ORDER, HIGHLIGHT_PALETTE, VERSIONS};
use crate::sanitize::{clean_note, clean_verse};

use super::helpers::{
    centered_rect, copy_to_clipboard, highlight_color, reading_column_width, surface_error,
};
use super::screens::{
    BookPickerScreen, ChapterPickerScreen, ColorMenuState, HomeScreen, NoteView, ReadingScreen,
    SettingsField, SettingsScreen, VerseLine, CHAPTER_GRID_COLUMNS,
};

/// Footer space reserved for status messages and key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Book and chapter shown before the user navigates anywhere.
const DEFAULT_BOOK: &str = "Génesis";
/// Font size slider bounds and default, persisted under the `font_size` key.
const MIN_FONT_SIZE: u16 = 14;
const MAX_FONT_SIZE: u16 = 40;
const DEFAULT_FONT_SIZE: u16 = 18;
/// Sample paragraph rendered by the settings preview box.
const SETTINGS_PREVIEW: &str = "Toda la Escritura es inspirada por Dios.\n(2 Timoteo 3:16)";

/// High-level navigation states. Each variant carries the state that makes it
/// renderable, so a transition that skips its setup simply cannot be
/// expressed: the chapter picker always knows its book, the reading screen is
/// always a loaded chapter.
enum Screen {
    Home(HomeScreen),
    Books(BookPickerScreen),
    Chapters(ChapterPickerScreen),
    Reading(ReadingScreen),
    Settings(SettingsScreen),
}

/// Modal overlays scoped to the current screen.
enum Mode {
    Normal,
    ColorMenu(ColorMenuState),
    Note(NoteView),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Colors derived from the persisted theme. Dark mode leans on the terminal's
/// own background; light mode paints one.
struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
}

/// Central application state shared across the TUI.
pub struct App {
    store: UserStore,
    library: ScriptureLibrary,
    version: &'static VersionFiles,
    book: String,
    chapter: u32,
    theme_dark: bool,
    font_size: u16,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the initial state: settings come from the user store with their
    /// documented defaults, the session starts on the home screen pointed at
    /// the first registered version.
    pub fn new(store: UserStore, library: ScriptureLibrary) -> Result<Self> {
        let theme = store.setting_or("theme", "dark")?;
        let font_size = store
            .setting_or("font_size", "18")?
            .parse::<u16>()
            .unwrap_or(DEFAULT_FONT_SIZE)
            .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);

        let version = &VERSIONS[0];
        Ok(Self {
            store,
            library,
            version,
            book: DEFAULT_BOOK.to_string(),
            chapter: 1,
            theme_dark: theme != "light",
            font_size,
            screen: Screen::Home(HomeScreen::new(version)),
            mode: Mode::Normal,
            status: None,
        })
    }

    // ------------------------------------------------------------------
    // Input handling
    // ------------------------------------------------------------------

    /// Dispatch one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ColorMenu(menu) => self.handle_color_menu(code, menu),
            Mode::Note(view) => Self::handle_note_view(code, view),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        // Ownership of the screen moves through the handler so transitions
        // can consume the state they are leaving behind.
        let screen = mem::replace(&mut self.screen, Screen::Home(HomeScreen::new(self.version)));
        let (screen, mode) = match screen {
            Screen::Home(home) => self.handle_home_key(code, home, exit),
            Screen::Books(picker) => self.handle_books_key(code, picker, exit),
            Screen::Chapters(picker) => self.handle_chapters_key(code, picker, exit),
            Screen::Reading(reading) => self.handle_reading_key(code, reading, exit),
            Screen::Settings(settings) => self.handle_settings_key(code, settings, exit),
        };
        self.screen = screen;
        Ok(mode)
    }

    fn handle_home_key(
        &mut self,
        code: KeyCode,
        mut home: HomeScreen,
        exit: &mut bool,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => home.move_selection(-1),
            KeyCode::Down => home.move_selection(1),
            KeyCode::Enter => {
                self.version = home.version();
                self.clear_status();
                let reading = self.load_chapter();
                return (Screen::Reading(reading), Mode::Normal);
            }
            KeyCode::Char('a') | KeyCode::Char('s') => {
                self.clear_status();
                return (Screen::Settings(SettingsScreen::new()), Mode::Normal);
            }
            _ => {}
        }
        (Screen::Home(home), Mode::Normal)
    }

    fn handle_reading_key(
        &mut self,
        code: KeyCode,
        mut reading: ReadingScreen,
        exit: &mut bool,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Char('m') => {
                self.clear_status();
                return (Screen::Home(HomeScreen::new(self.version)), Mode::Normal);
            }
            KeyCode::Char('b') | KeyCode::Char('l') => {
                self.clear_status();
                return (
                    Screen::Books(BookPickerScreen::focused_on(&self.book)),
                    Mode::Normal,
                );
            }
            KeyCode::Up => reading.move_cursor(-1),
            KeyCode::Down => reading.move_cursor(1),
            KeyCode::PageUp => reading.move_cursor(-5),
            KeyCode::PageDown => reading.move_cursor(5),
            KeyCode::Home => reading.select_first(),
            KeyCode::End => reading.select_last(),
            KeyCode::Left => {
                if self.chapter > 1 {
                    self.chapter -= 1;
                    self.clear_status();
                    let reading = self.load_chapter();
                    return (Screen::Reading(reading), Mode::Normal);
                }
            }
            KeyCode::Right => {
                self.chapter += 1;
                self.clear_status();
                let reading = self.load_chapter();
                return (Screen::Reading(reading), Mode::Normal);
            }
            KeyCode::Char(' ') => reading.toggle_selection(),
            KeyCode::Enter => {
                reading.seed_selection_from_cursor();
                if reading.selection.is_empty() {
                    self.set_status("No hay versículos en este capítulo.", StatusKind::Info);
                } else {
                    return (Screen::Reading(reading), Mode::ColorMenu(ColorMenuState::new()));
                }
            }
            KeyCode::Char('n') => {
                if let Some(verse) = reading.cursor_verse() {
                    if let Some(note) = verse.note.clone() {
                        let view = NoteView {
                            verse: verse.number,
                            text: note,
                            scroll: 0,
                        };
                        return (Screen::Reading(reading), Mode::Note(view));
                    }
                    self.set_status("Este versículo no tiene nota.", StatusKind::Info);
                }
            }
            _ => {}
        }
        (Screen::Reading(reading), Mode::Normal)
    }

    fn handle_books_key(
        &mut self,
        code: KeyCode,
        mut picker: BookPickerScreen,
        exit: &mut bool,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                self.clear_status();
                let reading = self.load_chapter();
                return (Screen::Reading(reading), Mode::Normal);
            }
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-5),
            KeyCode::PageDown => picker.move_selection(5),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Enter => {
                let book = picker.current_book().to_string();
                match self.library.chapter_count(self.version.key, &book) {
                    Ok(total) => {
                        self.clear_status();
                        let current = if book == self.book { self.chapter } else { 1 };
                        return (
                            Screen::Chapters(ChapterPickerScreen::new(book, total, current)),
                            Mode::Normal,
                        );
                    }
                    Err(err) => {
                        self.set_status(
                            format!("No se pudo abrir {book}: {err}"),
                            StatusKind::Error,
                        );
                    }
                }
            }
            _ => {}
        }
        (Screen::Books(picker), Mode::Normal)
    }

    fn handle_chapters_key(
        &mut self,
        code: KeyCode,
        mut picker: ChapterPickerScreen,
        exit: &mut bool,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                self.clear_status();
                return (
                    Screen::Books(BookPickerScreen::focused_on(&picker.book)),
                    Mode::Normal,
                );
            }
            KeyCode::Left => picker.move_selection(-1, 0),
            KeyCode::Right => picker.move_selection(1, 0),
            KeyCode::Up => picker.move_selection(0, -1),
            KeyCode::Down => picker.move_selection(0, 1),
            KeyCode::Enter => {
                if picker.total > 0 {
                    self.book = picker.book.clone();
                    self.chapter = picker.current_chapter();
                    self.clear_status();
                    let reading = self.load_chapter();
                    return (Screen::Reading(reading), Mode::Normal);
                }
                self.set_status("Este libro no tiene capítulos.", StatusKind::Info);
            }
            _ => {}
        }
        (Screen::Chapters(picker), Mode::Normal)
    }

    fn handle_settings_key(
        &mut self,
        code: KeyCode,
        mut settings: SettingsScreen,
        exit: &mut bool,
    ) -> (Screen, Mode) {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Char('v') => {
                self.clear_status();
                return (Screen::Home(HomeScreen::new(self.version)), Mode::Normal);
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => settings.toggle_field(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if settings.field == SettingsField::Theme {
                    self.theme_dark = !self.theme_dark;
                    let value = if self.theme_dark { "dark" } else { "light" };
                    self.persist_setting("theme", value);
                }
            }
            KeyCode::Left | KeyCode::Right => {
                if settings.field == SettingsField::FontSize {
                    let delta: i32 = if code == KeyCode::Left { -1 } else { 1 };
                    let new = (self.font_size as i32 + delta)
                        .clamp(MIN_FONT_SIZE as i32, MAX_FONT_SIZE as i32);
                    self.font_size = new as u16;
                    self.persist_setting("font_size", &self.font_size.to_string());
                }
            }
            _ => {}
        }
        (Screen::Settings(settings), Mode::Normal)
    }

    fn handle_color_menu(&mut self, code: KeyCode, mut menu: ColorMenuState) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Left => menu.move_selection(-1),
            KeyCode::Right => menu.move_selection(1),
            KeyCode::Char(digit @ '1'..='5') => {
                menu.selected = digit as usize - '1' as usize;
                self.apply_color_to_selection(Some(HIGHLIGHT_PALETTE[menu.selected]));
                return Mode::Normal;
            }
            KeyCode::Enter => {
                self.apply_color_to_selection(Some(menu.current_color()));
                return Mode::Normal;
            }
            KeyCode::Char('c') => {
                self.copy_selection();
                return Mode::Normal;
            }
            KeyCode::Char('l') => {
                self.apply_color_to_selection(None);
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::ColorMenu(menu)
    }

    fn handle_note_view(code: KeyCode, mut view: NoteView) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return Mode::Normal,
            KeyCode::Up => view.scroll = view.scroll.saturating_sub(1),
            KeyCode::Down => view.scroll = view.scroll.saturating_add(1),
            KeyCode::PageUp => view.scroll = view.scroll.saturating_sub(5),
            KeyCode::PageDown => view.scroll = view.scroll.saturating_add(5),
            _ => {}
        }
        Mode::Note(view)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Load the current book/chapter into a fresh reading screen: query the
    /// verses, paint bookmarks from one chapter-wide map, sanitize each verse
    /// into the copy cache, and attach study notes where the commentary
    /// database has them.
    ///
    /// Storage failures degrade to an empty or partial screen with the cause
    /// in the status footer; navigation never aborts the app.
    fn load_chapter(&mut self) -> ReadingScreen {
        let mut reading = ReadingScreen {
            book: self.book.clone(),
            chapter: self.chapter,
            book_id: None,
            verses: Vec::new(),
            cache: HashMap::new(),
            selection: HashSet::new(),
            cursor: 0,
        };

        let (verses, book_id) =
            match self
                .library
                .chapter_verses(self.version.key, &self.book, self.chapter)
            {
                Ok(result) => result,
                Err(err) => {
                    self.set_status(
                        format!("No se pudo cargar el capítulo: {err}"),
                        StatusKind::Error,
                    );
                    return reading;
                }
            };
        reading.book_id = book_id;

        let marks = match book_id {
            Some(id) => match self.store.bookmarks(id, self.chapter) {
                Ok(marks) => marks,
                Err(err) => {
                    self.set_status(
                        format!("No se pudieron leer los marcadores: {err}"),
                        StatusKind::Error,
                    );
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        let mut notes_unavailable = false;
        for verse in verses {
            let clean = clean_verse(&verse.text);
            let note = match book_id {
                Some(id) => {
                    match self
                        .library
                        .note(self.version.key, id, self.chapter, verse.number)
                    {
                        Ok(note) => note.map(|raw| clean_note(&raw)),
                        Err(_) => {
                            notes_unavailable = true;
                            None
                        }
                    }
                }
                None => None,
            };
            reading.cache.insert(verse.number, clean.clone());
            reading.verses.push(VerseLine {
                number: verse.number,
                text: clean,
                color: marks.get(&verse.number).cloned(),
                note,
            });
        }

        if notes_unavailable {
            self.set_status(
                "Las notas de estudio no están disponibles.",
                StatusKind::Error,
            );
        }

        reading
    }

    /// Write (or clear, when `color` is `None`) a bookmark for every selected
    /// verse, then reload the chapter so the fresh highlight state and an
    /// empty selection come back from the store rather than being patched in
    /// memory.
    fn apply_color_to_selection(&mut self, color: Option<&str>) {
        let (book_id, chapter, selected) = match &self.screen {
            Screen::Reading(reading) => {
                (reading.book_id, reading.chapter, reading.selected_ascending())
            }
            _ => return,
        };
        let Some(book_id) = book_id else {
            self.set_status(
                "El capítulo no está vinculado a un libro.",
                StatusKind::Error,
            );
            return;
        };

        let mut failure = None;
        for verse in selected {
            if let Err(err) = self.store.set_bookmark(book_id, chapter, verse, color) {
                failure = Some(err);
            }
        }
        if let Some(err) = failure {
            self.set_status(
                format!("No se pudo guardar el marcador: {err}"),
                StatusKind::Error,
            );
        }

        let reading = self.load_chapter();
        self.screen = Screen::Reading(reading);
    }

    /// Put the selected verses on the system clipboard and reset the
    /// selection. The payload comes from the sanitized chapter cache, so what
    /// lands on the clipboard is exactly what the reader saw.
    fn copy_selection(&mut self) {
        let payload = match &self.screen {
            Screen::Reading(reading) => reading.copy_payload(),
            _ => None,
        };
        let Some(payload) = payload else {
            self.set_status("No hay versículos seleccionados.", StatusKind::Info);
            return;
        };

        match copy_to_clipboard(&payload) {
            Ok(()) => self.set_status("Copiado al portapapeles", StatusKind::Info),
            Err(err) => self.set_status(
                format!("No se pudo copiar: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }

        let reading = self.load_chapter();
        self.screen = Screen::Reading(reading);
    }

    fn persist_setting(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set_setting(key, value) {
            self.set_status(
                format!("No se pudo guardar el ajuste: {err}"),
                StatusKind::Error,
            );
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn palette(&self) -> Palette {
        if self.theme_dark {
            Palette {
                bg: Color::Reset,
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
            }
        } else {
            Palette {
                bg: Color::White,
                fg: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
            }
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn draw(&self, frame: &mut Frame) {
        let palette = self.palette();
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
            area,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(area);

        match &self.screen {
            Screen::Home(home) => self.draw_home(frame, chunks[0], home, &palette),
            Screen::Books(picker) => self.draw_books(frame, chunks[0], picker, &palette),
            Screen::Chapters(picker) => self.draw_chapters(frame, chunks[0], picker, &palette),
            Screen::Reading(reading) => self.draw_reading(frame, chunks[0], reading, &palette),
            Screen::Settings(settings) => self.draw_settings(frame, chunks[0], settings, &palette),
        }

        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::ColorMenu(menu) => self.draw_color_menu(frame, area, menu, &palette),
            Mode::Note(view) => self.draw_note(frame, area, view, &palette),
        }
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect, home: &HomeScreen, palette: &Palette) {
        let mut lines = vec![
            Line::from(Span::styled(
                "BIBLIA",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Versión:", Style::default().fg(palette.dim))),
        ];
        for (index, version) in VERSIONS.iter().enumerate() {
            let marker = if index == home.selected { "> " } else { "  " };
            let style = if index == home.selected {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker}{}", version.key),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] Leer ahora",
            Style::default().fg(palette.dim),
        )));
        lines.push(Line::from(Span::styled(
            "[a] Ajustes",
            Style::default().fg(palette.dim),
        )));

        let vertical_pad = area.height.saturating_sub(lines.len() as u16) / 2;
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        let body = Rect {
            x: area.x,
            y: area.y + vertical_pad,
            width: area.width,
            height: area.height.saturating_sub(vertical_pad),
        };
        frame.render_widget(paragraph, body);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect, picker: &BookPickerScreen, palette: &Palette) {
        let items: Vec<ListItem> = BOOK_ORDER
            .iter()
            .map(|book| ListItem::new(Line::from(*book)))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Libros · {}", self.version.key)),
            )
            .highlight_style(
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chapters(
        &self,
        frame: &mut Frame,
        area: Rect,
        picker: &ChapterPickerScreen,
        palette: &Palette,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} · Capítulo", picker.book));

        if picker.total == 0 {
            let message = Paragraph::new("No hay capítulos disponibles para este libro.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let mut lines = Vec::new();
        let mut row = Vec::new();
        for chapter in 1..=picker.total {
            let cell = format!("{chapter:>4} ");
            let style = if chapter == picker.current_chapter() {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            row.push(Span::styled(cell, style));
            if chapter % CHAPTER_GRID_COLUMNS == 0 {
                lines.push(Line::from(mem::take(&mut row)));
            }
        }
        if !row.is_empty() {
            lines.push(Line::from(row));
        }

        let inner_height = block.inner(area).height.max(1);
        let cursor_row = (picker.selected / CHAPTER_GRID_COLUMNS) as u16;
        let scroll = cursor_row.saturating_sub(inner_height - 1);

        let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_reading(
        &self,
        frame: &mut Frame,
        area: Rect,
        reading: &ReadingScreen,
        palette: &Palette,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let header = Line::from(vec![
            Span::styled(
                reading.title(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.version.key, Style::default().fg(palette.dim)),
        ]);
        frame.render_widget(
            Paragraph::new(vec![header]).block(Block::default().borders(Borders::BOTTOM)),
            chunks[0],
        );

        let body = chunks[1];
        if reading.verses.is_empty() {
            let message = Paragraph::new("No hay texto para este capítulo.")
                .alignment(Alignment::Center);
            frame.render_widget(message, body);
            return;
        }

        // The persisted font size picks the column measure; the column sits
        // centered in whatever width the terminal gives us.
        let column_width = reading_column_width(body.width, self.font_size);
        let column = Rect {
            x: body.x + (body.width - column_width) / 2,
            y: body.y,
            width: column_width,
            height: body.height,
        };

        let mut lines = Vec::with_capacity(reading.verses.len());
        for (index, verse) in reading.verses.iter().enumerate() {
            let selected = reading.selection.contains(&verse.number);
            let at_cursor = index == reading.cursor;

            let mut number_style = Style::default().fg(palette.dim);
            if at_cursor {
                number_style = number_style
                    .fg(palette.accent)
                    .add_modifier(Modifier::REVERSED);
            }

            let mut text_style = Style::default().fg(palette.fg);
            if let Some(color) = verse.color.as_deref().and_then(highlight_color) {
                text_style = text_style.bg(color).fg(Color::Black);
            }
            if selected {
                text_style = text_style.add_modifier(Modifier::BOLD | Modifier::ITALIC);
            }

            let mut spans = vec![
                Span::styled(format!(" {} ", verse.number), number_style),
                Span::styled(verse.text.clone(), text_style),
            ];
            if verse.note.is_some() {
                spans.push(Span::styled(
                    " [#]",
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            lines.push(Line::from(spans));
        }

        let scroll = reading_scroll(reading, column.width, column.height);
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(paragraph, column);
    }

    fn draw_settings(
        &self,
        frame: &mut Frame,
        area: Rect,
        settings: &SettingsScreen,
        palette: &Palette,
    ) {
        let active = |field: SettingsField| {
            if settings.field == field {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };

        let theme_label = if self.theme_dark { "[x]" } else { "[ ]" };
        let slider_len = (MAX_FONT_SIZE - MIN_FONT_SIZE) as usize;
        let slider_pos = (self.font_size - MIN_FONT_SIZE) as usize;
        let mut slider = String::with_capacity(slider_len + 1);
        for step in 0..=slider_len {
            slider.push(if step == slider_pos { '|' } else { '-' });
        }

        let lines = vec![
            Line::from(Span::styled(
                "CONFIGURACIÓN",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Modo Oscuro {theme_label}"),
                active(SettingsField::Theme),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Tamaño de letra: {:>2}  {slider}", self.font_size),
                active(SettingsField::FontSize),
            )),
        ];

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);

        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Ajustes")),
            chunks[0],
        );

        // Live preview rendered at the measure the chosen size produces.
        let preview_block = Block::default().borders(Borders::ALL).title("Vista previa");
        let inner = preview_block.inner(chunks[1]);
        frame.render_widget(preview_block, chunks[1]);
        let column_width = reading_column_width(inner.width, self.font_size);
        let preview_area = Rect {
            x: inner.x + (inner.width - column_width) / 2,
            y: inner.y,
            width: column_width,
            height: inner.height,
        };
        frame.render_widget(
            Paragraph::new(SETTINGS_PREVIEW)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            preview_area,
        );
    }

    fn draw_color_menu(
        &self,
        frame: &mut Frame,
        area: Rect,
        menu: &ColorMenuState,
        palette: &Palette,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("OPCIONES");
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut swatches = Vec::new();
        for (index, hex) in HIGHLIGHT_PALETTE.iter().enumerate() {
            let color = highlight_color(hex).unwrap_or(palette.fg);
            let marker = if index == menu.selected { "[██]" } else { " ██ " };
            swatches.push(Span::styled(marker, Style::default().fg(color)));
            swatches.push(Span::raw(" "));
        }

        let lines = vec![
            Line::from(swatches),
            Line::from(""),
            Line::from(Span::styled(
                "[Enter] Marcar   [c] Copiar   [l] Limpiar   [Esc] Cancelar",
                Style::default().fg(palette.dim),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }

    fn draw_note(&self, frame: &mut Frame, area: Rect, view: &NoteView, palette: &Palette) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Nota de estudio · v. {}", view.verse))
            .title_style(Style::default().fg(palette.accent));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let paragraph = Paragraph::new(view.text.as_str())
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0));
        frame.render_widget(paragraph, inner);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hint = |pairs: &[(&str, &str)]| {
            let mut spans = Vec::new();
            for (key, label) in pairs {
                spans.push(Span::styled((*key).to_string(), key_style));
                spans.push(Span::raw(format!(" {label}   ")));
            }
            Line::from(spans)
        };

        match (&self.screen, &self.mode) {
            (_, Mode::ColorMenu(_)) => hint(&[
                ("[←→ 1-5]", "Color"),
                ("[Enter]", "Marcar"),
                ("[c]", "Copiar"),
                ("[l]", "Limpiar"),
                ("[Esc]", "Cancelar"),
            ]),
            (_, Mode::Note(_)) => hint(&[("[↑↓]", "Desplazar"), ("[Esc]", "Cerrar")]),
            (Screen::Home(_), _) => hint(&[
                ("[↑↓]", "Versión"),
                ("[Enter]", "Leer ahora"),
                ("[a]", "Ajustes"),
                ("[q]", "Salir"),
            ]),
            (Screen::Books(_), _) => hint(&[
                ("[↑↓]", "Libro"),
                ("[Enter]", "Capítulos"),
                ("[Esc]", "Volver"),
                ("[q]", "Salir"),
            ]),
            (Screen::Chapters(_), _) => hint(&[
                ("[←↑↓→]", "Capítulo"),
                ("[Enter]", "Leer"),
                ("[Esc]", "Volver"),
                ("[q]", "Salir"),
            ]),
            (Screen::Reading(_), _) => hint(&[
                ("[↑↓]", "Versículo"),
                ("[Espacio]", "Seleccionar"),
                ("[Enter]", "Marcar"),
                ("[n]", "Nota"),
                ("[←→]", "Capítulo"),
                ("[b]", "Libros"),
                ("[m]", "Menú"),
                ("[q]", "Salir"),
            ]),
            (Screen::Settings(_), _) => hint(&[
                ("[↑↓]", "Opción"),
                ("[Enter]", "Alternar"),
                ("[←→]", "Tamaño"),
                ("[Esc]", "Volver"),
                ("[q]", "Salir"),
            ]),
        }
    }
}

/// Keep the cursor verse in view. Verses wrap, so the scroll offset is an
/// estimate of rendered rows before the cursor minus half a viewport; for the
/// chapter sizes in the bundled data the estimate stays within a line or two
/// of exact.
fn reading_scroll(reading: &ReadingScreen, width: u16, height: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows_before: usize = reading
        .verses
        .iter()
        .take(reading.cursor)
        .map(|verse| verse.text.chars().count() / width + 1)
        .sum();
    rows_before.saturating_sub(height as usize / 2) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::{tempdir, TempDir};

    const RAW_GENESIS_1_1: &str =
        "En el principio <i>creó</i> Dios[1] los cielos y la tierra .";

    /// Stand up a data directory with an NVI translation fixture, a user
    /// store, and an app pointed at both.
    fn fixture_app() -> (TempDir, App) {
        let dir = tempdir().unwrap();
        let conn = Connection::open(dir.path().join("NVI'22.SQLite3")).unwrap();
        conn.execute_batch(
            "CREATE TABLE books (book_number INTEGER, long_name TEXT, short_name TEXT);
             CREATE TABLE verses (book_number INTEGER, chapter INTEGER, verse INTEGER, text TEXT);
             INSERT INTO books VALUES (1, 'Génesis', 'Gn');
             INSERT INTO verses VALUES (1, 1, 1, 'En el principio <i>creó</i> Dios[1] los cielos y la tierra .');
             INSERT INTO verses VALUES (1, 1, 2, 'Y la tierra estaba desordenada y vacía');
             INSERT INTO verses VALUES (1, 1, 3, 'Y dijo Dios: Sea la luz');
             INSERT INTO verses VALUES (1, 1, 4, 'Y vio Dios que la luz era buena');
             INSERT INTO verses VALUES (1, 1, 5, 'Y llamó Dios a la luz Día');
             INSERT INTO verses VALUES (1, 2, 1, 'Fueron, pues, acabados los cielos');",
        )
        .unwrap();
        drop(conn);

        let store = UserStore::open(dir.path().join("user_data.db")).unwrap();
        let library = ScriptureLibrary::new(dir.path());
        let app = App::new(store, library).unwrap();
        (dir, app)
    }

    fn reading(app: &App) -> &ReadingScreen {
        match &app.screen {
            Screen::Reading(reading) => reading,
            _ => panic!("expected the reading screen"),
        }
    }

    #[test]
    fn defaults_come_from_the_settings_table() {
        let (_dir, app) = fixture_app();
        assert!(app.theme_dark);
        assert_eq!(app.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(app.version.key, "NVI");
        assert_eq!(app.book, "Génesis");
        assert_eq!(app.chapter, 1);
    }

    #[test]
    fn loading_genesis_caches_the_sanitized_text() {
        let (_dir, mut app) = fixture_app();
        let loaded = app.load_chapter();

        assert_eq!(loaded.book_id, Some(1));
        assert_eq!(loaded.verses.len(), 5);
        let expected = clean_verse(RAW_GENESIS_1_1);
        assert_eq!(
            expected,
            "En el principio creó Dios los cielos y la tierra."
        );
        assert_eq!(loaded.cache.get(&1), Some(&expected));
        assert_eq!(loaded.verses[0].text, expected);
        assert!(app.status.is_none());
    }

    #[test]
    fn home_enter_transitions_to_reading() {
        let (_dir, mut app) = fixture_app();
        let exit = app.handle_key(KeyCode::Enter).unwrap();
        assert!(!exit);
        assert_eq!(reading(&app).title(), "Génesis 1");
    }

    #[test]
    fn applying_a_color_paints_every_selected_verse_and_clears_selection() {
        let (_dir, mut app) = fixture_app();
        let mut loaded = app.load_chapter();
        loaded.selection.insert(3);
        loaded.selection.insert(4);
        app.screen = Screen::Reading(loaded);

        app.apply_color_to_selection(Some("#99FFFF00"));

        let after = reading(&app);
        assert!(after.selection.is_empty());
        let painted: Vec<_> = after
            .verses
            .iter()
            .filter(|v| v.color.as_deref() == Some("#99FFFF00"))
            .map(|v| v.number)
            .collect();
        assert_eq!(painted, vec![3, 4]);

        let stored = app.store.bookmarks(1, 1).unwrap();
        assert_eq!(stored.get(&3).map(String::as_str), Some("#99FFFF00"));
        assert_eq!(stored.get(&4).map(String::as_str), Some("#99FFFF00"));
    }

    #[test]
    fn clearing_removes_the_highlight_rows() {
        let (_dir, mut app) = fixture_app();
        let mut loaded = app.load_chapter();
        loaded.selection.insert(3);
        app.screen = Screen::Reading(loaded);
        app.apply_color_to_selection(Some("#9900CCFF"));

        let mut loaded = app.load_chapter();
        loaded.selection.insert(3);
        app.screen = Screen::Reading(loaded);
        app.apply_color_to_selection(None);

        assert!(app.store.bookmarks(1, 1).unwrap().is_empty());
        assert!(reading(&app).verses.iter().all(|v| v.color.is_none()));
    }

    #[test]
    fn copy_payload_matches_the_documented_shape() {
        let (_dir, mut app) = fixture_app();
        let mut loaded = app.load_chapter();
        loaded.selection.insert(5);
        let expected = format!("Génesis 1\n5. {}\n", loaded.cache[&5]);
        assert_eq!(loaded.copy_payload().unwrap(), expected);
        app.screen = Screen::Reading(loaded);
    }

    #[test]
    fn chapter_navigation_floors_at_one() {
        let (_dir, mut app) = fixture_app();
        app.screen = Screen::Reading(app.load_chapter());

        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.chapter, 1);

        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.chapter, 2);
        assert_eq!(reading(&app).verses.len(), 1);

        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.chapter, 1);
        assert_eq!(reading(&app).verses.len(), 5);
    }

    #[test]
    fn navigation_replaces_the_selection_wholesale() {
        let (_dir, mut app) = fixture_app();
        let mut loaded = app.load_chapter();
        loaded.selection.insert(2);
        app.screen = Screen::Reading(loaded);

        app.handle_key(KeyCode::Right).unwrap();
        assert!(reading(&app).selection.is_empty());
    }

    #[test]
    fn settings_changes_persist_immediately() {
        let (_dir, mut app) = fixture_app();
        app.screen = Screen::Settings(SettingsScreen::new());

        app.handle_key(KeyCode::Enter).unwrap();
        assert!(!app.theme_dark);
        assert_eq!(app.store.setting("theme").unwrap().as_deref(), Some("light"));

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.font_size, DEFAULT_FONT_SIZE + 1);
        assert_eq!(
            app.store.setting("font_size").unwrap().as_deref(),
            Some("19")
        );
    }

    #[test]
    fn enter_on_a_verse_opens_the_color_menu_seeded_with_the_cursor() {
        let (_dir, mut app) = fixture_app();
        app.screen = Screen::Reading(app.load_chapter());

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::ColorMenu(_)));
        assert_eq!(reading(&app).selected_ascending(), vec![2]);
    }

    #[test]
    fn missing_translation_degrades_to_an_empty_screen_with_status() {
        let (_dir, mut app) = fixture_app();
        app.version = &VERSIONS[1]; // LBLA has no fixture file on disk
        let loaded = app.load_chapter();
        assert!(loaded.verses.is_empty());
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }
}
