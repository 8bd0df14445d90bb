use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Error, Result};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Translate a stored `#AARRGGBB` (or `#RRGGBB`) highlight value into a
/// terminal color. The alpha byte only matters on canvases that blend, so it
/// is skipped here. Unparseable values render as no highlight at all rather
/// than a wrong one.
pub(crate) fn highlight_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let rgb = match digits.len() {
        8 => &digits[2..],
        6 => digits,
        _ => return None,
    };
    let r = u8::from_str_radix(&rgb[0..2], 16).ok()?;
    let g = u8::from_str_radix(&rgb[2..4], 16).ok()?;
    let b = u8::from_str_radix(&rgb[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Map the persisted font size onto a column measure for the reading view.
/// A terminal cannot scale glyphs, so "bigger type" becomes a narrower column
/// with the default size of 18 reading as full width. Never collapses below a
/// readable floor.
pub(crate) fn reading_column_width(available: u16, font_size: u16) -> u16 {
    let font_size = font_size.clamp(14, 40);
    let scaled = (available as u32 * 18 / font_size as u32) as u16;
    scaled.clamp(24.min(available), available)
}

/// Hand text to the system clipboard through whichever clipboard tool this
/// host has. Tried in order: `pbcopy` (macOS), `wl-copy` (Wayland), `xclip`
/// (X11).
pub(crate) fn copy_to_clipboard(text: &str) -> Result<()> {
    const TOOLS: [(&str, &[&str]); 3] = [
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
    ];

    for (tool, args) in TOOLS {
        let spawned = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = spawned else {
            continue;
        };
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        child.wait()?;
        return Ok(());
    }

    Err(anyhow!("no clipboard tool found (pbcopy, wl-copy, xclip)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_values_dropping_alpha() {
        assert_eq!(
            highlight_color("#99FFFF00"),
            Some(Color::Rgb(0xFF, 0xFF, 0x00))
        );
        assert_eq!(highlight_color("#9900CCFF"), Some(Color::Rgb(0, 0xCC, 0xFF)));
        assert_eq!(highlight_color("#AABBCC"), Some(Color::Rgb(0xAA, 0xBB, 0xCC)));
    }

    #[test]
    fn malformed_color_values_yield_no_highlight() {
        assert_eq!(highlight_color("99FFFF00"), None);
        assert_eq!(highlight_color("#99FF"), None);
        assert_eq!(highlight_color("#99FFGG00"), None);
        assert_eq!(highlight_color(""), None);
    }

    #[test]
    fn column_width_narrows_as_type_grows() {
        assert_eq!(reading_column_width(100, 18), 100);
        assert!(reading_column_width(100, 40) < reading_column_width(100, 24));
        assert!(reading_column_width(100, 40) >= 24);
        // Out-of-range sizes are clamped before scaling.
        assert_eq!(
            reading_column_width(100, 0),
            reading_column_width(100, 14)
        );
    }

    #[test]
    fn tiny_terminals_keep_the_full_width() {
        assert_eq!(reading_column_width(20, 40), 20);
    }
}
