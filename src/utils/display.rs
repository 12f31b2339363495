//! Terminal display utilities.
//!
//! Width calculations use `unicode-width` so titles with wide characters
//! (CJK author names, symbols in chemical names) still line up.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

impl Terminal {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Get the global terminal information, initialized on first call.
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| Terminal {
        width: terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH),
        is_tty: io::stdout().is_terminal(),
    })
}

#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(1)
}

/// Display width of a string
pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Truncate text to fit within `max_width` columns, appending `...` when cut.
///
/// ```
/// use litreview::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut kept = String::new();
    for c in text.chars() {
        let w = char_width(c);
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }

    format!("{}...", kept)
}

/// Like [`truncate_with_ellipsis`], but cuts at the last whole word when one fits.
pub fn truncate_at_word(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let cut = truncate_with_ellipsis(text, max_width);
    let body = cut.trim_end_matches("...");
    // Only back off to a word boundary if the cut landed mid-word
    let next = text[body.len()..].chars().next();
    if next.is_some_and(|c| !c.is_whitespace()) {
        if let Some(space) = body.rfind(' ') {
            if space > 0 {
                return format!("{}...", body[..space].trim_end());
            }
        }
    }
    format!("{}...", body.trim_end())
}

/// Greedy word wrap to `width` columns
///
/// Words wider than the line are placed on their own line uncut.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let w = display_width(word);
        if current_width > 0 && current_width + 1 + w > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if current_width > 0 {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += w;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// First four characters of a year field, or the field itself if shorter
pub fn format_year(year: &str) -> String {
    year.chars().take(4).collect()
}

/// Column widths for the paper table: (title, authors, journal, year)
pub fn paper_table_columns(terminal_width: usize) -> (usize, usize, usize, usize) {
    let year = 6;
    // Borders and padding of a four column comfy-table
    let chrome = 13;
    let usable = terminal_width.saturating_sub(year + chrome).max(40);
    let title = usable / 2;
    let authors = usable / 4;
    let journal = usable - title - authors;
    (title, authors, journal, year)
}
