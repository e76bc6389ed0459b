//! Text helpers: plain-text extraction, preview truncation and the font
//! handle used throughout layout.

use regex::Regex;
use std::sync::OnceLock;

pub const ELLIPSIS: &str = "...";

const PT_TO_MM: f32 = 25.4 / 72.0;

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

/// Strips markup left by the rich-text editor and collapses whitespace.
pub fn plain_text(html: &str) -> String {
    let without_tags = tag_regex().replace_all(html, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps the first `budget` characters and appends the ellipsis.
///
/// The suffix is added even when nothing was cut.
pub fn truncate_preview(body: &str, budget: usize) -> String {
    let mut preview: String = body.chars().take(budget).collect();
    preview.push_str(ELLIPSIS);
    preview
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
}

impl Font {
    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    /// Average advance of one character, in millimetres.
    pub fn char_width(&self) -> f32 {
        let em = if self.bold { 0.55 } else { 0.5 };
        self.size * em * PT_TO_MM
    }

    pub fn line_height(&self) -> f32 {
        self.size * 1.3 * PT_TO_MM
    }

    /// Width of `text` assuming every character has the average advance.
    pub fn estimated_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width()
    }
}
