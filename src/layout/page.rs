use crate::domain::{PageSize, Rect};
use crate::layout::text::Font;

/// One drawing instruction in page coordinates (mm, origin top-left).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Single line of text whose line box starts at `top`. `width` is the
    /// measured advance of the line.
    Text {
        x: f32,
        top: f32,
        width: f32,
        text: String,
        font: Font,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
    },
    /// Filled rectangle; `gray` 0.0 is black, 1.0 white.
    FillRect { rect: Rect, gray: f32 },
}

impl DrawOp {
    pub fn bounds(&self) -> Rect {
        match self {
            DrawOp::Text {
                x,
                top,
                width,
                font,
                ..
            } => Rect::new(*x, *top, *width, font.line_height()),
            DrawOp::Line { x1, y1, x2, y2, .. } => Rect::new(
                x1.min(*x2),
                y1.min(*y2),
                (x2 - x1).abs(),
                (y2 - y1).abs(),
            ),
            DrawOp::FillRect { rect, .. } => *rect,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub size: PageSize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn text(&mut self, x: f32, top: f32, width: f32, text: impl Into<String>, font: Font) {
        self.ops.push(DrawOp::Text {
            x,
            top,
            width,
            text: text.into(),
            font,
        });
    }

    pub fn hline(&mut self, x1: f32, x2: f32, y: f32, width: f32) {
        self.ops.push(DrawOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            width,
        });
    }

    pub fn fill(&mut self, rect: Rect, gray: f32) {
        self.ops.push(DrawOp::FillRect { rect, gray });
    }

    /// All text drawn on the page, one entry per line.
    pub fn texts(&self) -> Vec<&str> {
        self.ops.iter().filter_map(DrawOp::text).collect()
    }
}

/// A rendered e-paper, ready to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}
