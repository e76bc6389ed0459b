//! Font metrics for layout and embedding.
//!
//! Bengali needs a TrueType font with its own shaping rules, so text is
//! shaped with rustybuzz and measured from the font's real advances. When no
//! such font is available the renderer falls back to the PDF base fonts and
//! an average-width estimate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustybuzz::ttf_parser;
use rustybuzz::UnicodeBuffer;
use tracing::{info, warn};

use crate::errors::{EpaperError, EpaperResult};
use crate::layout::text::Font;

const PT_TO_MM: f32 = 25.4 / 72.0;

/// Install locations of Bengali-capable fonts on common distributions.
pub const FONT_SEARCH_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/noto/NotoSansBengali-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansBengali-Regular.ttf",
    "/usr/share/fonts/google-noto/NotoSansBengali-Regular.ttf",
    "/usr/share/fonts/truetype/lohit-bengali/Lohit-Bengali.ttf",
    "/usr/share/fonts/truetype/fonts-beng-extra/MuktiNarrow.ttf",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Advance after shaping, in thousandths of an em.
    pub advance: f32,
    /// Horizontal placement relative to the pen, in thousandths of an em.
    pub offset: f32,
    /// Source text of the cluster this glyph opens; empty for the rest.
    pub text: String,
}

/// Vertical metrics in thousandths of an em, as a PDF font descriptor wants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub bbox: [i32; 4],
}

/// TrueType font data held in memory.
#[derive(Debug)]
pub struct Typeface {
    name: String,
    data: Vec<u8>,
    units_per_em: f32,
}

impl Typeface {
    pub fn from_bytes(name: &str, data: Vec<u8>) -> EpaperResult<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| EpaperError::Config(format!("unreadable font {}: {}", name, e)))?;
        let units_per_em = f32::from(face.units_per_em());

        let mut ps_name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if ps_name.is_empty() {
            ps_name = "EmbeddedFont".to_string();
        }

        Ok(Self {
            name: ps_name,
            data,
            units_per_em,
        })
    }

    pub fn load(path: &Path) -> EpaperResult<Self> {
        let data = fs::read(path).map_err(|e| {
            EpaperError::Config(format!("cannot read font {}: {}", path.display(), e))
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(&stem, data)
    }

    /// PostScript-safe font name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn scale(&self) -> f32 {
        1000.0 / self.units_per_em
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    pub fn metrics(&self) -> FaceMetrics {
        let scale = self.scale();
        let to_em = |v: i16| (f32::from(v) * scale).round() as i32;

        match self.face() {
            Some(face) => {
                let bbox = face.global_bounding_box();
                FaceMetrics {
                    ascent: to_em(face.ascender()),
                    descent: to_em(face.descender()),
                    cap_height: to_em(face.capital_height().unwrap_or(face.ascender())),
                    bbox: [
                        to_em(bbox.x_min),
                        to_em(bbox.y_min),
                        to_em(bbox.x_max),
                        to_em(bbox.y_max),
                    ],
                }
            }
            None => FaceMetrics {
                ascent: 800,
                descent: -200,
                cap_height: 700,
                bbox: [0, -200, 1000, 800],
            },
        }
    }

    /// Unshaped advance of one glyph, in thousandths of an em.
    pub fn glyph_advance(&self, glyph_id: u16) -> f32 {
        self.face()
            .and_then(|face| face.glyph_hor_advance(ttf_parser::GlyphId(glyph_id)))
            .map(|advance| f32::from(advance) * self.scale())
            .unwrap_or(0.0)
    }

    /// Shapes one line of left-to-right text.
    pub fn shape(&self, text: &str) -> Vec<ShapedGlyph> {
        let Some(face) = rustybuzz::Face::from_slice(&self.data, 0) else {
            return Vec::new();
        };

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        let output = rustybuzz::shape(&face, &[], buffer);
        let infos = output.glyph_infos();
        let positions = output.glyph_positions();
        let scale = self.scale();

        infos
            .iter()
            .zip(positions)
            .enumerate()
            .map(|(index, (info, position))| {
                let start = info.cluster as usize;
                let opens_cluster = index == 0 || infos[index - 1].cluster != info.cluster;
                let cluster_text = if opens_cluster {
                    let end = infos[index + 1..]
                        .iter()
                        .map(|g| g.cluster as usize)
                        .find(|&c| c > start)
                        .unwrap_or(text.len());
                    text.get(start..end).unwrap_or_default().to_string()
                } else {
                    String::new()
                };

                ShapedGlyph {
                    glyph_id: u16::try_from(info.glyph_id).unwrap_or(0),
                    advance: position.x_advance as f32 * scale,
                    offset: position.x_offset as f32 * scale,
                    text: cluster_text,
                }
            })
            .collect()
    }
}

/// Regular and optional bold face. Bold text uses the regular face when no
/// bold face is configured.
#[derive(Debug)]
pub struct FaceSet {
    regular: Typeface,
    bold: Option<Typeface>,
}

impl FaceSet {
    pub fn new(regular: Typeface, bold: Option<Typeface>) -> Self {
        Self { regular, bold }
    }

    /// 0 for the regular face, 1 for a distinct bold face.
    pub fn slot(&self, font: Font) -> usize {
        usize::from(font.bold && self.bold.is_some())
    }

    pub fn face(&self, slot: usize) -> &Typeface {
        match (slot, &self.bold) {
            (1, Some(bold)) => bold,
            _ => &self.regular,
        }
    }

    pub fn has_bold(&self) -> bool {
        self.bold.is_some()
    }
}

/// Measures and wraps text for the renderer.
#[derive(Debug, Clone, Default)]
pub struct Typesetter {
    faces: Option<Arc<FaceSet>>,
}

impl Typesetter {
    /// PDF base fonts with estimated widths.
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn embedded(faces: FaceSet) -> Self {
        Self {
            faces: Some(Arc::new(faces)),
        }
    }

    /// Loads the configured fonts, or the first installed font from
    /// [`FONT_SEARCH_PATHS`]. An explicitly configured font that cannot be
    /// read is an error; finding none at all falls back to the base fonts.
    pub fn discover(regular: Option<&Path>, bold: Option<&Path>) -> EpaperResult<Self> {
        let found = match regular {
            Some(path) => Some(path.to_path_buf()),
            None => FONT_SEARCH_PATHS
                .iter()
                .copied()
                .map(PathBuf::from)
                .find(|p| p.is_file()),
        };

        let Some(path) = found else {
            warn!("No Unicode font found; text outside Latin-1 will print as '?'");
            return Ok(Self::builtin());
        };

        let regular = Typeface::load(&path)?;
        let bold = bold.map(Typeface::load).transpose()?;
        info!(font = %path.display(), bold = bold.is_some(), "Embedding font");
        Ok(Self::embedded(FaceSet::new(regular, bold)))
    }

    pub fn faces(&self) -> Option<&FaceSet> {
        self.faces.as_deref()
    }

    /// Rendered width of `text` in millimetres.
    pub fn text_width(&self, text: &str, font: Font) -> f32 {
        match self.faces() {
            Some(faces) => {
                let face = faces.face(faces.slot(font));
                let em: f32 = face.shape(text).iter().map(|g| g.advance).sum();
                em / 1000.0 * font.size * PT_TO_MM
            }
            None => font.estimated_width(text),
        }
    }

    /// Greedy word wrap to `width` millimetres. Words wider than a whole
    /// line are split.
    pub fn wrap(&self, text: &str, width: f32, font: Font) -> Vec<String> {
        let space = self.text_width(" ", font);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in text.split_whitespace() {
            let mut word = word.to_string();
            let mut word_width = self.text_width(&word, font);

            while word_width > width && !word.is_empty() {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                let (head, tail) = self.split_to_fit(&word, width, font);
                lines.push(head);
                word = tail;
                word_width = self.text_width(&word, font);
            }

            if word.is_empty() {
                continue;
            }
            if !current.is_empty() && current_width + space + word_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(&word);
            current_width += word_width;
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Longest prefix of `word` that fits `width`; at least one character.
    fn split_to_fit(&self, word: &str, width: f32, font: Font) -> (String, String) {
        let chars: Vec<char> = word.chars().collect();
        let mut end = 1;
        while end < chars.len() {
            let candidate: String = chars[..=end].iter().collect();
            if self.text_width(&candidate, font) > width {
                break;
            }
            end += 1;
        }
        let end = end.min(chars.len());
        (chars[..end].iter().collect(), chars[end..].iter().collect())
    }
}
