use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Header,
    Breaking,
    Main,
    Secondary,
    Sidebar,
    Footer,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Header => "header",
            SectionType::Breaking => "breaking",
            SectionType::Main => "main",
            SectionType::Secondary => "secondary",
            SectionType::Sidebar => "sidebar",
            SectionType::Footer => "footer",
        }
    }

    /// Header and footer carry static content, never articles.
    pub fn is_static(&self) -> bool {
        matches!(self, SectionType::Header | SectionType::Footer)
    }

    pub fn heading(&self) -> Option<&'static str> {
        match self {
            SectionType::Breaking => Some("BREAKING NEWS"),
            SectionType::Sidebar => Some("LATEST"),
            SectionType::Secondary => Some("MORE NEWS"),
            _ => None,
        }
    }
}

impl std::str::FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "header" => Ok(SectionType::Header),
            "breaking" => Ok(SectionType::Breaking),
            "main" => Ok(SectionType::Main),
            "secondary" => Ok(SectionType::Secondary),
            "sidebar" => Ok(SectionType::Sidebar),
            "footer" => Ok(SectionType::Footer),
            _ => Err(format!("Unknown section type: {}", s)),
        }
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    Single,
    Double,
    Triple,
    Grid,
}

impl LayoutStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutStrategy::Single => "single",
            LayoutStrategy::Double => "double",
            LayoutStrategy::Triple => "triple",
            LayoutStrategy::Grid => "grid",
        }
    }

    /// Number of body characters kept in an article preview.
    pub fn truncation_budget(&self) -> usize {
        match self {
            LayoutStrategy::Single => 200,
            LayoutStrategy::Double => 150,
            LayoutStrategy::Triple => 100,
            LayoutStrategy::Grid => 80,
        }
    }

    /// Hard cap on articles a strategy can draw, if it has one.
    pub fn cell_limit(&self) -> Option<usize> {
        match self {
            LayoutStrategy::Triple => Some(3),
            LayoutStrategy::Grid => Some(4),
            LayoutStrategy::Single | LayoutStrategy::Double => None,
        }
    }
}

impl std::fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Axis-aligned rectangle in millimetres, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const EPSILON: f32 = 0.01;
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    pub fn inset(&self, padding: f32) -> Rect {
        Rect::new(
            self.x + padding,
            self.y + padding,
            (self.width - 2.0 * padding).max(0.0),
            (self.height - 2.0 * padding).max(0.0),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_type: SectionType,
    pub rect: Rect,
    pub max_articles: usize,
    pub strategy: LayoutStrategy,
}

impl Section {
    pub fn new(
        section_type: SectionType,
        rect: Rect,
        max_articles: usize,
        strategy: LayoutStrategy,
    ) -> Self {
        Self {
            section_type,
            rect,
            max_articles,
            strategy,
        }
    }

    /// Whether the distributor should ever hand articles to this section.
    pub fn takes_articles(&self) -> bool {
        !self.section_type.is_static() && self.max_articles > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub page: PageSize,
    pub margins: Margins,
    pub sections: Vec<Section>,
}

impl Template {
    /// Printable area of the page.
    pub fn content_area(&self) -> Rect {
        Rect::new(
            self.margins.left,
            self.margins.top,
            self.page.width - self.margins.left - self.margins.right,
            self.page.height - self.margins.top - self.margins.bottom,
        )
    }

    pub fn section(&self, section_type: SectionType) -> Option<&Section> {
        self.sections.iter().find(|s| s.section_type == section_type)
    }

    pub fn total_capacity(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.takes_articles())
            .map(|s| s.max_articles)
            .sum()
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}
