pub mod article;
pub mod generation;
pub mod template;

pub use article::{Article, ArticleStatus, BreakingNews, Category};
pub use generation::{
    ArticlePreview, GenerationOptions, GenerationResult, GenerationStage, PreviewResponse,
};
pub use template::{
    LayoutStrategy, Margins, PageSize, Rect, Section, SectionType, Template, TemplateSummary,
};
