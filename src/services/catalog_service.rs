use std::sync::Arc;

use tracing::warn;

use crate::domain::{ArticlePreview, GenerationOptions, PreviewResponse, TemplateSummary};
use crate::errors::EpaperResult;
use crate::layout::text::{plain_text, truncate_preview};
use crate::sources::ArticleSource;
use crate::storage::traits::ContentRepository;
use crate::templates::TemplateRegistry;

/// Characters of body text shown per previewed article.
pub const PREVIEW_BUDGET: usize = 200;

/// Shown when the category table cannot be read.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "জাতীয়",
    "আন্তর্জাতিক",
    "রাজনীতি",
    "অর্থনীতি",
    "খেলা",
    "বিনোদন",
    "প্রযুক্তি",
    "স্বাস্থ্য",
    "শিক্ষা",
    "মতামত",
];

/// Read-only lookups callers make before committing to a generation.
pub struct CatalogService<R: ContentRepository> {
    registry: Arc<TemplateRegistry>,
    source: ArticleSource<R>,
}

impl<R: ContentRepository> CatalogService<R> {
    pub fn new(registry: Arc<TemplateRegistry>, source: ArticleSource<R>) -> Self {
        Self { registry, source }
    }

    pub fn list_templates(&self) -> Vec<TemplateSummary> {
        self.registry.list()
    }

    /// Category names; never fails, falling back to the built-in list.
    pub fn list_categories(&self) -> Vec<String> {
        match self.source.categories() {
            Ok(names) if !names.is_empty() => names,
            Ok(_) => {
                warn!("No categories in content store, using defaults");
                default_categories()
            }
            Err(e) => {
                warn!(error = %e, "Category lookup failed, using defaults");
                default_categories()
            }
        }
    }

    /// The articles a generation with these options would draw from.
    pub fn preview_articles(&self, options: &GenerationOptions) -> EpaperResult<PreviewResponse> {
        let date = options.parsed_date()?;
        let articles: Vec<ArticlePreview> = self
            .source
            .fetch_candidates(options, date)?
            .iter()
            .map(|a| {
                let content = truncate_preview(&plain_text(&a.content), PREVIEW_BUDGET);
                ArticlePreview::from_article(a, content)
            })
            .collect();

        Ok(PreviewResponse {
            total: articles.len(),
            articles,
        })
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}
