use chrono::{DateTime, Utc};

use crate::domain::{Article, ArticleStatus, BreakingNews, Category};
use crate::errors::EpaperResult;

/// Filters applied by the content store when selecting candidate articles.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub include_categories: Vec<String>,
    pub exclude_categories: Vec<String>,
    pub published_from: DateTime<Utc>,
    pub published_until: DateTime<Utc>,
    pub limit: usize,
}

/// Read access to the newsroom content store.
#[cfg_attr(test, mockall::automock)]
pub trait ContentRepository: Send + Sync {
    /// Published articles matching `query`, ordered featured first, then by
    /// view count, then newest first.
    fn published_articles(&self, query: &ArticleQuery) -> EpaperResult<Vec<Article>>;
    /// Active, unexpired ticker entries, newest first.
    fn active_breaking_news(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> EpaperResult<Vec<BreakingNews>>;
    fn category_names(&self) -> EpaperResult<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub article: Article,
    pub category_id: Option<String>,
    pub status: ArticleStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBreakingNews {
    pub item: BreakingNews,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Write access used only for loading fixtures into the store.
#[cfg_attr(test, mockall::automock)]
pub trait ContentWriter: Send + Sync {
    fn add_category(&self, category: &Category) -> EpaperResult<()>;
    fn category_id(&self, name: &str) -> EpaperResult<Option<String>>;
    fn add_article(&self, article: &NewArticle) -> EpaperResult<()>;
    fn add_breaking_news(&self, item: &NewBreakingNews) -> EpaperResult<()>;
}
