use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published article as read from the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub is_breaking: bool,
    pub category: Option<String>,
    pub author: Option<String>,
    pub featured: bool,
    pub view_count: i64,
}

impl Article {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            image_url: None,
            published_at,
            is_breaking: false,
            category: None,
            author: None,
            featured: false,
            view_count: 0,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_priority(mut self, featured: bool, view_count: i64) -> Self {
        self.featured = featured;
        self.view_count = view_count;
        self
    }
}

/// An entry of the breaking-news ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakingNews {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    /// Regular article this ticker entry points at, if any.
    pub article_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BreakingNews {
    /// Maps the ticker entry into the article shape the distributor consumes.
    ///
    /// Breaking items always outrank regular articles, so they carry the
    /// highest possible priority signal.
    pub fn into_article(self) -> Article {
        let id = self
            .article_id
            .unwrap_or_else(|| format!("breaking-{}", self.id));

        Article {
            id,
            title: self.title,
            content: self.content.unwrap_or_default(),
            image_url: None,
            published_at: self.created_at,
            is_breaking: true,
            category: None,
            author: None,
            featured: true,
            view_count: i64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Published,
    Draft,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Published => "published",
            ArticleStatus::Draft => "draft",
            ArticleStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "published" => Ok(ArticleStatus::Published),
            "draft" => Ok(ArticleStatus::Draft),
            "archived" => Ok(ArticleStatus::Archived),
            _ => Err(format!("Unknown article status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
}
