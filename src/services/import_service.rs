use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Article, ArticleStatus, BreakingNews, Category};
use crate::errors::{EpaperError, EpaperResult};
use crate::storage::traits::{ContentWriter, NewArticle, NewBreakingNews};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFixture {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub articles: Vec<ArticleFixture>,
    #[serde(default)]
    pub breaking_news: Vec<BreakingFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFixture {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    /// Category name, resolved against the store.
    pub category: Option<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub view_count: i64,
    pub published_at: DateTime<Utc>,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingFixture {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub article_id: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
    pub invalid: Vec<(String, String)>, // (entry, error_message)
}

/// Loads JSON fixtures into the content store.
pub struct ImportService<W: ContentWriter> {
    writer: W,
}

impl<W: ContentWriter> ImportService<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn import_json(&self, content: &str) -> EpaperResult<ImportResult> {
        let fixture: ContentFixture = serde_json::from_str(content)?;
        Ok(self.import(fixture))
    }

    pub fn import(&self, fixture: ContentFixture) -> ImportResult {
        let mut result = ImportResult::default();

        for category in fixture.categories {
            let label = format!("category {}", category.name);
            record(&mut result, label, self.writer.add_category(&category));
        }

        for entry in fixture.articles {
            let label = format!("article {}", entry.id);
            let outcome = self.resolve_category(entry.category.as_deref()).and_then(|category_id| {
                let article = Article::new(entry.id, entry.title, entry.published_at)
                    .with_content(entry.content)
                    .with_image(entry.image_url)
                    .with_author(entry.author)
                    .with_category(entry.category)
                    .with_priority(entry.featured, entry.view_count);
                self.writer.add_article(&NewArticle {
                    article,
                    category_id,
                    status: entry.status,
                })
            });
            record(&mut result, label, outcome);
        }

        for entry in fixture.breaking_news {
            let label = format!("breaking news {}", entry.id);
            let new = NewBreakingNews {
                item: BreakingNews {
                    id: entry.id,
                    title: entry.title,
                    content: entry.content,
                    article_id: entry.article_id,
                    created_at: entry.created_at,
                },
                is_active: entry.is_active,
                expires_at: entry.expires_at,
            };
            record(&mut result, label, self.writer.add_breaking_news(&new));
        }

        result
    }

    fn resolve_category(&self, name: Option<&str>) -> EpaperResult<Option<String>> {
        match name {
            None => Ok(None),
            Some(name) => self
                .writer
                .category_id(name)?
                .map(Some)
                .ok_or_else(|| EpaperError::InvalidInput(format!("unknown category '{}'", name))),
        }
    }
}

fn record(result: &mut ImportResult, label: String, outcome: EpaperResult<()>) {
    match outcome {
        Ok(()) => result.added.push(label),
        Err(EpaperError::AlreadyExists(_)) => result.duplicates.push(label),
        Err(e) => result.invalid.push((label, e.to_string())),
    }
}
