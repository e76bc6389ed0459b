use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, ToSql};

use crate::domain::{Article, ArticleStatus, BreakingNews, Category};
use crate::errors::{EpaperError, EpaperResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::{
    ArticleQuery, ContentRepository, ContentWriter, NewArticle, NewBreakingNews,
};

const ARTICLE_COLUMNS: &str = "a.id, a.title, a.content, a.image_url, a.author, \
     a.is_featured, a.view_count, a.published_at, c.name";

pub struct SqliteContentRepository {
    storage: SqliteStorage,
}

impl SqliteContentRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn row_to_article(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        author: row.get(4)?,
        featured: row.get(5)?,
        view_count: row.get(6)?,
        published_at: row.get(7)?,
        category: row.get(8)?,
        is_breaking: false,
    })
}

impl ContentRepository for SqliteContentRepository {
    fn published_articles(&self, query: &ArticleQuery) -> EpaperResult<Vec<Article>> {
        let mut sql = format!(
            "SELECT {} FROM articles a LEFT JOIN categories c ON c.id = a.category_id \
             WHERE a.status = ? AND a.published_at >= ? AND a.published_at < ?",
            ARTICLE_COLUMNS
        );
        let mut params: Vec<Box<dyn ToSql>> = vec![
            Box::new(ArticleStatus::Published.as_str()),
            Box::new(query.published_from),
            Box::new(query.published_until),
        ];

        if !query.include_categories.is_empty() {
            sql.push_str(&format!(
                " AND c.name IN ({})",
                placeholders(query.include_categories.len())
            ));
            for name in &query.include_categories {
                params.push(Box::new(name.clone()));
            }
        }

        if !query.exclude_categories.is_empty() {
            sql.push_str(&format!(
                " AND (c.name IS NULL OR c.name NOT IN ({}))",
                placeholders(query.exclude_categories.len())
            ));
            for name in &query.exclude_categories {
                params.push(Box::new(name.clone()));
            }
        }

        sql.push_str(
            " ORDER BY a.is_featured DESC, a.view_count DESC, a.published_at DESC LIMIT ?",
        );
        params.push(Box::new(query.limit as i64));

        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let articles = stmt.query_map(params_from_iter(params.iter()), row_to_article)?;

        articles.collect::<Result<Vec<_>, _>>().map_err(EpaperError::from)
    }

    fn active_breaking_news(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> EpaperResult<Vec<BreakingNews>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, content, article_id, created_at FROM breaking_news \
             WHERE is_active = 1 AND (expires_at IS NULL OR expires_at > ?1) \
             ORDER BY created_at DESC LIMIT ?2",
        )?;

        let items = stmt.query_map((now, limit as i64), |row| {
            Ok(BreakingNews {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                article_id: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        items.collect::<Result<Vec<_>, _>>().map_err(EpaperError::from)
    }

    fn category_names(&self) -> EpaperResult<Vec<String>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY name")?;
        let names = stmt.query_map([], |row| row.get(0))?;

        names.collect::<Result<Vec<_>, _>>().map_err(EpaperError::from)
    }
}

impl ContentWriter for SqliteContentRepository {
    fn add_category(&self, category: &Category) -> EpaperResult<()> {
        let conn = self.storage.connection()?;

        // Check within the same connection to avoid deadlock
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1 OR name = ?2)",
            (&category.id, &category.name),
            |row| row.get(0),
        )?;
        if exists {
            return Err(EpaperError::AlreadyExists(format!("category {}", category.name)));
        }

        conn.execute(
            "INSERT INTO categories (id, name, slug) VALUES (?1, ?2, ?3)",
            (&category.id, &category.name, &category.slug),
        )?;
        Ok(())
    }

    fn category_id(&self, name: &str) -> EpaperResult<Option<String>> {
        let conn = self.storage.connection()?;
        let id = conn.query_row("SELECT id FROM categories WHERE name = ?1", [name], |row| {
            row.get(0)
        });

        match id {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(EpaperError::from(e)),
        }
    }

    fn add_article(&self, new: &NewArticle) -> EpaperResult<()> {
        let conn = self.storage.connection()?;
        let article = &new.article;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM articles WHERE id = ?1)",
            [&article.id],
            |row| row.get(0),
        )?;
        if exists {
            return Err(EpaperError::AlreadyExists(format!("article {}", article.id)));
        }

        conn.execute(
            "INSERT INTO articles (id, title, content, image_url, author, category_id, status, \
             is_featured, view_count, published_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                article.id,
                article.title,
                article.content,
                article.image_url,
                article.author,
                new.category_id,
                new.status.as_str(),
                article.featured,
                article.view_count,
                article.published_at,
            ],
        )?;
        Ok(())
    }

    fn add_breaking_news(&self, new: &NewBreakingNews) -> EpaperResult<()> {
        let conn = self.storage.connection()?;
        let item = &new.item;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM breaking_news WHERE id = ?1)",
            [&item.id],
            |row| row.get(0),
        )?;
        if exists {
            return Err(EpaperError::AlreadyExists(format!("breaking news {}", item.id)));
        }

        conn.execute(
            "INSERT INTO breaking_news \
             (id, title, content, article_id, is_active, created_at, expires_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                item.id,
                item.title,
                item.content,
                item.article_id,
                new.is_active,
                item.created_at,
                new.expires_at,
            ],
        )?;
        Ok(())
    }
}
