use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Article, GenerationOptions};
use crate::errors::{EpaperError, EpaperResult};
use crate::storage::traits::{ArticleQuery, ContentRepository};

/// Pulls candidate and breaking-news articles out of the content store.
///
/// Query failures are logged and surface as an empty pool, so callers only
/// ever see "no articles".
pub struct ArticleSource<R: ContentRepository> {
    repository: R,
    recency_days: u32,
    default_max_articles: usize,
}

impl<R: ContentRepository> ArticleSource<R> {
    pub fn new(repository: R, recency_days: u32, default_max_articles: usize) -> Self {
        Self {
            repository,
            recency_days,
            default_max_articles,
        }
    }

    /// Window ends at the close of `date` (UTC) and reaches back the
    /// configured number of days. A window running off the calendar is
    /// rejected as invalid input.
    pub fn candidate_query(
        &self,
        options: &GenerationOptions,
        date: NaiveDate,
    ) -> EpaperResult<ArticleQuery> {
        let days = options.effective_recency_days(self.recency_days);
        let until = date
            .succ_opt()
            .unwrap_or(date)
            .and_time(NaiveTime::MIN)
            .and_utc();
        let from = Duration::try_days(i64::from(days))
            .and_then(|span| until.checked_sub_signed(span))
            .ok_or_else(|| {
                EpaperError::InvalidInput(format!(
                    "recencyDays {} reaches outside the supported date range",
                    days
                ))
            })?;

        Ok(ArticleQuery {
            include_categories: options.include_categories.clone(),
            exclude_categories: options.exclude_categories.clone(),
            published_from: from,
            published_until: until,
            limit: options.effective_max_articles(self.default_max_articles),
        })
    }

    /// Only a malformed window is an error; store failures yield an empty pool.
    pub fn fetch_candidates(
        &self,
        options: &GenerationOptions,
        date: NaiveDate,
    ) -> EpaperResult<Vec<Article>> {
        let query = self.candidate_query(options, date)?;

        match self.repository.published_articles(&query) {
            Ok(articles) => {
                debug!(count = articles.len(), limit = query.limit, "Fetched candidate articles");
                Ok(articles)
            }
            Err(e) => {
                warn!(error = %e, "Candidate article query failed");
                Ok(Vec::new())
            }
        }
    }

    /// Active breaking news mapped into the article shape, newest first.
    pub fn fetch_breaking_news(&self, now: DateTime<Utc>, limit: usize) -> Vec<Article> {
        match self.repository.active_breaking_news(now, limit) {
            Ok(items) => items.into_iter().map(|item| item.into_article()).collect(),
            Err(e) => {
                warn!(error = %e, "Breaking news query failed");
                Vec::new()
            }
        }
    }

    pub fn categories(&self) -> EpaperResult<Vec<String>> {
        self.repository.category_names()
    }
}
