use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{EpaperError, EpaperResult};

use super::Article;

/// Upper bound on `maxArticles`, regardless of what the caller asks for.
pub const MAX_ARTICLES_CAP: usize = 100;

/// Caller-supplied parameters of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub title: String,
    pub date: String,
    pub layout: String,
    #[serde(default)]
    pub include_categories: Vec<String>,
    #[serde(default)]
    pub exclude_categories: Vec<String>,
    #[serde(default)]
    pub max_articles: Option<usize>,
    #[serde(default)]
    pub include_breaking_news: bool,
    #[serde(default)]
    pub include_weather: bool,
    /// Advisory only; the template decides which sections exist.
    #[serde(default)]
    pub included_sections: Vec<String>,
    #[serde(default)]
    pub recency_days: Option<u32>,
}

impl GenerationOptions {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        layout: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            layout: layout.into(),
            include_categories: Vec::new(),
            exclude_categories: Vec::new(),
            max_articles: None,
            include_breaking_news: false,
            include_weather: false,
            included_sections: Vec::new(),
            recency_days: None,
        }
    }

    pub fn parsed_date(&self) -> EpaperResult<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            EpaperError::InvalidInput(format!("date must be YYYY-MM-DD, got '{}'", self.date))
        })
    }

    /// `None` or zero fall back to `default`; anything above the cap is clamped.
    pub fn effective_max_articles(&self, default: usize) -> usize {
        match self.max_articles {
            Some(0) | None => default,
            Some(n) => n,
        }
        .min(MAX_ARTICLES_CAP)
    }

    pub fn effective_recency_days(&self, default: u32) -> u32 {
        match self.recency_days {
            Some(0) | None => default,
            Some(n) => n,
        }
    }

    pub fn validate(&self) -> EpaperResult<NaiveDate> {
        if self.title.trim().is_empty() {
            return Err(EpaperError::InvalidInput("title is required".to_string()));
        }
        self.parsed_date()
    }
}

/// Outcome of one generation run. Title and date are always echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    pub title: String,
    pub date: String,
    pub article_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn succeeded(options: &GenerationOptions, pdf_url: String, article_count: usize) -> Self {
        Self {
            success: true,
            pdf_url: Some(pdf_url),
            title: options.title.clone(),
            date: options.date.clone(),
            article_count,
            error: None,
        }
    }

    pub fn failed(options: &GenerationOptions, error: &EpaperError) -> Self {
        Self {
            success: false,
            pdf_url: None,
            title: options.title.clone(),
            date: options.date.clone(),
            article_count: 0,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePreview {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub publish_date: DateTime<Utc>,
    pub content: String,
}

impl ArticlePreview {
    pub fn from_article(article: &Article, content: String) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            category: article.category.clone(),
            author: article.author.clone(),
            publish_date: article.published_at,
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub articles: Vec<ArticlePreview>,
    pub total: usize,
}

/// Lifecycle of a single generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStage {
    Pending,
    Fetching,
    Distributing,
    Rendering,
    Persisting,
    Done,
    Failed,
}

impl GenerationStage {
    pub fn can_advance_to(self, next: GenerationStage) -> bool {
        use GenerationStage::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Fetching, Distributing)
                | (Distributing, Rendering)
                | (Rendering, Persisting)
                | (Persisting, Done)
                | (Fetching | Distributing | Rendering | Persisting, Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_deserialize_with_defaults() {
        let json = r#"{"title":"Dainik","date":"2026-10-14","layout":"traditional"}"#;
        let options: GenerationOptions = serde_json::from_str(json).unwrap();

        assert_eq!(options.title, "Dainik");
        assert!(options.include_categories.is_empty());
        assert!(options.exclude_categories.is_empty());
        assert_eq!(options.max_articles, None);
        assert!(!options.include_breaking_news);
        assert!(!options.include_weather);
    }

    #[test]
    fn test_options_camel_case_fields() {
        let json = r#"{
            "title": "Dainik",
            "date": "2026-10-14",
            "layout": "modern",
            "includeCategories": ["খেলা"],
            "excludeCategories": ["বিনোদন"],
            "maxArticles": 8,
            "includeBreakingNews": true,
            "includeWeather": true,
            "includedSections": ["main"]
        }"#;
        let options: GenerationOptions = serde_json::from_str(json).unwrap();

        assert_eq!(options.include_categories, vec!["খেলা"]);
        assert_eq!(options.exclude_categories, vec!["বিনোদন"]);
        assert_eq!(options.max_articles, Some(8));
        assert!(options.include_breaking_news);
        assert!(options.include_weather);
        assert_eq!(options.included_sections, vec!["main"]);
    }

    #[test]
    fn test_effective_max_articles() {
        let mut options = GenerationOptions::new("t", "2026-10-14", "traditional");
        assert_eq!(options.effective_max_articles(10), 10);
        options.max_articles = Some(0);
        assert_eq!(options.effective_max_articles(10), 10);
        options.max_articles = Some(4);
        assert_eq!(options.effective_max_articles(10), 4);
        options.max_articles = Some(5000);
        assert_eq!(options.effective_max_articles(10), MAX_ARTICLES_CAP);
    }

    #[test]
    fn test_validate_rejects_bad_date_and_empty_title() {
        let options = GenerationOptions::new("Dainik", "14/10/2026", "traditional");
        assert!(matches!(options.validate(), Err(EpaperError::InvalidInput(_))));

        let options = GenerationOptions::new("  ", "2026-10-14", "traditional");
        assert!(matches!(options.validate(), Err(EpaperError::InvalidInput(_))));

        let options = GenerationOptions::new("Dainik", "2026-10-14", "traditional");
        assert_eq!(
            options.validate().unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
        );
    }

    #[test]
    fn test_result_serializes_without_empty_fields() {
        let options = GenerationOptions::new("Dainik", "2026-10-14", "traditional");
        let result = GenerationResult::succeeded(&options, "/epapers/x.pdf".to_string(), 10);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["pdfUrl"], "/epapers/x.pdf");
        assert_eq!(json["articleCount"], 10);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failed_result_echoes_metadata() {
        let options = GenerationOptions::new("Dainik", "2026-10-14", "nope");
        let error = EpaperError::TemplateNotFound("nope".to_string());
        let result = GenerationResult::failed(&options, &error);

        assert!(!result.success);
        assert_eq!(result.title, "Dainik");
        assert_eq!(result.date, "2026-10-14");
        assert_eq!(result.article_count, 0);
        assert!(result.pdf_url.is_none());
        assert!(result.error.unwrap().contains("nope"));
    }

    #[test]
    fn test_stage_transitions() {
        use GenerationStage::*;
        assert!(Pending.can_advance_to(Fetching));
        assert!(Fetching.can_advance_to(Distributing));
        assert!(Persisting.can_advance_to(Done));
        assert!(Rendering.can_advance_to(Failed));

        assert!(!Pending.can_advance_to(Failed));
        assert!(!Done.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Fetching));
        assert!(!Fetching.can_advance_to(Rendering));
    }
}
