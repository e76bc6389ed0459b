use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use epaper::domain::{
    Article, ArticleStatus, BreakingNews, Category, GenerationOptions, SectionType,
};
use epaper::layout::distribute;
use epaper::output::FileDocumentStore;
use epaper::services::GenerationService;
use epaper::sources::ArticleSource;
use epaper::storage::{
    ContentWriter, NewArticle, NewBreakingNews, SqliteContentRepository, SqliteStorage,
};
use epaper::templates::TemplateRegistry;

const DATE: &str = "2026-10-14";

fn issue_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap()
}

fn seed(storage: &SqliteStorage, articles: usize, breaking: usize) {
    let writer = SqliteContentRepository::new(storage.clone());
    writer
        .add_category(&Category {
            id: "c1".to_string(),
            name: "জাতীয়".to_string(),
            slug: None,
        })
        .unwrap();

    for i in 0..articles {
        let article = Article::new(
            format!("a{:02}", i),
            format!("Story {}", i),
            issue_day() - Duration::hours(i as i64 + 1),
        )
        .with_content("Dhaka correspondents report on the day's developments.")
        .with_priority(false, 1000 - i as i64);
        writer
            .add_article(&NewArticle {
                article,
                category_id: Some("c1".to_string()),
                status: ArticleStatus::Published,
            })
            .unwrap();
    }

    for i in 0..breaking {
        writer
            .add_breaking_news(&NewBreakingNews {
                item: BreakingNews {
                    id: format!("b{}", i),
                    title: format!("Alert {}", i),
                    content: None,
                    article_id: None,
                    created_at: issue_day() - Duration::minutes(i as i64),
                },
                is_active: true,
                expires_at: None,
            })
            .unwrap();
    }
}

fn service(
    storage: &SqliteStorage,
    out: &Path,
) -> GenerationService<SqliteContentRepository, FileDocumentStore> {
    let registry = Arc::new(TemplateRegistry::builtin().unwrap());
    let source = ArticleSource::new(SqliteContentRepository::new(storage.clone()), 7, 10);
    GenerationService::new(
        registry,
        source,
        FileDocumentStore::new(out, "/epapers"),
        "Bangla Khabar",
    )
}

fn options(layout: &str) -> GenerationOptions {
    let mut options = GenerationOptions::new("Dainik Test", DATE, layout);
    options.max_articles = Some(10);
    options
}

fn pdf_count(out: &Path) -> usize {
    fs::read_dir(out).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn test_traditional_fills_every_section() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("content.db")).unwrap();
    seed(&storage, 12, 0);
    let out = dir.path().join("out");

    let result = service(&storage, &out).generate(&options("traditional"));

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.article_count, 10);
    let url = result.pdf_url.unwrap();
    assert!(url.starts_with("/epapers/epaper-2026-10-14-"));
    assert_eq!(pdf_count(&out), 1);
}

#[test]
fn test_breaking_news_takes_breaking_section_only() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("content.db")).unwrap();
    seed(&storage, 12, 2);

    let registry = TemplateRegistry::builtin().unwrap();
    let template = registry.require("traditional").unwrap();
    let source = ArticleSource::new(SqliteContentRepository::new(storage.clone()), 7, 10);
    let mut opts = options("traditional");
    opts.include_breaking_news = true;

    let date = opts.parsed_date().unwrap();
    let candidates = source.fetch_candidates(&opts, date).unwrap();
    let breaking = source.fetch_breaking_news(Utc::now(), 1);
    let distribution = distribute(&candidates, &breaking, template);

    let placed_breaking = distribution.get(SectionType::Breaking);
    assert_eq!(placed_breaking.len(), 1);
    assert_eq!(placed_breaking[0].id, "breaking-b0");
    for section in [SectionType::Main, SectionType::Sidebar, SectionType::Secondary] {
        assert!(distribution.get(section).iter().all(|a| !a.is_breaking));
    }

    let result = service(&storage, &dir.path().join("out")).generate(&opts);
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.article_count, 11);
}

#[test]
fn test_unknown_layout_names_the_layout() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("content.db")).unwrap();
    seed(&storage, 3, 0);
    let out = dir.path().join("out");

    let result = service(&storage, &out).generate(&options("nonexistent-id"));

    assert!(!result.success);
    assert_eq!(result.article_count, 0);
    assert!(result.error.unwrap().contains("nonexistent-id"));
    assert_eq!(pdf_count(&out), 0);
}

#[test]
fn test_excluding_everything_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("content.db")).unwrap();
    seed(&storage, 5, 0);
    let out = dir.path().join("out");

    let mut opts = options("modern");
    opts.exclude_categories = vec!["জাতীয়".to_string()];
    let result = service(&storage, &out).generate(&opts);

    assert!(!result.success);
    assert_eq!(result.article_count, 0);
    assert!(result.error.unwrap().contains("No articles found"));
    assert_eq!(pdf_count(&out), 0);
}

#[test]
fn test_stale_articles_are_outside_the_window() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("content.db")).unwrap();
    seed(&storage, 4, 0);

    let mut opts = options("compact");
    opts.date = "2026-11-30".to_string();
    let result = service(&storage, &dir.path().join("out")).generate(&opts);

    assert!(!result.success);
    assert_eq!(result.date, "2026-11-30");
}

#[test]
fn test_title_and_date_echoed_on_every_outcome() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("content.db")).unwrap();
    seed(&storage, 6, 1);
    let out = dir.path().join("out");
    let service = service(&storage, &out);

    let mut bad_date = options("modern");
    bad_date.date = "14/10/2026".to_string();
    let mut breaking = options("compact");
    breaking.include_breaking_news = true;
    breaking.include_weather = true;

    for opts in [options("modern"), options("missing"), bad_date, breaking] {
        let result = service.generate(&opts);
        assert_eq!(result.title, opts.title);
        assert_eq!(result.date, opts.date);
        if !result.success {
            assert_eq!(result.article_count, 0);
            assert!(result.error.is_some());
        }
    }
    assert_eq!(pdf_count(&out), 2);
}
