use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::domain::{GenerationOptions, GenerationResult, GenerationStage, SectionType, Template};
use crate::errors::{EpaperError, EpaperResult};
use crate::layout::distributor::{distribute, Distribution};
use crate::layout::page::Document;
use crate::layout::renderer::{PageContext, SectionRenderer, Weather};
use crate::layout::typeface::Typesetter;
use crate::output::{encode_pdf, DocumentStore};
use crate::sources::ArticleSource;
use crate::storage::traits::ContentRepository;
use crate::templates::TemplateRegistry;

/// Tracks the stage of one generation run and logs every transition.
#[derive(Debug)]
pub struct GenerationRun {
    layout: String,
    stage: GenerationStage,
}

impl GenerationRun {
    pub fn new(layout: &str) -> Self {
        Self {
            layout: layout.to_string(),
            stage: GenerationStage::Pending,
        }
    }

    pub fn stage(&self) -> GenerationStage {
        self.stage
    }

    pub fn advance(&mut self, next: GenerationStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.stage,
            next
        );
        debug!(layout = %self.layout, from = ?self.stage, to = ?next, "Generation stage");
        self.stage = next;
    }

    pub fn fail(&mut self, error: &EpaperError) {
        warn!(layout = %self.layout, stage = ?self.stage, error = %error, "Generation failed");
        self.advance(GenerationStage::Failed);
    }
}

/// Assembles an e-paper: fetch, distribute, render, persist.
pub struct GenerationService<R: ContentRepository, S: DocumentStore> {
    registry: Arc<TemplateRegistry>,
    source: ArticleSource<R>,
    store: S,
    renderer: SectionRenderer,
    site_name: String,
}

impl<R: ContentRepository, S: DocumentStore> GenerationService<R, S> {
    pub fn new(
        registry: Arc<TemplateRegistry>,
        source: ArticleSource<R>,
        store: S,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            source,
            store,
            renderer: SectionRenderer::new(),
            site_name: site_name.into(),
        }
    }

    /// Measures and draws text with `typesetter` instead of the base fonts.
    pub fn with_typesetter(mut self, typesetter: Typesetter) -> Self {
        self.renderer = SectionRenderer::with_typesetter(typesetter);
        self
    }

    /// Runs a full generation. Never fails outright: every error is reported
    /// through the returned result, which always echoes title and date.
    pub fn generate(&self, options: &GenerationOptions) -> GenerationResult {
        let mut run = GenerationRun::new(&options.layout);

        match self.execute(options, &mut run) {
            Ok((url, article_count)) => {
                run.advance(GenerationStage::Done);
                info!(layout = %options.layout, article_count, url = %url, "E-paper generated");
                GenerationResult::succeeded(options, url, article_count)
            }
            Err(e) => {
                run.fail(&e);
                GenerationResult::failed(options, &e)
            }
        }
    }

    fn execute(
        &self,
        options: &GenerationOptions,
        run: &mut GenerationRun,
    ) -> EpaperResult<(String, usize)> {
        run.advance(GenerationStage::Fetching);
        let date = options.validate()?;
        let template = self.registry.require(&options.layout)?;

        let articles = self.source.fetch_candidates(options, date)?;
        if articles.is_empty() {
            return Err(EpaperError::NoArticlesFound);
        }

        let breaking = match template.section(SectionType::Breaking) {
            Some(section) if options.include_breaking_news && section.takes_articles() => {
                self.source.fetch_breaking_news(Utc::now(), section.max_articles)
            }
            _ => Vec::new(),
        };

        run.advance(GenerationStage::Distributing);
        let distribution = distribute(&articles, &breaking, template);
        for assignment in distribution.assignments() {
            debug!(
                section = %assignment.section_type,
                count = assignment.articles.len(),
                "Section filled"
            );
        }

        run.advance(GenerationStage::Rendering);
        let document = self.render(template, &distribution, options, date);
        let bytes = encode_pdf(&document, self.renderer.typesetter())
            .map_err(|e| EpaperError::Render(e.to_string()))?;

        run.advance(GenerationStage::Persisting);
        let url = self.store.save(date, &bytes).map_err(|e| match e {
            EpaperError::Persist(_) => e,
            other => EpaperError::Persist(other.to_string()),
        })?;

        Ok((url, distribution.placed_count()))
    }

    fn render(
        &self,
        template: &Template,
        distribution: &Distribution<'_>,
        options: &GenerationOptions,
        date: NaiveDate,
    ) -> Document {
        let date_label = date.format("%-d %B %Y").to_string();
        let weather = options.include_weather.then(Weather::sample);
        let ctx = PageContext {
            title: &options.title,
            date_label: &date_label,
            site_name: &self.site_name,
            weather: weather.as_ref(),
            page_number: 1,
        };

        let (page, drawn) = self.renderer.render_page(template, distribution, &ctx);
        debug!(placed = distribution.placed_count(), drawn, "Page rendered");

        Document {
            title: options.title.clone(),
            pages: vec![page],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Article;
    use crate::output::store::MockDocumentStore;
    use crate::output::FileDocumentStore;
    use crate::storage::traits::MockContentRepository;
    use chrono::TimeZone;

    fn articles(count: usize) -> Vec<Article> {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 6, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                Article::new(format!("a{}", i), format!("Headline {}", i), at)
                    .with_content("Short body")
            })
            .collect()
    }

    fn repo_with(count: usize) -> MockContentRepository {
        let mut repo = MockContentRepository::new();
        repo.expect_published_articles()
            .returning(move |q| Ok(articles(count.min(q.limit))));
        repo.expect_active_breaking_news().returning(|_, _| Ok(vec![]));
        repo
    }

    fn service<S: DocumentStore>(
        repo: MockContentRepository,
        store: S,
    ) -> GenerationService<MockContentRepository, S> {
        let registry = Arc::new(TemplateRegistry::builtin().unwrap());
        let source = ArticleSource::new(repo, 7, 10);
        GenerationService::new(registry, source, store, "Bangla Khabar")
    }

    fn options(layout: &str) -> GenerationOptions {
        GenerationOptions::new("Dainik Khabar", "2026-10-14", layout)
    }

    #[test]
    fn test_generate_success_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(repo_with(12), FileDocumentStore::new(dir.path(), "/epapers"));

        let result = svc.generate(&options("traditional"));
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.article_count, 10);
        assert!(result.pdf_url.unwrap().starts_with("/epapers/epaper-2026-10-14-"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_generate_with_embedded_font() {
        let Some(face) = crate::layout::typeface::tests::installed_font() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let typesetter = Typesetter::embedded(crate::layout::FaceSet::new(face, None));
        let svc = service(repo_with(5), FileDocumentStore::new(dir.path(), "/epapers"))
            .with_typesetter(typesetter);

        let result = svc.generate(&options("modern"));
        assert!(result.success, "{:?}", result.error);

        let written = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let bytes = std::fs::read(written.path()).unwrap();
        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(pdf.get_pages().len(), 1);
    }

    #[test]
    fn test_unknown_layout_fails_without_fetching() {
        let mut repo = MockContentRepository::new();
        repo.expect_published_articles().never();
        let mut store = MockDocumentStore::new();
        store.expect_save().never();

        let result = service(repo, store).generate(&options("nonexistent-id"));
        assert!(!result.success);
        assert_eq!(result.article_count, 0);
        assert!(result.error.unwrap().contains("nonexistent-id"));
        assert_eq!(result.title, "Dainik Khabar");
        assert_eq!(result.date, "2026-10-14");
    }

    #[test]
    fn test_empty_pool_fails_without_saving() {
        let mut store = MockDocumentStore::new();
        store.expect_save().never();

        let result = service(repo_with(0), store).generate(&options("modern"));
        assert!(!result.success);
        assert_eq!(result.article_count, 0);
        assert!(result.error.unwrap().contains("No articles found"));
    }

    #[test]
    fn test_source_error_reported_as_no_articles() {
        let mut repo = MockContentRepository::new();
        repo.expect_published_articles()
            .returning(|_| Err(EpaperError::SourceFetch("db down".to_string())));
        let mut store = MockDocumentStore::new();
        store.expect_save().never();

        let result = service(repo, store).generate(&options("compact"));
        assert!(!result.success);
        assert!(result.error.unwrap().contains("No articles found"));
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let mut store = MockDocumentStore::new();
        store
            .expect_save()
            .times(1)
            .returning(|_, _| Err(EpaperError::Io(std::io::Error::other("disk full"))));

        let result = service(repo_with(5), store).generate(&options("compact"));
        assert!(!result.success);
        assert!(result.pdf_url.is_none());
        let error = result.error.unwrap();
        assert!(error.starts_with("Failed to save document"), "{}", error);
        assert!(error.contains("disk full"));
    }

    #[test]
    fn test_invalid_date_fails_and_echoes_input() {
        let mut store = MockDocumentStore::new();
        store.expect_save().never();

        let mut opts = options("traditional");
        opts.date = "yesterday".to_string();
        let result = service(repo_with(5), store).generate(&opts);

        assert!(!result.success);
        assert_eq!(result.date, "yesterday");
        assert!(result.error.unwrap().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_out_of_range_recency_fails_cleanly() {
        let mut repo = MockContentRepository::new();
        repo.expect_published_articles().never();
        let mut store = MockDocumentStore::new();
        store.expect_save().never();

        let mut opts = options("traditional");
        opts.recency_days = Some(200_000_000);
        let result = service(repo, store).generate(&opts);

        assert!(!result.success);
        assert_eq!(result.article_count, 0);
        assert!(result.error.unwrap().contains("recencyDays"));
    }

    #[test]
    fn test_breaking_news_only_fetched_when_requested() {
        let mut repo = MockContentRepository::new();
        repo.expect_published_articles().returning(|_| Ok(articles(3)));
        repo.expect_active_breaking_news().never();
        let mut store = MockDocumentStore::new();
        store.expect_save().returning(|_, _| Ok("/epapers/x.pdf".to_string()));

        let result = service(repo, store).generate(&options("traditional"));
        assert!(result.success);
        assert_eq!(result.article_count, 3);
    }

    #[test]
    fn test_breaking_items_counted() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 7, 0, 0).unwrap();
        let mut repo = MockContentRepository::new();
        repo.expect_published_articles().returning(|_| Ok(articles(12)));
        repo.expect_active_breaking_news()
            .withf(|_, limit| *limit == 1)
            .returning(move |_, _| {
                Ok(vec![crate::domain::BreakingNews {
                    id: "1".to_string(),
                    title: "Cyclone".to_string(),
                    content: Some("Signal 7".to_string()),
                    article_id: None,
                    created_at: at,
                }])
            });
        let mut store = MockDocumentStore::new();
        store.expect_save().returning(|_, _| Ok("/epapers/x.pdf".to_string()));

        let mut opts = options("traditional");
        opts.include_breaking_news = true;
        let result = service(repo, store).generate(&opts);
        assert!(result.success);
        assert_eq!(result.article_count, 11);
    }

    #[test]
    fn test_run_stage_tracking() {
        let mut run = GenerationRun::new("traditional");
        assert_eq!(run.stage(), GenerationStage::Pending);
        run.advance(GenerationStage::Fetching);
        run.advance(GenerationStage::Distributing);
        run.fail(&EpaperError::NoArticlesFound);
        assert_eq!(run.stage(), GenerationStage::Failed);
    }
}
