pub mod article_source;

pub use article_source::ArticleSource;
