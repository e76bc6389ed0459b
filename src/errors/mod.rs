use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpaperError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Template errors
    #[error("Layout template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    // Generation errors
    #[error("No articles found matching the selected criteria")]
    NoArticlesFound,

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Failed to save document: {0}")]
    Persist(String),

    // Content store errors
    #[error("Failed to fetch articles: {0}")]
    SourceFetch(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type EpaperResult<T> = Result<T, EpaperError>;
