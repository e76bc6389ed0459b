mod connection;
mod content_repository;

pub use connection::SqliteStorage;
pub use content_repository::SqliteContentRepository;
