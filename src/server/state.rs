use std::path::PathBuf;

use crate::output::FileDocumentStore;
use crate::services::{CatalogService, GenerationService};
use crate::storage::SqliteContentRepository;

pub struct AppState {
    pub generator: GenerationService<SqliteContentRepository, FileDocumentStore>,
    pub catalog: CatalogService<SqliteContentRepository>,
    /// Directory holding the generated documents.
    pub output_dir: PathBuf,
    /// Public prefix of document URLs; local paths are served from `output_dir`.
    pub public_base: String,
}
