pub mod catalog_service;
pub mod generation_service;
pub mod import_service;

pub use catalog_service::CatalogService;
pub use generation_service::{GenerationRun, GenerationService};
pub use import_service::{ImportResult, ImportService};
