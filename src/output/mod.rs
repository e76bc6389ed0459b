pub mod pdf;
pub mod store;

pub use pdf::encode_pdf;
pub use store::{DocumentStore, FileDocumentStore};
