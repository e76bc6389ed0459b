pub mod distributor;
pub mod page;
pub mod renderer;
pub mod text;
pub mod typeface;

pub use distributor::{distribute, Distribution, SectionAssignment};
pub use page::{Document, DrawOp, Page};
pub use renderer::{PageContext, SectionRenderer, Weather};
pub use typeface::{FaceSet, Typeface, Typesetter};
