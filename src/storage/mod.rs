pub mod traits;
pub mod sqlite;

pub use traits::{ArticleQuery, ContentRepository, ContentWriter, NewArticle, NewBreakingNews};
pub use sqlite::{SqliteContentRepository, SqliteStorage};
