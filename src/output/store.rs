use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use tracing::warn;

use crate::errors::{EpaperError, EpaperResult};

/// Durable storage for generated documents.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStore: Send + Sync {
    /// Writes the document and returns the location it can be fetched from.
    fn save(&self, date: NaiveDate, bytes: &[u8]) -> EpaperResult<String>;
}

pub struct FileDocumentStore {
    dir: PathBuf,
    public_base: String,
}

impl FileDocumentStore {
    pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base: public_base.into(),
        }
    }

    /// `epaper-<date>-<millis>-<random>.pdf`
    fn file_name(date: NaiveDate) -> String {
        let token: u32 = rand::rng().random();
        format!(
            "epaper-{}-{}-{:08x}.pdf",
            date.format("%Y-%m-%d"),
            Utc::now().timestamp_millis(),
            token
        )
    }
}

impl DocumentStore for FileDocumentStore {
    fn save(&self, date: NaiveDate, bytes: &[u8]) -> EpaperResult<String> {
        let name = Self::file_name(date);
        self.write_new(&name, |file| {
            file.write_all(bytes)?;
            file.sync_all()
        })?;

        Ok(format!("{}/{}", self.public_base.trim_end_matches('/'), name))
    }
}

impl FileDocumentStore {
    /// Creates `name` in the store directory and fills it with `write`.
    /// A failed write removes the file again so no truncated document is
    /// ever served.
    fn write_new<F>(&self, name: &str, write: F) -> EpaperResult<PathBuf>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        fs::create_dir_all(&self.dir).map_err(|e| {
            EpaperError::Persist(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(name);

        // create_new: a name collision fails instead of overwriting
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                EpaperError::Persist(format!("cannot create {}: {}", path.display(), e))
            })?;

        if let Err(e) = write(&mut file) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Could not remove partial document"
                );
            }
            return Err(EpaperError::Persist(format!(
                "cannot write {}: {}",
                path.display(),
                e
            )));
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn test_save_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().join("out"), "/epapers/");

        let url = store.save(date(), b"%PDF-1.5").unwrap();
        assert!(url.starts_with("/epapers/epaper-2026-10-14-"));
        assert!(url.ends_with(".pdf"));

        let name = url.rsplit('/').next().unwrap();
        let written = fs::read(dir.path().join("out").join(name)).unwrap();
        assert_eq!(written, b"%PDF-1.5");
    }

    #[test]
    fn test_same_day_saves_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path(), "/epapers");

        let first = store.save(date(), b"one").unwrap();
        let second = store.save(date(), b"two").unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_unwritable_directory_is_persist_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let store = FileDocumentStore::new(blocker.join("nested"), "/epapers");
        let result = store.save(date(), b"pdf");
        assert!(matches!(result, Err(EpaperError::Persist(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path(), "/epapers");

        let result = store.write_new("epaper-2026-10-14-partial.pdf", |file| {
            file.write_all(b"%PDF-1.5 trunc")?;
            Err(io::Error::other("no space left on device"))
        });

        let err = result.unwrap_err();
        assert!(matches!(err, EpaperError::Persist(_)));
        assert!(err.to_string().contains("no space left"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
