use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{EpaperError, EpaperResult};

pub const DEFAULT_RECENCY_DAYS: u32 = 7;
pub const DEFAULT_MAX_ARTICLES: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub output_dir: PathBuf,
    pub public_base: String,
    pub site_name: String,
    pub bind_addr: String,
    pub recency_days: u32,
    pub max_articles: usize,
    /// TrueType font embedded for body text; searched for when unset.
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> EpaperResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = std::env::var("EPAPER_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("epaper.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./epaper.db".to_string())
        });

        let output_dir = std::env::var("EPAPER_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./generated-epapers"));

        let public_base =
            std::env::var("EPAPER_PUBLIC_BASE").unwrap_or_else(|_| "/epapers".to_string());

        let site_name =
            std::env::var("EPAPER_SITE_NAME").unwrap_or_else(|_| "Bangla Khabar".to_string());

        let bind_addr =
            std::env::var("EPAPER_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let recency_days = parse_var("EPAPER_RECENCY_DAYS", DEFAULT_RECENCY_DAYS)?;
        let max_articles = parse_var("EPAPER_MAX_ARTICLES", DEFAULT_MAX_ARTICLES)?;

        let font_path = std::env::var("EPAPER_FONT_PATH").ok().map(PathBuf::from);
        let bold_font_path = std::env::var("EPAPER_BOLD_FONT_PATH").ok().map(PathBuf::from);

        Ok(Self {
            db_path,
            output_dir,
            public_base,
            site_name,
            bind_addr,
            recency_days,
            max_articles,
            font_path,
            bold_font_path,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> EpaperResult<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EpaperError::Config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
