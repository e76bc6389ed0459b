use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::domain::GenerationOptions;
use crate::errors::EpaperResult;

#[derive(Parser)]
#[command(name = "epaper")]
#[command(about = "Template-driven e-paper generator for a Bengali news platform")]
#[command(version)]
pub struct Cli {
    /// SQLite content store
    #[arg(long, global = true, env = "EPAPER_DB_PATH")]
    pub db: Option<String>,

    /// Directory generated PDFs are written to
    #[arg(long, global = true, env = "EPAPER_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available layout templates
    Templates,

    /// List article categories
    Categories,

    /// Show the articles a generation would draw from
    Preview(OptionsArgs),

    /// Generate an e-paper PDF
    Generate(OptionsArgs),

    /// Load categories, articles and breaking news from a JSON file
    Import {
        /// Path to JSON fixture
        path: String,
    },

    /// Serve the e-paper API over HTTP
    Serve {
        /// Address to listen on (defaults to EPAPER_BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct OptionsArgs {
    /// Read generation options from a JSON file; other flags override it
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// E-paper title
    #[arg(long)]
    pub title: Option<String>,

    /// Issue date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<String>,

    /// Layout template id
    #[arg(long)]
    pub layout: Option<String>,

    /// Only use articles from this category (repeatable)
    #[arg(long = "include-category", value_name = "NAME")]
    pub include_categories: Vec<String>,

    /// Skip articles from this category (repeatable)
    #[arg(long = "exclude-category", value_name = "NAME")]
    pub exclude_categories: Vec<String>,

    /// Maximum number of candidate articles
    #[arg(long)]
    pub max_articles: Option<usize>,

    /// Place active breaking news first
    #[arg(long)]
    pub breaking: bool,

    /// Add the weather block to the masthead
    #[arg(long)]
    pub weather: bool,

    /// Sections to include (advisory)
    #[arg(long = "section", value_name = "TYPE")]
    pub sections: Vec<String>,
}

impl OptionsArgs {
    pub fn into_options(self) -> EpaperResult<GenerationOptions> {
        let mut options = match &self.options {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => GenerationOptions::new(
                "",
                Utc::now().date_naive().format("%Y-%m-%d").to_string(),
                "traditional",
            ),
        };

        if let Some(title) = self.title {
            options.title = title;
        }
        if let Some(date) = self.date {
            options.date = date;
        }
        if let Some(layout) = self.layout {
            options.layout = layout;
        }
        if !self.include_categories.is_empty() {
            options.include_categories = self.include_categories;
        }
        if !self.exclude_categories.is_empty() {
            options.exclude_categories = self.exclude_categories;
        }
        if let Some(max) = self.max_articles {
            options.max_articles = Some(max);
        }
        if self.breaking {
            options.include_breaking_news = true;
        }
        if self.weather {
            options.include_weather = true;
        }
        if !self.sections.is_empty() {
            options.included_sections = self.sections;
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_options() {
        let args = OptionsArgs {
            title: Some("Dainik".to_string()),
            date: Some("2026-10-14".to_string()),
            layout: Some("modern".to_string()),
            include_categories: vec!["খেলা".to_string()],
            max_articles: Some(6),
            breaking: true,
            ..Default::default()
        };

        let options = args.into_options().unwrap();
        assert_eq!(options.title, "Dainik");
        assert_eq!(options.layout, "modern");
        assert_eq!(options.include_categories, vec!["খেলা"]);
        assert_eq!(options.max_articles, Some(6));
        assert!(options.include_breaking_news);
        assert!(!options.include_weather);
    }

    #[test]
    fn test_flags_override_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(
            &path,
            r#"{"title":"From file","date":"2026-10-01","layout":"compact","includeWeather":true}"#,
        )
        .unwrap();

        let args = OptionsArgs {
            options: Some(path),
            date: Some("2026-10-14".to_string()),
            ..Default::default()
        };

        let options = args.into_options().unwrap();
        assert_eq!(options.title, "From file");
        assert_eq!(options.date, "2026-10-14");
        assert_eq!(options.layout, "compact");
        assert!(options.include_weather);
    }

    #[test]
    fn test_defaults_to_traditional_today() {
        let options = OptionsArgs::default().into_options().unwrap();
        assert_eq!(options.layout, "traditional");
        assert!(options.parsed_date().is_ok());
    }
}
