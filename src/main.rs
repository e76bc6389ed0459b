use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use epaper::cli::{Cli, Commands, OptionsArgs};
use epaper::config::Config;
use epaper::errors::EpaperResult;
use epaper::layout::Typesetter;
use epaper::output::FileDocumentStore;
use epaper::server::{self, AppState};
use epaper::services::{CatalogService, GenerationService, ImportService};
use epaper::sources::ArticleSource;
use epaper::storage::{SqliteContentRepository, SqliteStorage};
use epaper::templates::TemplateRegistry;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns `Ok(false)` when the command ran but reported failure.
fn run() -> EpaperResult<bool> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let registry = Arc::new(TemplateRegistry::builtin()?);
    let storage = SqliteStorage::new(&config.db_path)?;

    match cli.command {
        Commands::Templates => print_json(&registry.list()),
        Commands::Categories => {
            print_json(&catalog(&config, &registry, &storage).list_categories())
        }
        Commands::Preview(args) => cmd_preview(args, catalog(&config, &registry, &storage)),
        Commands::Generate(args) => cmd_generate(args, generator(&config, &registry, &storage)?),
        Commands::Import { path } => cmd_import(&path, storage),
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let state = AppState {
                generator: generator(&config, &registry, &storage)?,
                catalog: catalog(&config, &registry, &storage),
                output_dir: config.output_dir.clone(),
                public_base: config.public_base.clone(),
            };
            tokio::runtime::Runtime::new()?.block_on(server::serve(state, &addr))?;
            Ok(true)
        }
    }
}

fn source(config: &Config, storage: &SqliteStorage) -> ArticleSource<SqliteContentRepository> {
    ArticleSource::new(
        SqliteContentRepository::new(storage.clone()),
        config.recency_days,
        config.max_articles,
    )
}

fn catalog(
    config: &Config,
    registry: &Arc<TemplateRegistry>,
    storage: &SqliteStorage,
) -> CatalogService<SqliteContentRepository> {
    CatalogService::new(Arc::clone(registry), source(config, storage))
}

fn generator(
    config: &Config,
    registry: &Arc<TemplateRegistry>,
    storage: &SqliteStorage,
) -> EpaperResult<GenerationService<SqliteContentRepository, FileDocumentStore>> {
    let typesetter =
        Typesetter::discover(config.font_path.as_deref(), config.bold_font_path.as_deref())?;
    Ok(GenerationService::new(
        Arc::clone(registry),
        source(config, storage),
        FileDocumentStore::new(&config.output_dir, config.public_base.clone()),
        config.site_name.clone(),
    )
    .with_typesetter(typesetter))
}

fn print_json<T: Serialize>(value: &T) -> EpaperResult<bool> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(true)
}

fn cmd_preview(
    args: OptionsArgs,
    catalog: CatalogService<SqliteContentRepository>,
) -> EpaperResult<bool> {
    let options = args.into_options()?;
    print_json(&catalog.preview_articles(&options)?)
}

fn cmd_generate(
    args: OptionsArgs,
    generator: GenerationService<SqliteContentRepository, FileDocumentStore>,
) -> EpaperResult<bool> {
    let options = args.into_options()?;
    let result = generator.generate(&options);
    print_json(&result)?;
    Ok(result.success)
}

fn cmd_import(path: &str, storage: SqliteStorage) -> EpaperResult<bool> {
    let content = fs::read_to_string(path)?;
    let service = ImportService::new(SqliteContentRepository::new(storage));

    println!("Importing content from: {}", path);

    let result = service.import_json(&content)?;

    println!();
    println!("Import complete:");
    println!("  Added: {}", result.added.len());
    for entry in &result.added {
        println!("    + {}", entry);
    }

    if !result.duplicates.is_empty() {
        println!("  Skipped (already present): {}", result.duplicates.len());
        for entry in &result.duplicates {
            println!("    = {}", entry);
        }
    }

    if !result.invalid.is_empty() {
        println!("  Invalid: {}", result.invalid.len());
        for (entry, error) in &result.invalid {
            println!("    ! {} - {}", entry, error);
        }
    }

    Ok(true)
}
