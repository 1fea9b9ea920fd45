//! Command-line interface for playshelf.
//!
//! Provides commands for inspecting the catalog, getting suggestions,
//! searching, building playlists, and resolving free text to a category.
//! Source documents are always given as `--source <kind>=<path>` pairs so
//! the schema is never guessed from a filename.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::core::{CatalogIndex, CategoryMatcher, Criteria, Recommender};
use crate::domain::{Catalog, Item, Language};
use crate::ingest::{ingest, load_sources, SourceSpec};

/// playshelf - Content catalog and recommendation core
#[derive(Parser, Debug)]
#[command(name = "playshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional YAML config with synonym and scoring tables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest sources and show the per-source index values
    Catalog {
        /// Source documents as <kind>=<path> (kinds: kids, games, streaming, fitness)
        #[arg(short, long = "source", value_parser = parse_source)]
        sources: Vec<SourceSpec>,
    },

    /// Suggest items for a child
    Suggest {
        /// Source documents as <kind>=<path>
        #[arg(short, long = "source", value_parser = parse_source)]
        sources: Vec<SourceSpec>,

        /// Child's age
        #[arg(short, long)]
        age: Option<u8>,

        /// Language filter (en, ar)
        #[arg(short, long)]
        language: Option<String>,

        /// Content type filter (video, game)
        #[arg(short = 't', long)]
        content_type: Option<String>,

        /// Mood for scoring (learning, calm, active)
        #[arg(short, long)]
        mood: Option<String>,

        /// Maximum number of items to return
        #[arg(long, default_value = "8")]
        max: usize,
    },

    /// Search the catalog by category or metadata
    Search {
        /// Source documents as <kind>=<path>
        #[arg(short, long = "source", value_parser = parse_source)]
        sources: Vec<SourceSpec>,

        /// Free-text category to browse
        #[arg(short, long)]
        category: Option<String>,

        /// Content type filter (video, game)
        #[arg(short = 't', long)]
        content_type: Option<String>,

        /// Source kind filter (kids, games, streaming, fitness)
        #[arg(long)]
        from: Option<String>,

        /// Use the degrading structured search with variety shuffle
        #[arg(long)]
        structured: bool,

        /// Shuffle seed for reproducible structured search
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of items to return
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Build a playlist
    Playlist {
        /// Source documents as <kind>=<path>
        #[arg(short, long = "source", value_parser = parse_source)]
        sources: Vec<SourceSpec>,

        /// Build a category playlist instead of the educational one
        #[arg(short, long)]
        category: Option<String>,

        /// Child's age (educational playlist)
        #[arg(short, long, default_value = "5")]
        age: u8,

        /// Language (educational playlist; en, ar)
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Target playlist length in minutes (educational playlist)
        #[arg(short, long, default_value = "20")]
        minutes: u32,

        /// Maximum number of items in the playlist
        #[arg(long, default_value = "12")]
        max: usize,
    },

    /// Resolve free text to a category
    Resolve {
        /// Free text to resolve
        text: String,

        /// Available categories (comma-separated)
        #[arg(short, long)]
        categories: String,
    },
}

/// Parse a `<kind>=<path>` source argument
fn parse_source(s: &str) -> Result<SourceSpec, String> {
    let (kind, path) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected <kind>=<path>, got: {}", s))?;
    let kind = kind.parse().map_err(|e| format!("{}", e))?;
    Ok(SourceSpec::new(kind, path))
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Catalog { sources } => show_catalog(&sources).await,
            Commands::Suggest {
                sources,
                age,
                language,
                content_type,
                mood,
                max,
            } => suggest(&sources, &config, age, language, content_type, mood, max).await,
            Commands::Search {
                sources,
                category,
                content_type,
                from,
                structured,
                seed,
                max,
            } => {
                search(
                    &sources,
                    &config,
                    category,
                    content_type,
                    from,
                    structured,
                    seed,
                    max,
                )
                .await
            }
            Commands::Playlist {
                sources,
                category,
                age,
                language,
                minutes,
                max,
            } => playlist(&sources, &config, category, age, &language, minutes, max).await,
            Commands::Resolve { text, categories } => resolve(&config, &text, &categories),
        }
    }
}

/// Load, normalize, and snapshot the given sources
async fn build_catalog(sources: &[SourceSpec]) -> Catalog {
    let documents = load_sources(sources).await;
    Catalog::new(ingest(&documents))
}

/// Print the per-source index values and item counts
async fn show_catalog(sources: &[SourceSpec]) -> Result<()> {
    let catalog = build_catalog(sources).await;
    let index = CatalogIndex::build(&catalog.items);

    println!("{} items, {} index keys", catalog.len(), index.key_count());
    for (source, values) in index.source_values() {
        println!("\n[{}]", source);
        println!("  categories: {:?}", values.categories);
        println!("  subcategories: {:?}", values.subcategories);
        println!("  channels: {:?}", values.channels);
        println!("  playlists: {:?}", values.playlists);
        println!("  languages: {:?}", values.languages);
    }

    Ok(())
}

async fn suggest(
    sources: &[SourceSpec],
    config: &AppConfig,
    age: Option<u8>,
    language: Option<String>,
    content_type: Option<String>,
    mood: Option<String>,
    max: usize,
) -> Result<()> {
    let catalog = build_catalog(sources).await;
    let recommender = Recommender::new(&catalog.items, config.recommender.clone());

    let criteria = Criteria {
        age,
        language: parse_opt(language.as_deref())?,
        item_type: parse_opt(content_type.as_deref())?,
        mood,
        ..Criteria::default()
    };

    print_items(&recommender.suggest_for_child(&criteria, max))
}

#[allow(clippy::too_many_arguments)]
async fn search(
    sources: &[SourceSpec],
    config: &AppConfig,
    category: Option<String>,
    content_type: Option<String>,
    from: Option<String>,
    structured: bool,
    seed: Option<u64>,
    max: usize,
) -> Result<()> {
    let catalog = build_catalog(sources).await;
    let recommender = Recommender::new(&catalog.items, config.recommender.clone());
    let item_type = parse_opt(content_type.as_deref())?;

    let results = if structured {
        let criteria = Criteria {
            item_type,
            source: parse_opt(from.as_deref())?,
            category: category.clone(),
            ..Criteria::default()
        };
        recommender.search_structured(&criteria, max, seed)
    } else if let Some(category) = category {
        recommender.suggest_by_category(&category, item_type, max)
    } else {
        let criteria = Criteria {
            item_type,
            source: parse_opt(from.as_deref())?,
            ..Criteria::default()
        };
        recommender.search_by_metadata(&criteria, max)
    };

    print_items(&results)
}

async fn playlist(
    sources: &[SourceSpec],
    config: &AppConfig,
    category: Option<String>,
    age: u8,
    language: &str,
    minutes: u32,
    max: usize,
) -> Result<()> {
    let catalog = build_catalog(sources).await;
    let recommender = Recommender::new(&catalog.items, config.recommender.clone());

    let results = match category {
        Some(category) => recommender.build_playlist_by_category(&category, max),
        None => {
            let language: Language = language.parse()?;
            recommender.build_educational_playlist(age, language, minutes, max)
        }
    };

    print_items(&results)
}

fn resolve(config: &AppConfig, text: &str, categories: &str) -> Result<()> {
    let available: Vec<String> = categories
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let matcher = CategoryMatcher::new(config.matcher.clone());
    println!("{}", matcher.pick_category(text, &available));
    Ok(())
}

fn parse_opt<T: std::str::FromStr<Err = anyhow::Error>>(value: Option<&str>) -> Result<Option<T>> {
    value
        .map(|v| v.parse().with_context(|| format!("Invalid value: {}", v)))
        .transpose()
}

/// Print the presentation subset of each item as pretty JSON
fn print_items(items: &[Item]) -> Result<()> {
    let summaries: Vec<_> = items.iter().map(Item::summary).collect();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceKind;

    #[test]
    fn test_parse_source_arg() {
        let spec = parse_source("kids=data/kids.json").unwrap();
        assert_eq!(spec.kind, SourceKind::Kids);
        assert_eq!(spec.path, PathBuf::from("data/kids.json"));

        assert!(parse_source("kids.json").is_err());
        assert!(parse_source("unknown=x.json").is_err());
    }
}
