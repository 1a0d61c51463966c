//! larder: ingredient image CLI
//!
//! Inspect normalization and search queries, resolve ingredient photos
//! through the local cache, and clear the cache.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use larder::config::{Config, Secrets};
use larder::{CacheClearReport, ImageResolver, IngredientInput, JsonFileStore, QueryBuilder};

/// Larder CLI
#[derive(Parser)]
#[command(name = "larder")]
#[command(version = larder::PKG_VERSION)]
#[command(about = "Ingredient image resolution and caching")]
struct Args {
    /// Config file (default: ~/.larder/config.toml, then /etc/larder/config.toml)
    #[arg(short, long, env = "LARDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cache key for each ingredient name
    Normalize {
        /// Raw ingredient names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the upstream search phrase for each ingredient name
    Query {
        /// Raw ingredient names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Resolve photos for ingredients and print the batch as JSON
    Resolve {
        /// Ingredients as `amount|unit|name` or a bare name
        #[arg(required = true)]
        ingredients: Vec<String>,
    },

    /// Delete every cached ingredient image
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(version = %larder::version_string(), "larder starting");
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Normalize { names } => {
            let queries = QueryBuilder::default();
            for name in names {
                println!("{name}\t{}", queries.normalizer().normalize(&name));
            }
        }

        Command::Query { names } => {
            let queries = QueryBuilder::default();
            for name in names {
                println!("{name}\t{}", queries.build(&name));
            }
        }

        Command::Resolve { ingredients } => {
            let resolver = build_resolver(&config).await?;
            let items: Vec<IngredientInput> =
                ingredients.iter().map(|s| parse_ingredient(s)).collect();
            let batch = resolver.resolve_many(&items).await?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }

        Command::ClearCache => {
            let resolver = build_resolver(&config).await?;
            let cleared = resolver.clear_cache().await?;
            let report = CacheClearReport::new(cleared);
            println!("{}", report.message);
        }
    }

    Ok(())
}

async fn build_resolver(config: &Config) -> larder::Result<ImageResolver> {
    let secrets = Secrets::load()?;
    let store = JsonFileStore::open(config.cache.resolved_path()).await?;
    config
        .apply(ImageResolver::builder(), secrets.unsplash_access_key())
        .store(Arc::new(store))
        .build()
}

/// Parse `amount|unit|name`, or treat the whole argument as a name.
fn parse_ingredient(arg: &str) -> IngredientInput {
    let parts: Vec<&str> = arg.splitn(3, '|').collect();
    match parts.as_slice() {
        [amount, unit, name] => IngredientInput::new(name.trim(), amount.trim(), unit.trim()),
        _ => IngredientInput::named(arg),
    }
}
