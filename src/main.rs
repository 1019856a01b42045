//! Meguri CLI - e-book store link finder for Japanese novel catalogs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meguri::catalog::load_catalog;
use meguri::config::Config;
use meguri::console::Console;
use meguri::query::{DEFAULT_QUERY_LIMIT, plan_queries, site_queries};
use meguri::search::{CandidateSource, SiteSearcher, find_link, search_catalog};
use meguri::similarity::similarity_score;
use meguri::volume::{VolumeFormat, create_volume_variants, normalize_volume_notation};
use std::path::PathBuf;

/// E-book store link finder for Japanese novel catalogs.
#[derive(Parser, Debug)]
#[command(name = "meguri")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a scraped candidate title against a catalog title.
    Score {
        /// Catalog title to search for.
        query: String,
        /// Candidate title from a results page.
        candidate: String,
    },

    /// Print the volume-notation variants generated for a title.
    Variants {
        title: String,
    },

    /// Re-render a title's volume marker in another notation.
    Rewrite {
        title: String,

        /// Target notation.
        #[arg(long, value_parser = ["circled", "arabic", "kanji", "paren"], default_value = "arabic")]
        format: String,
    },

    /// Print the search queries planned for a title.
    Queries {
        title: String,

        /// Wrap queries in a site: operator for this domain.
        #[arg(long)]
        site: Option<String>,
    },

    /// Search configured stores for a purchase link.
    Search {
        title: String,

        /// Restrict to one configured store by name.
        #[arg(long)]
        site: Option<String>,
    },

    /// Search every catalog entry and write a report.
    Batch {
        /// Catalog file (tab-separated `n_code<TAB>title` lines).
        catalog: PathBuf,

        /// Output report path (`.csv` writes CSV, anything else JSON).
        #[arg(long, default_value = "report.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let console = Console::new();

    match args.command {
        Command::Score { query, candidate } => {
            let score = similarity_score(&query, &candidate);
            println!("{}", console.score(score));
        }
        Command::Variants { title } => {
            for variant in create_volume_variants(&title) {
                println!("{variant}");
            }
        }
        Command::Rewrite { title, format } => {
            println!("{}", normalize_volume_notation(&title, parse_format(&format)));
        }
        Command::Queries { title, site } => {
            let queries = match site {
                Some(domain) => site_queries(&title, &domain, DEFAULT_QUERY_LIMIT),
                None => plan_queries(&title, DEFAULT_QUERY_LIMIT),
            };
            for query in queries {
                println!("{query}");
            }
        }
        Command::Search { title, site } => {
            run_search(&console, &title, site.as_deref()).await?;
        }
        Command::Batch { catalog, out } => {
            run_batch(&console, &catalog, &out).await?;
        }
    }

    Ok(())
}

/// Searches the configured stores (or one of them) for a single title.
async fn run_search(console: &Console, title: &str, site: Option<&str>) -> Result<()> {
    let config = load_config(console)?;
    let sources = build_sources(&config, site)?;

    console.section(&format!("Searching for: {title}"));

    for source in &sources {
        console.step(&format!("Searching {}...", source.name()));
        match find_link(source.as_ref(), title, &config.matching).await {
            Ok(Some(hit)) => {
                console.success(&format!(
                    "{} (score {})",
                    hit.candidate.url,
                    console.score(hit.score)
                ));
                console.info(&console.muted(&format!("matched title: {}", hit.candidate.title)));
            }
            Ok(None) => console.warning("No confident match"),
            Err(e) => console.error(&format!("Search failed: {e}")),
        }
    }

    Ok(())
}

/// Runs the whole catalog against every configured store and writes a report.
async fn run_batch(console: &Console, catalog_path: &PathBuf, out: &PathBuf) -> Result<()> {
    let config = load_config(console)?;
    let sources = build_sources(&config, None)?;

    console.step("Loading catalog...");
    let catalog = load_catalog(catalog_path).context("Failed to load catalog")?;
    console.success(&format!("Loaded {} catalog entries", catalog.len()));

    console.section("Searching stores");
    let report = search_catalog(&sources, &catalog, &config.matching).await;

    console.section("Results");
    console.info(&format!(
        "{} searches: {} found, {} not found, {} failed ({:.1}% success)",
        report.total_searches,
        report.successful,
        report.not_found,
        report.failed,
        report.success_rate()
    ));

    let is_csv = out.extension().is_some_and(|ext| ext == "csv");
    if is_csv {
        report.write_csv(out).context("Failed to write CSV report")?;
    } else {
        report.write_json(out).context("Failed to write JSON report")?;
    }
    console.success(&format!("Report written to {}", out.display()));

    Ok(())
}

fn load_config(console: &Console) -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if let Ok(path) = Config::config_path() {
        console.info(&console.muted(&format!("config: {}", path.display())));
    }

    Ok(config)
}

/// Builds a searcher per configured site, optionally restricted to one.
fn build_sources(config: &Config, site: Option<&str>) -> Result<Vec<Box<dyn CandidateSource>>> {
    let profiles: Vec<_> = match site {
        Some(name) => {
            let profile = config
                .site_by_name(name)
                .ok_or_else(|| anyhow::anyhow!("No configured site named '{name}'"))?;
            vec![profile.clone()]
        }
        None => config.sites.clone(),
    };

    profiles
        .into_iter()
        .map(|profile| {
            let name = profile.name.clone();
            SiteSearcher::new(profile, config.fetch.clone())
                .map(|searcher| Box::new(searcher) as Box<dyn CandidateSource>)
                .with_context(|| format!("Failed to create searcher for {name}"))
        })
        .collect()
}

fn parse_format(format: &str) -> VolumeFormat {
    match format {
        "circled" => VolumeFormat::Circled,
        "kanji" => VolumeFormat::Kanji,
        "paren" => VolumeFormat::Paren,
        _ => VolumeFormat::Arabic,
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("meguri={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
