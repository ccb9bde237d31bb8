//! propsync: apply system properties to a document store.
//!
//! Usage:
//!   propsync --store ./data
//!   propsync --store ./data --wiki sub --properties startup.properties
//!   propsync --store ./data -D 'property:xwiki:Main.WebHome^XWiki.ConfigClass.value=on'
//!
//! Without `--wiki` the main wiki is reconciled, as on application start.
//! The exit status is non-zero when any entry failed.

use anyhow::{Context, Result};
use clap::Parser;
use propsync_cli::{PassSummary, build_provider, events_for, parse_override};
use propsync_fetch::UriFetcher;
use propsync_store::JsonFileStore;
use propsync_updater::{PropertiesSetterListener, StaticFlavorManager, UpdaterConfig, UpdaterManager};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "propsync", version)]
#[command(about = "Apply system properties to wiki documents and attachments")]
struct Args {
    /// Document store directory
    #[arg(short, long)]
    store: PathBuf,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wiki to reconcile (repeatable); defaults to the main wiki
    #[arg(short, long = "wiki")]
    wikis: Vec<String>,

    /// Override the main wiki id
    #[arg(long)]
    main_wiki: Option<String>,

    /// Additional properties file (repeatable)
    #[arg(short, long = "properties")]
    properties: Vec<PathBuf>,

    /// Extra key=value entry, taking precedence over every other source
    #[arg(short = 'D', value_parser = parse_override)]
    defines: Vec<(String, String)>,

    /// Strip wrapping double quotes from property values
    #[arg(long)]
    trim_double_quotes: bool,

    /// Ignore the process environment
    #[arg(long)]
    no_env: bool,

    /// Print pass summaries as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let provider = build_provider(&config, &args.defines);

    let store = JsonFileStore::open(&args.store)
        .with_context(|| format!("Failed to open document store at {:?}", args.store))?;
    let fetcher = UriFetcher::new(config.fetcher_config()).context("Failed to build HTTP client")?;

    info!(store = ?args.store, sources = provider.len(), "propsync starting");
    let manager = UpdaterManager::new(Arc::new(store), Arc::new(fetcher), Arc::new(provider), config);
    let listener = PropertiesSetterListener::new(Arc::new(manager), Arc::new(StaticFlavorManager::new()));

    let summaries: Vec<PassSummary> = events_for(&args.wikis)
        .iter()
        .flat_map(|event| listener.on_event(event))
        .map(|report| PassSummary::from(&report))
        .collect();

    if args.json {
        let out = serde_json::to_string_pretty(&summaries).context("Failed to encode summary")?;
        println!("{out}");
    } else {
        print_summaries(&summaries);
    }

    if summaries.iter().all(PassSummary::is_clean) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn load_config(args: &Args) -> Result<UpdaterConfig> {
    let mut config = match &args.config {
        Some(path) => UpdaterConfig::load_from(path)?,
        None => UpdaterConfig::default(),
    };
    if args.trim_double_quotes {
        config.trim_double_quotes = true;
    }
    if args.no_env {
        config.include_environment = false;
    }
    if let Some(main_wiki) = &args.main_wiki {
        config.main_wiki = main_wiki.clone();
    }
    config.properties_files.extend(args.properties.iter().cloned());
    Ok(config)
}

fn print_summaries(summaries: &[PassSummary]) {
    for summary in summaries {
        println!("[{}]", summary.scope);
        for reference in &summary.properties_updated {
            println!("  updated property   {reference}");
        }
        for reference in &summary.attachments_updated {
            println!("  updated attachment {reference}");
        }
        for failure in &summary.failures {
            println!("  FAILED {}: {}", failure.key, failure.error);
        }
        println!(
            "  {} unchanged, {} ignored, {} failed",
            summary.unchanged,
            summary.ignored,
            summary.failures.len()
        );
    }
}
