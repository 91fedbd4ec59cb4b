//! Scopes - dashboard scope selection from the shell
//!
//! Usage:
//!   scopes catalog                 # List scopes from scopes.toml
//!   scopes catalog --remote        # List scopes from the configured endpoint
//!   scopes select prod eu          # Apply a selection and show the result
//!   scopes dashboards list.json    # Filter a dashboard listing by scopes
//!   scopes config                  # Show the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scopes_core::prelude::*;
use scopes_core::runtime::block_on;

#[derive(Parser)]
#[command(name = "scopes")]
#[command(about = "Dashboard scope selection", long_about = None)]
struct Cli {
    /// Path to scopes.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scope catalog
    Catalog {
        /// Fetch from the configured provider instead of the inline catalog
        #[arg(long)]
        remote: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Select scopes and print the effective selection
    Select {
        /// Scope ids, in priority order
        ids: Vec<String>,

        /// Fetch from the configured provider instead of the inline catalog
        #[arg(long)]
        remote: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Filter a JSON dashboard listing by scopes
    Dashboards {
        /// JSON file containing an array of dashboards
        listing: PathBuf,

        /// Scope ids to filter by (defaults to initial_selection from config)
        #[arg(long = "scope", value_name = "ID")]
        scopes: Vec<String>,

        /// Case-insensitive title search
        #[arg(long, short)]
        query: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config {
        /// Write a default scopes.toml if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

/// Catalog source picked from the command line.
enum CatalogSource {
    Inline(StaticScopesProvider),
    Remote(HttpScopesProvider),
}

impl CatalogSource {
    fn from_config(config: &ScopesConfig, remote: bool) -> Result<Self> {
        if !remote {
            return Ok(Self::Inline(StaticScopesProvider::new(config.scopes.clone())));
        }
        let provider = config
            .provider
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No [provider] configured in scopes.toml"))?;
        Ok(Self::Remote(HttpScopesProvider::from_config(provider)?))
    }
}

impl ScopesProvider for CatalogSource {
    async fn fetch_scopes(&self) -> Result<Vec<Scope>> {
        match self {
            CatalogSource::Inline(provider) => provider.fetch_scopes().await,
            CatalogSource::Remote(provider) => provider.fetch_scopes().await,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scopes=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match &cli.config {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::from_default_location()?,
    };

    match cli.command {
        Commands::Catalog { remote, format } => run_catalog(&store, remote, format),
        Commands::Select {
            ids,
            remote,
            format,
        } => run_select(&store, ids, remote, format),
        Commands::Dashboards {
            listing,
            scopes,
            query,
            format,
        } => run_dashboards(&store, listing, scopes, query, format),
        Commands::Config { init } => run_config(&store, init),
    }
}

/// Install the process-wide instance and load the catalog through a selector.
fn open_selector(
    config: &ScopesConfig,
    remote: bool,
) -> Result<(ScopesTeardown, ScopesSelector<CatalogSource>)> {
    let teardown = initialize_scopes(config)?;
    let selector = ScopesSelector::new(
        teardown.context().clone(),
        CatalogSource::from_config(config, remote)?,
    );
    let outcome = block_on(selector.open())??;
    tracing::debug!(?outcome, "Scope catalog loaded");
    Ok((teardown, selector))
}

fn run_catalog(store: &ConfigStore, remote: bool, format: OutputFormat) -> Result<()> {
    let config = store.load()?;
    let (teardown, selector) = open_selector(&config, remote)?;
    let catalog = selector.context().catalog();

    match format {
        OutputFormat::Table => print_scope_table(&catalog),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
    }

    teardown.teardown();
    Ok(())
}

fn run_select(
    store: &ConfigStore,
    ids: Vec<String>,
    remote: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = store.load()?;
    let (teardown, selector) = open_selector(&config, remote)?;

    selector.set_selection(ids)?;
    let report = selector.commit()?;
    let selected = scopes_core::get_selected_scopes();

    match format {
        OutputFormat::Table => {
            if selected.is_empty() {
                println!("No scopes selected");
            } else {
                print_scope_table(&selected);
            }
            for id in &report.dropped {
                println!("  Warning: unknown scope '{}' was dropped", id);
            }
            if !config.enabled {
                println!("  Note: scopes are disabled in config; consumers ignore the selection");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "enabled": config.enabled,
                "selected": scopes_core::get_selected_scopes_names(),
                "dropped": report.dropped,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    teardown.teardown();
    Ok(())
}

fn run_dashboards(
    store: &ConfigStore,
    listing: PathBuf,
    scopes: Vec<String>,
    query: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = store.load()?;
    let content = std::fs::read_to_string(&listing)
        .with_context(|| format!("Failed to read dashboard listing: {}", listing.display()))?;
    let listing: Vec<Dashboard> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dashboard listing: {}", listing.display()))?;

    let teardown = initialize_scopes(&config)?;
    let context = teardown.context();
    if !scopes.is_empty() {
        let report = context.select(&scopes);
        for id in &report.dropped {
            eprintln!("Warning: unknown scope '{}' was dropped", id);
        }
        for id in &report.truncated {
            eprintln!("Warning: scope '{}' ignored in single-selection mode", id);
        }
    }

    let mut dashboards = ScopesDashboards::new(listing);
    if let Some(query) = query {
        dashboards.set_query(query);
    }
    let matched = dashboards.filtered(context);

    match format {
        OutputFormat::Table => {
            println!("{:<24} {:<40} Folder", "UID", "Title");
            for dashboard in matched {
                println!(
                    "{:<24} {:<40} {}",
                    dashboard.uid,
                    dashboard.title,
                    dashboard.folder.as_deref().unwrap_or("-")
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(matched)?),
    }

    teardown.teardown();
    Ok(())
}

fn run_config(store: &ConfigStore, init: bool) -> Result<()> {
    if init && !store.config_path().exists() {
        store.save(&ScopesConfig::new())?;
        println!("Wrote default config to {}", store.config_path().display());
    }

    let config = store.load()?;
    println!("# {}", store.config_path().display());
    print!("{}", scopes_core::config::to_toml(&config)?);
    Ok(())
}

fn print_scope_table(scopes: &[Scope]) {
    println!("{:<20} {:<30} {:<14} Filters", "ID", "Title", "Category");
    for scope in scopes {
        let filters = scope
            .filters
            .iter()
            .map(|f| {
                if f.values.is_empty() {
                    format!("{} {} {}", f.key, f.operator, f.value)
                } else {
                    format!("{} {} [{}]", f.key, f.operator, f.values.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        println!(
            "{:<20} {:<30} {:<14} {}",
            scope.id,
            scope.title,
            scope.category.as_deref().unwrap_or("-"),
            filters
        );
    }
}
