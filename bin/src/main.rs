//! Ronda CLI binary.
//!
//! Provides a command-line interface for the ronda metric engine.

mod cmd;
mod config;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::Config;
use ronda_store::SqliteStore;
use ronda_traits::MetricPeriod;
use std::{path::PathBuf, process};
use tracing_subscriber::EnvFilter;

/// Crates whose logs are shown by default.
const LOG_TARGETS: &[&str] = &[
    "ronda",
    "ronda_traits",
    "ronda_store",
    "ronda_metrics",
    "ronda_rank",
    "ronda_fmp",
];

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Derived financial metrics and rankings for listed companies", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database path (overrides RONDA_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the company universe
    Company {
        #[command(subcommand)]
        action: CompanyAction,
    },

    /// Ingest statements and prices from a data provider
    Ingest {
        #[command(subcommand)]
        source: IngestSource,
    },

    /// Load daily prices for one company from a CSV file
    LoadPrices {
        /// CSV with date, open, high, low, close, volume columns
        csv: PathBuf,

        /// Company the prices belong to
        #[arg(short, long)]
        ticker: String,
    },

    /// Recompute TTM, growth, margin and valuation metrics
    Recompute {
        /// Ticker symbol(s); all companies when omitted
        #[arg(short, long, value_delimiter = ',')]
        tickers: Vec<String>,
    },

    /// Compute technical indicators from daily prices
    Technicals {
        /// Ticker symbol(s); all companies when omitted
        #[arg(short, long, value_delimiter = ',')]
        tickers: Vec<String>,
    },

    /// Compose and store a ranking
    Rank {
        /// JSON ranking definition file
        #[arg(short, long, conflicts_with = "slug")]
        definition: Option<PathBuf>,

        /// Built-in ranking slug
        #[arg(short, long)]
        slug: Option<String>,

        /// Ticker symbol(s); all companies when omitted
        #[arg(short, long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Fewest qualifying companies needed to store a run
        #[arg(long, default_value = "1")]
        min_companies: usize,

        /// Rows to print
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },

    /// Show the stored leaderboard for a ranking
    Leaderboard {
        /// Ranking slug
        slug: String,

        /// Rows to print
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },

    /// Show one metric's history for a company
    Series {
        /// Ticker symbol
        ticker: String,

        /// Metric key, e.g. Revenue_TTM
        key: String,

        /// Period type (q, ttm, d)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Show the latest value of every metric for a company
    Latest {
        /// Ticker symbol
        ticker: String,
    },

    /// List available metrics
    Metrics {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum CompanyAction {
    /// Add or update a company
    Add {
        /// Ticker symbol
        ticker: String,

        /// Display name (defaults to the ticker)
        #[arg(long)]
        name: Option<String>,

        /// Sector
        #[arg(long)]
        sector: Option<String>,

        /// Reporting currency (default: USD)
        #[arg(long)]
        currency: Option<String>,

        /// SEC Central Index Key
        #[arg(long)]
        cik: Option<String>,
    },

    /// List companies
    List,

    /// Remove a company and everything recorded for it
    Remove {
        /// Ticker symbol
        ticker: String,
    },
}

#[derive(Subcommand)]
enum IngestSource {
    /// Financial Modeling Prep
    Fmp {
        /// Ticker symbol(s); all companies when omitted
        #[arg(short, long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Request annual instead of quarterly statements
        #[arg(long)]
        annual: bool,

        /// Statements per request
        #[arg(long, default_value = "40")]
        limit: u32,

        /// Skip daily prices
        #[arg(long)]
        no_prices: bool,

        /// First price date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{t}={level}")).collect();
        EnvFilter::new(directives.join(","))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Registry listing needs no database
    if let Commands::Metrics { category } = &cli.command {
        return cmd::metrics::list_metrics(category.clone(), cli.verbose);
    }

    let config = Config::from_env().with_database(cli.database);
    let store = SqliteStore::new(&config.database)
        .with_context(|| format!("cannot open database {}", config.database.display()))?;

    match cli.command {
        Commands::Company { action } => match action {
            CompanyAction::Add {
                ticker,
                name,
                sector,
                currency,
                cik,
            } => cmd::company::add_company(&store, &ticker, name, sector, currency, cik)?,
            CompanyAction::List => cmd::company::list_companies(&store)?,
            CompanyAction::Remove { ticker } => cmd::company::remove_company(&store, &ticker)?,
        },
        Commands::Ingest { source } => match source {
            IngestSource::Fmp {
                tickers,
                annual,
                limit,
                no_prices,
                from,
            } => {
                let options = cmd::ingest::FmpOptions {
                    tickers: cmd::tickers(&tickers),
                    annual,
                    limit,
                    no_prices,
                    from: from.as_deref().map(parse_date).transpose()?,
                };
                cmd::ingest::ingest_fmp(&store, config.fmp_api_key, options).await?;
            }
        },
        Commands::LoadPrices { csv, ticker } => {
            cmd::prices::load_prices(&store, &csv, &ticker)?;
        }
        Commands::Recompute { tickers } => {
            cmd::compute::recompute(&store, &cmd::tickers(&tickers))?;
        }
        Commands::Technicals { tickers } => {
            cmd::compute::technicals(&store, &cmd::tickers(&tickers))?;
        }
        Commands::Rank {
            definition,
            slug,
            tickers,
            min_companies,
            top,
        } => {
            cmd::rank::run_ranking(
                &store,
                definition.as_deref(),
                slug.as_deref(),
                &cmd::tickers(&tickers),
                min_companies,
                top,
            )?;
        }
        Commands::Leaderboard { slug, top } => {
            cmd::rank::show_leaderboard(&store, &slug, top)?;
        }
        Commands::Series {
            ticker,
            key,
            period,
        } => {
            let period = period
                .as_deref()
                .map(str::parse::<MetricPeriod>)
                .transpose()?;
            cmd::query::show_series(&store, &ticker, &key, period)?;
        }
        Commands::Latest { ticker } => {
            cmd::query::show_latest(&store, &ticker)?;
        }
        Commands::Metrics { .. } => {}
    }

    Ok(())
}
