//! Trading Card Deal Scanner
//!
//! Command-line entry point.

use clap::{Parser, Subcommand};
use deal_scanner::{
    client::{
        DetailFetcher, HttpDetailFetcher, JsonCatalog, JsonFileListingSource, JsonMarketData, JsonlDealSink,
        PassthroughDetailFetcher,
    },
    config::Config,
    extract::extract_signals,
    notify::LogAlerter,
    pricing::buyer_protection_fee,
    scanner::{Collaborators, ScanOrchestrator},
    types::RawListing,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deal-scanner")]
#[command(about = "Scans trading card listings for underpriced deals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(clap::Args, Clone)]
struct Sources {
    /// JSON array of listings, re-read every cycle
    #[arg(long, default_value = "listings.json")]
    listings: String,
    /// JSON array of catalog cards
    #[arg(long, default_value = "catalog.json")]
    catalog: String,
    /// JSON object of market snapshots keyed by card ID
    #[arg(long, default_value = "market.json")]
    market: String,
    /// JSON-lines deal log, also used for dedup across restarts
    #[arg(long, default_value = "deals.jsonl")]
    out: String,
    /// Listing detail endpoint; without it detail calls echo the listing
    #[arg(long)]
    detail_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan on the configured interval until interrupted
    Run(Sources),
    /// Run a single scan cycle
    Once(Sources),
    /// Print the signals extracted from a listing title
    Extract {
        title: String,
    },
    /// Print the buyer protection fee for a price
    Fee {
        price: Decimal,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(sources) => {
            let config = Config::load(&cli.config)?;
            run(config, sources).await
        }
        Commands::Once(sources) => {
            let config = Config::load(&cli.config)?;
            once(config, sources).await
        }
        Commands::Extract { title } => extract(&title),
        Commands::Fee { price } => {
            println!("{}", buyer_protection_fee(price));
            Ok(())
        }
    }
}

async fn build_orchestrator(config: &Config, sources: &Sources) -> anyhow::Result<ScanOrchestrator> {
    let sink = Arc::new(JsonlDealSink::open(&sources.out).await?);
    let detail: Arc<dyn DetailFetcher> = match &sources.detail_url {
        Some(url) => Arc::new(HttpDetailFetcher::new(url)?),
        None => {
            tracing::warn!("No detail endpoint configured, enrichment uses listing data as-is");
            Arc::new(PassthroughDetailFetcher)
        }
    };

    let catalog = JsonCatalog::load(&sources.catalog).await?;
    tracing::info!("📚 Catalog loaded: {} cards", catalog.len());

    Ok(ScanOrchestrator::new(
        config,
        Collaborators {
            listings: Arc::new(JsonFileListingSource::new(&sources.listings)),
            catalog: Arc::new(catalog),
            market: Arc::new(JsonMarketData::load(&sources.market).await?),
            detail,
            sink: sink.clone(),
            dedup_store: sink,
            alerter: Arc::new(LogAlerter),
        },
    ))
}

async fn run(config: Config, sources: Sources) -> anyhow::Result<()> {
    let orchestrator = Arc::new(build_orchestrator(&config, &sources).await?);

    tokio::select! {
        _ = orchestrator.clone().run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl-C received, shutting down");
        }
    }

    let budget = orchestrator.budget().get_budget_status();
    tracing::info!("Budget used today: {}/{}", budget.used, budget.daily_limit);
    Ok(())
}

async fn once(config: Config, sources: Sources) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config, &sources).await?;
    if let Some(stats) = orchestrator.run_cycle().await? {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

fn extract(title: &str) -> anyhow::Result<()> {
    let listing = RawListing {
        id: "cli".to_string(),
        title: title.to_string(),
        price: Decimal::ZERO,
        shipping: Decimal::ZERO,
        condition: None,
        seller: Default::default(),
        aspects: vec![],
        created_at: chrono::Utc::now(),
    };
    println!("{}", serde_json::to_string_pretty(&extract_signals(&listing))?);
    Ok(())
}
