use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use sla_insight_server::config::{Settings, SlaPolicy};
use sla_insight_server::database::Database;
use sla_insight_server::ingestion::IngestionService;
use sla_insight_server::prediction::PredictionService;
use sla_insight_server::{build_router, generator, logging, AppState};

#[derive(Parser)]
#[command(name = "sla-insight", version)]
#[command(about = "Support-ticket SLA analytics and breach prediction")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file, extension optional
    #[arg(short, long, env = "SLA_INSIGHT_CONFIG", default_value = "config/settings")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server - Default
    Serve,
    /// Create the database tables if missing
    InitDb,
    /// Replace stored data with the configured CSV files
    Ingest {
        #[arg(long)]
        customers: Option<PathBuf>,
        #[arg(long)]
        tickets: Option<PathBuf>,
    },
    /// Write a synthetic dataset
    Generate {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Train the breach classifier on stored tickets
    Train,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)?;
    logging::init_logger(&settings.logging)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await?,
        Commands::InitDb => init_db(&settings).await?,
        Commands::Ingest { customers, tickets } => ingest(&settings, customers, tickets).await?,
        Commands::Generate { seed, output_dir } => generate(settings, seed, output_dir)?,
        Commands::Train => train(&settings).await?,
    }

    Ok(())
}

async fn open_database(settings: &Settings) -> Result<Database> {
    let database = Database::new(&settings.database)
        .with_context(|| format!("Invalid database url {}", settings.database.url))?;
    database.initialize_schema().await?;
    Ok(database)
}

async fn serve(settings: Settings) -> Result<()> {
    info!("🚀 Starting SLA Insight server...");

    let policy = SlaPolicy::load_or_default(&settings.data.sla_policy_path)?;
    let database = open_database(&settings).await?;
    info!("✅ Database ready at {}", settings.database.url);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    let app = build_router(AppState::new(settings, database, policy));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_db(settings: &Settings) -> Result<()> {
    open_database(settings).await?;
    println!("Database initialized at {}", settings.database.url);
    Ok(())
}

async fn ingest(
    settings: &Settings,
    customers: Option<PathBuf>,
    tickets: Option<PathBuf>,
) -> Result<()> {
    let policy = SlaPolicy::load_or_default(&settings.data.sla_policy_path)?;
    let database = open_database(settings).await?;
    let service = IngestionService::new(database, policy.into(), settings.ingestion.max_issues);

    let customers = customers.unwrap_or_else(|| settings.data.customers_csv.clone());
    let tickets = tickets.unwrap_or_else(|| settings.data.tickets_csv.clone());
    let report = service.ingest_files(&customers, &tickets).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn generate(settings: Settings, seed: Option<u64>, output_dir: Option<PathBuf>) -> Result<()> {
    let mut config = settings.generator;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let summary = generator::generate_to_dir(&config)?;
    println!(
        "Wrote: tickets.csv ({}), customers.csv ({}), sla_policy.json to {}",
        summary.tickets,
        summary.customers,
        config.output_dir.display()
    );
    Ok(())
}

async fn train(settings: &Settings) -> Result<()> {
    let database = open_database(settings).await?;
    let service = PredictionService::new(database, settings.model.clone());

    let metrics = service.train().await?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
