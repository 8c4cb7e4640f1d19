//! CLI entry point for the route fairness tool.
//!
//! Loads the route and pickup tables, routes every pickup to its
//! destination, and prints per-route and per-pickup difficulty tables.

use anyhow::Result;
use clap::Parser;
use route_fairness::config::{Destinations, Settings};
use route_fairness::dataset::Dataset;
use route_fairness::fetch::{BasicClient, HttpClient, auth::ApiKey};
use route_fairness::geography::OrsClient;
use route_fairness::output::{append_route_records, pickup_table, route_table, write_json_report};
use route_fairness::resolver::PathResolver;
use route_fairness::scoring::DifficultyScorer;
use std::ffi::OsStr;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "route_fairness")]
#[command(
    about = "Scores route difficulty from the paths between pickups and their destination",
    long_about = None
)]
struct Cli {
    /// CSV file containing the route table
    #[arg(value_name = "ROUTES")]
    routes: String,

    /// TSV file containing the pickup table
    #[arg(value_name = "PICKUPS")]
    pickups: String,

    /// Difficulty indicators to compute, in column order
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values = ["ascent", "descent", "distance"]
    )]
    indicators: Vec<String>,

    /// JSON file mapping destination classifications to [lon, lat]
    #[arg(short, long)]
    destinations: Option<String>,

    /// CSV file to append route scores to
    #[arg(short, long)]
    output: Option<String>,

    /// File to write the full JSON report to
    #[arg(long)]
    json: Option<String>,

    /// Print both tables without waiting for Enter in between
    #[arg(long, default_value_t = false)]
    no_pause: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/route_fairness.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("route_fairness.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    let destinations = match &cli.destinations {
        Some(path) => Destinations::load(path)?,
        None => Destinations::default(),
    };
    for (classification, coordinate) in destinations.iter() {
        info!(classification, %coordinate, "Destination");
    }

    let dataset = Dataset::load(&cli.routes, &cli.pickups)?;

    let http = BasicClient::new(settings.timeout)?;
    let http: Box<dyn HttpClient> = match settings.api_key.as_deref() {
        Some(key) => Box::new(ApiKey::authorization(http, key)?),
        None => Box::new(http),
    };
    let provider = OrsClient::new(http, &settings.base_url, &settings.profile)?;
    info!(url = %provider.directions_url(), "Routing service");

    let resolver = PathResolver::new(provider, destinations);
    let resolved = resolver.resolve_all(dataset).await?;

    let indicators: Vec<&str> = cli.indicators.iter().map(String::as_str).collect();
    let scores = DifficultyScorer::default().compute_difficulty(&resolved, &indicators)?;

    if let Some(path) = &cli.output {
        append_route_records(path, &scores.routes)?;
        info!(path, routes = scores.routes.routes.len(), "Route scores appended");
    }
    if let Some(path) = &cli.json {
        write_json_report(path, &scores)?;
    }

    print!("{}", route_table(&scores.routes));
    if !cli.no_pause {
        wait_for_enter("Press enter to print pickup difficulties:")?;
    }
    print!("{}", pickup_table(&scores.pickups));

    Ok(())
}

fn wait_for_enter(prompt: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;
    drop(stdout);

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
