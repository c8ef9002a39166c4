mod app;
mod domain;
mod infra;
mod report;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use crate::app::{current_target_year, load_dashboard, Dashboard};
use crate::infra::CensusClient;
use crate::util::{
    logging::{init_logging, LogConfig},
    settings::{init_default_settings, load_settings, Settings},
    version::{version_label, APP_NAME},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Formatted data table
    Table,
    /// Joined rows and totals as JSON
    Json,
    /// Choropleth series as JSON
    Map,
}

#[derive(Debug, Parser)]
#[command(name = "trade-tariff-monitor", version, about = "US trade balances joined with tariff policy")]
struct Cli {
    /// Report year (defaults to last calendar year)
    #[arg(long)]
    year: Option<i32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write default settings to the platform config directory and exit
    #[arg(long)]
    init_config: bool,

    /// Re-render every SECS seconds; the cache decides when to hit the network
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = match init_logging(LogConfig::from_env()) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("failed to initialise logging: {err}");
            false
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            report_failure(&message, logging);
            ExitCode::FAILURE
        }
    }
}

/// Fatal errors must reach the user even without a subscriber installed.
fn report_failure(message: &str, logging: bool) {
    if logging {
        error!("{message}");
    } else {
        eprintln!("{}", failure_line(message));
    }
}

fn failure_line(message: &str) -> String {
    format!("{APP_NAME}: {message}")
}

async fn run(cli: Cli) -> Result<(), String> {
    if cli.init_config {
        let path = init_default_settings().map_err(|err| err.to_string())?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let settings = load_settings(cli.config.as_deref()).map_err(|err| err.to_string())?;
    let catalog = settings.catalog().map_err(|err| err.to_string())?;
    let client = build_client(&settings).map_err(|err| err.to_string())?;
    let year = cli.year.or(settings.year).unwrap_or_else(current_target_year);

    info!(
        app = APP_NAME,
        version = %version_label(),
        year,
        countries = catalog.len(),
        exports = %client.endpoints().exports,
        imports = %client.endpoints().imports,
        "starting"
    );
    if catalog.is_empty() {
        warn!("tariff catalog is empty; the report will have no rows");
    }

    loop {
        let dashboard = load_dashboard(&client, &catalog, year).await;
        info!("{}", report::status_line(&dashboard));
        print_dashboard(&dashboard, cli.format).map_err(|err| err.to_string())?;

        let Some(secs) = cli.watch else {
            return Ok(());
        };
        tokio::time::sleep(Duration::from_secs(secs.max(1))).await;
    }
}

fn build_client(settings: &Settings) -> Result<CensusClient, infra::FetchError> {
    CensusClient::builder()
        .endpoints(settings.exports_url.as_str(), settings.imports_url.as_str())
        .ttl(settings.cache_ttl())
        .timeout(settings.request_timeout())
        .build()
}

fn print_dashboard(dashboard: &Dashboard, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Table => print!("{}", report::render_table(dashboard)),
        OutputFormat::Json => println!("{}", report::render_json(dashboard)?),
        OutputFormat::Map => println!("{}", report::render_map(dashboard)?),
    }
    Ok(())
}
