//! `leadmap` - scrape business leads from map search results.

use anyhow::{Context, Result};
use clap::Parser;
use leadmap_browser::BrowserSession;
use leadmap_core::AppConfig;
use leadmap_scraper::{scrape_with, ScrapeOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leadmap")]
#[command(about = "Scrape business leads from map search results")]
#[command(version)]
struct Cli {
    /// Search query, e.g. "mobile repair shops in Austin"
    query: String,

    /// Output file (defaults to the configured CSV path, or leads.json
    /// with --json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write JSON instead of CSV
    #[arg(long)]
    json: bool,

    /// How many leads to collect
    #[arg(long)]
    leads: Option<usize>,

    /// Ceiling on concurrent extraction tabs
    #[arg(long)]
    tabs: Option<usize>,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(leads) = cli.leads {
        config.scraper.target_leads = leads;
    }
    if let Some(tabs) = cli.tabs {
        config.scraper.max_tabs = tabs;
    }
    if cli.headed {
        config.browser.headless = false;
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::load_with_env().context("failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    // A zero target never opens a browser.
    if config.scraper.target_leads == 0 {
        tracing::warn!("target lead count is zero, nothing to do");
        return Ok(ExitCode::FAILURE);
    }

    let session = BrowserSession::launch(&config.browser)
        .await
        .context("failed to launch browser")?;

    // The browser is shut down whether or not the scrape succeeded.
    let result = scrape_with(&session, &cli.query, &ScrapeOptions::from_config(&config)).await;
    if let Err(e) = session.close().await {
        tracing::warn!("browser shutdown failed: {}", e);
    }
    let leads = result.context("scrape failed")?;

    if leads.is_empty() {
        tracing::warn!("no leads found for {:?}", cli.query);
        return Ok(ExitCode::FAILURE);
    }

    let output = cli.output.unwrap_or_else(|| {
        if cli.json {
            PathBuf::from("leads.json")
        } else {
            PathBuf::from(&config.output.csv_path)
        }
    });
    if cli.json {
        leadmap_export::write_json(&leads, &output).context("failed to write JSON")?;
    } else {
        leadmap_export::write_csv(&leads, &output).context("failed to write CSV")?;
    }

    println!("{} leads written to {}", leads.len(), output.display());
    Ok(ExitCode::SUCCESS)
}
