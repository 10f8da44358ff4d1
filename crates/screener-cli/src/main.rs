//! investor-screener: score stocks against Buffett, Munger and Peter Lynch style checklists.
//!
//! Usage:
//!   investor-screener                                   # interactive menus
//!   investor-screener --ticker AAPL                     # all profiles, detailed
//!   investor-screener -p buffett -t AAPL -t MSFT -t KO  # summary per ticker
//!   investor-screener -t AAPL --json
//!   investor-screener --metrics-file fixtures.json -t AAPL   # offline

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Select};
use evaluation_engine::EvaluationEngine;
use investor_profiles::{load_profiles, InvestorProfile, ProfileRegistry};
use screener_core::{normalize_ticker, MetricsProvider, StaticMetricsProvider};
use std::path::PathBuf;
use std::sync::Arc;
use yahoo_client::YahooClient;

mod config;
mod render;

use config::ScreenerConfig;

#[derive(Parser, Debug)]
#[command(name = "investor-screener", version)]
#[command(about = "Screen stocks against classic investor philosophies", long_about = None)]
struct Args {
    /// Profile to apply (repeatable, or "all"); defaults to all
    #[arg(short, long = "profile")]
    profiles: Vec<String>,

    /// Ticker symbol (repeatable); omit to use the interactive menus
    #[arg(short, long = "ticker")]
    tickers: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Read metrics from a JSON fixture instead of Yahoo Finance
    #[arg(long)]
    metrics_file: Option<PathBuf>,

    /// Extra profiles to register on top of the built-ins
    #[arg(long)]
    profiles_file: Option<PathBuf>,

    /// Tickers evaluated at once in summary mode
    #[arg(long)]
    concurrency: Option<usize>,

    /// List registered profiles and exit
    #[arg(long)]
    list_profiles: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Single,
    Batch,
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "investor_screener=info,evaluation_engine=info,yahoo_client=warn".into()
        })
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so stdout carries only the scorecards.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_registry(profiles_file: Option<&PathBuf>) -> Result<ProfileRegistry> {
    let mut registry = ProfileRegistry::with_builtins().context("Built-in profiles are invalid")?;
    if let Some(path) = profiles_file {
        let extra = load_profiles(path)
            .with_context(|| format!("Failed to load profiles from {}", path.display()))?;
        registry.register_all(extra)?;
    }
    Ok(registry)
}

fn build_provider(config: &ScreenerConfig) -> Result<Arc<dyn MetricsProvider>> {
    match &config.metrics_file {
        Some(path) => {
            let provider = StaticMetricsProvider::from_file(path)
                .with_context(|| format!("Failed to load metrics from {}", path.display()))?;
            Ok(Arc::new(provider))
        }
        None => {
            let client = YahooClient::new(config.yahoo_config())
                .context("Failed to create Yahoo Finance client")?;
            Ok(Arc::new(client))
        }
    }
}

fn prompt_profiles(registry: &ProfileRegistry) -> Result<Vec<InvestorProfile>> {
    let names = registry.names();
    let mut items = names.clone();
    items.push(format!("All ({})", names.join(", ")));

    let choice = Select::new()
        .with_prompt("Select an investor for stock evaluation")
        .items(&items)
        .default(0)
        .interact()
        .context("Interactive mode needs a terminal; pass --ticker instead")?;

    let selection = if choice < names.len() {
        registry.select(&names[choice..=choice])?
    } else {
        registry.select::<&str>(&[])?
    };
    Ok(selection)
}

fn prompt_mode() -> Result<Mode> {
    let choice = Select::new()
        .with_prompt("Select analysis mode")
        .items(&[
            "Single stock (detailed criteria)",
            "Multiple stocks (summary only)",
        ])
        .default(0)
        .interact()?;
    Ok(if choice == 0 { Mode::Single } else { Mode::Batch })
}

/// Blank input returns `None`.
fn prompt_ticker(prompt: &str) -> Result<Option<String>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let ticker = normalize_ticker(&input);
    Ok((!ticker.is_empty()).then_some(ticker))
}

fn prompt_tickers(mode: Mode) -> Result<Vec<String>> {
    match mode {
        Mode::Single => Ok(prompt_ticker("Enter ticker symbol")?.into_iter().collect()),
        Mode::Batch => {
            let mut tickers = Vec::new();
            while let Some(ticker) = prompt_ticker("Enter ticker symbol (blank to finish)")? {
                tickers.push(ticker);
            }
            Ok(tickers)
        }
    }
}

async fn run_single(
    engine: &EvaluationEngine,
    ticker: &str,
    profiles: &[InvestorProfile],
    json: bool,
) -> Result<()> {
    let results = engine
        .evaluate(ticker, profiles)
        .await
        .with_context(|| format!("Failed to evaluate {}", ticker.trim()))?;

    if json {
        println!("{}", render::to_json(&results)?);
    } else {
        print!("{}", render::render_detailed(&normalize_ticker(ticker), &results));
    }
    Ok(())
}

async fn run_batch(
    engine: &EvaluationEngine,
    tickers: &[String],
    profiles: &[InvestorProfile],
    json: bool,
) -> Result<()> {
    let report = engine.evaluate_batch(tickers, profiles).await;

    if json {
        println!("{}", render::to_json(&report)?);
    } else {
        print!("{}", render::render_batch(&report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut config = ScreenerConfig::from_env()?;
    if let Some(path) = args.metrics_file.clone() {
        config.metrics_file = Some(path);
    }
    if let Some(path) = args.profiles_file.clone() {
        config.profiles_file = Some(path);
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;

    let registry = build_registry(config.profiles_file.as_ref())?;

    if args.list_profiles {
        for profile in registry.profiles() {
            println!(
                "{} ({} criteria, {} required)",
                profile.name(),
                profile.criteria().len(),
                profile.min_passing()
            );
        }
        return Ok(());
    }

    let provider = build_provider(&config)?;
    tracing::info!(
        "Using {} metrics provider, {} profiles registered",
        provider.name(),
        registry.len()
    );
    let engine = EvaluationEngine::new(provider).with_concurrency(config.concurrency);

    if args.tickers.is_empty() {
        let profiles = prompt_profiles(&registry)?;
        let mode = prompt_mode()?;
        let tickers = prompt_tickers(mode)?;
        if tickers.is_empty() {
            println!("No ticker symbol entered.");
            return Ok(());
        }
        return match mode {
            Mode::Single => run_single(&engine, &tickers[0], &profiles, args.json).await,
            Mode::Batch => run_batch(&engine, &tickers, &profiles, args.json).await,
        };
    }

    let profiles = registry.select(&args.profiles)?;
    match args.tickers.as_slice() {
        [ticker] => run_single(&engine, ticker, &profiles, args.json).await,
        tickers => run_batch(&engine, tickers, &profiles, args.json).await,
    }
}
