// In app/src/main.rs

use anyhow::Result;
use app_config::Settings;
use clap::{Args, Parser, Subcommand};
use core_types::Decision;
use engine::Engine;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use strategies::{IndicatorEngine, MarketCycleDetector};
use tracing_subscriber::prelude::*;

mod input;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Short-term BUY/SELL/HOLD advisor for a price series.")]
struct Cli {
    /// Directory holding `base.toml` and environment-specific overrides.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    /// Load settings from this single TOML file instead of the layered sources.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produces a trading decision for the given prices.
    Analyze {
        #[command(flatten)]
        input: PriceArgs,

        /// Overrides the configured decision provider ("rules", "ema_rsi", "macd", "composite" or "llm").
        #[arg(long)]
        provider: Option<String>,

        /// Pretty-prints the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Prints only the indicator snapshot for the given prices.
    Indicators {
        #[command(flatten)]
        input: PriceArgs,

        /// Pretty-prints the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Classifies the market phase (accumulation, markup, bull market, decline, crash).
    Cycle {
        #[command(flatten)]
        input: PriceArgs,

        /// Pretty-prints the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug)]
struct PriceArgs {
    /// The current price followed by the price history, oldest first.
    #[arg(value_name = "PRICES", num_args = 0.., allow_negative_numbers = true)]
    prices: Vec<String>,

    /// Reads additional (older) history from a file of whitespace or comma separated prices.
    #[arg(long)]
    history_file: Option<PathBuf>,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => app_config::load_settings_file(path),
        None => app_config::load_settings_from(&cli.config_dir),
    };
    let (settings, config_error) = match loaded {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    init_tracing(&settings.app.log_level);

    if let Some(e) = config_error {
        tracing::error!(error = %e, "Failed to load settings.");
        let decision = Decision::fallback("configuration error", format!("Configuration error: {}", e));
        return emit(&decision, false, true);
    }

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Analyze { input, provider, pretty } => handle_analyze(settings, input, provider, pretty).await,
        Commands::Indicators { input, pretty } => handle_indicators(&settings, input, pretty),
        Commands::Cycle { input, pretty } => handle_cycle(&settings, input, pretty),
    }
}

/// Installs the stderr log subscriber; stdout is reserved for JSON output.
fn init_tracing(log_level: &str) {
    let level = log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("reqwest", tracing::Level::WARN)
                .with_target("hyper", tracing::Level::WARN)
                .with_default(level),
        );
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- "Analyze" Subcommand Logic ---

async fn handle_analyze(
    mut settings: Settings,
    input: PriceArgs,
    provider: Option<String>,
    pretty: bool,
) -> Result<ExitCode> {
    let series = match input::read_series(&input.prices, input.history_file.as_deref()) {
        Ok(series) => series,
        Err(e) => {
            tracing::error!(error = %e, "Rejected price input.");
            let decision = Decision::fallback("invalid input", format!("Analysis error: {:#}", e));
            return emit(&decision, pretty, true);
        }
    };

    if let Some(name) = provider {
        settings.decider.provider = name;
    }

    let engine = match Engine::from_settings(&settings) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, provider = %settings.decider.provider, "Could not create decision provider.");
            let decision = Decision::fallback("decision provider unavailable", format!("Analysis error: {:#}", e));
            return emit(&decision, pretty, true);
        }
    };

    tracing::info!(provider = engine.provider_name(), points = series.len(), "Starting analysis.");
    let decision = engine.analyze(&series).await;
    let failed = decision.is_error();
    emit(&decision, pretty, failed)
}

// --- "Indicators" Subcommand Logic ---

fn handle_indicators(settings: &Settings, input: PriceArgs, pretty: bool) -> Result<ExitCode> {
    let result = input::read_series(&input.prices, input.history_file.as_deref()).and_then(|series| {
        IndicatorEngine::new(settings.indicators.clone())
            .compute(&series.history, series.current_price)
            .map_err(anyhow::Error::from)
    });

    match result {
        Ok(snapshot) => emit(&snapshot, pretty, false),
        Err(e) => emit(&serde_json::json!({ "error": format!("{:#}", e) }), pretty, true),
    }
}

// --- "Cycle" Subcommand Logic ---

fn handle_cycle(settings: &Settings, input: PriceArgs, pretty: bool) -> Result<ExitCode> {
    let result = input::read_series(&input.prices, input.history_file.as_deref()).and_then(|series| {
        let prices: Vec<f64> = series.prices().collect();
        MarketCycleDetector::new(settings.cycle.clone())
            .detect(&prices)
            .map_err(anyhow::Error::from)
    });

    match result {
        Ok(reading) => emit(&reading, pretty, false),
        Err(e) => emit(&serde_json::json!({ "error": format!("{:#}", e) }), pretty, true),
    }
}

/// Prints `value` as JSON on stdout and maps `failed` to the exit status.
fn emit<T: Serialize>(value: &T, pretty: bool, failed: bool) -> Result<ExitCode> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::parse_from(["signal-advisor", "analyze", "--provider", "llm", "111", "100", "102"]);
        match cli.command {
            Commands::Analyze { input, provider, pretty } => {
                assert_eq!(input.prices, vec!["111", "100", "102"]);
                assert_eq!(provider.as_deref(), Some("llm"));
                assert!(!pretty);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cycle_arguments() {
        let cli = Cli::parse_from(["signal-advisor", "--config-dir", "/etc/advisor", "cycle", "--pretty", "5", "4"]);
        assert_eq!(cli.config_dir, PathBuf::from("/etc/advisor"));
        match cli.command {
            Commands::Cycle { input, pretty } => {
                assert_eq!(input.prices, vec!["5", "4"]);
                assert!(pretty);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_negative_prices_reach_the_parser() {
        let cli = Cli::parse_from(["signal-advisor", "indicators", "5", "-1", "2"]);
        match cli.command {
            Commands::Indicators { input, .. } => assert_eq!(input.prices, vec!["5", "-1", "2"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
