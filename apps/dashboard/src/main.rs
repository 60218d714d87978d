use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{config::normalize_base_url, load_settings, SyncState};
use shared::{
    category::{classify, color_encoding, Category},
    domain::AqiInsight,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Provider base URL; overrides aqi.toml and the environment.
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// City loaded on startup.
    #[arg(long)]
    city: Option<String>,
    /// Further cities to switch to after startup, requested back to back.
    #[arg(long = "then")]
    then: Vec<String>,
    /// Print the raw snapshot as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load provider settings")?;
    if let Some(url) = &args.api_base_url {
        settings.api_base_url = normalize_base_url(url)?;
    }
    if let Some(ms) = args.timeout_ms {
        settings.timeout = Duration::from_millis(ms);
    }
    let default_city = args
        .city
        .clone()
        .unwrap_or_else(|| settings.default_city.clone());

    let controller = client_core::connect(&settings).context("failed to build AQI client")?;
    controller.initialize(&default_city).await;

    let pending: Vec<_> = args
        .then
        .iter()
        .map(|city| controller.refresh(city.clone()))
        .collect();
    for handle in pending {
        handle.await.context("refresh task panicked")?;
    }

    let state = controller.snapshot();
    controller.teardown();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        render(&state);
    }
    Ok(())
}

fn render(state: &SyncState) {
    if !state.cities.is_empty() {
        let names: Vec<&str> = state.cities.iter().map(|c| c.city.as_str()).collect();
        println!("Cities: {}", names.join(", "));
    }
    if let Some(message) = &state.error {
        eprintln!("Error: {message}");
        if let Some(city) = state.selected_city() {
            eprintln!("Retry with --city \"{city}\"");
        }
    }
    if let Some(insight) = &state.insight {
        render_insight(insight);
    }
}

fn render_insight(insight: &AqiInsight) {
    let category = insight.effective_category();
    let aqi = insight
        .aqi
        .map(|aqi| aqi.to_string())
        .unwrap_or_else(|| "--".to_string());

    println!();
    println!("{}, {}", insight.city, insight.country);
    println!("  AQI {aqi}  {}", paint(category, category.label()));
    if let Some(dominant) = &insight.dominant_pollutant {
        println!("  Dominant pollutant: {dominant}");
    }
    if let Some(advice) = &insight.advice {
        println!("  {advice}");
    }
    println!("  Updated {}", format_timestamp(insight));
    if insight.is_fallback() {
        println!("  (live data unavailable)");
    }

    if !insight.pollutants.is_empty() {
        println!();
        for reading in &insight.pollutants {
            let value = match (reading.value, reading.unit.as_deref()) {
                (Some(value), Some(unit)) => format!("{value:.1} {unit}"),
                (Some(value), None) => format!("{value:.1}"),
                (None, _) => "n/a".to_string(),
            };
            let sub_index = reading
                .aqi
                .map(|aqi| aqi.to_string())
                .unwrap_or_else(|| "--".to_string());
            println!("  {:<18} {:>14}  AQI {sub_index}", reading.name, value);
        }
    }

    if !insight.trend.is_empty() {
        println!();
        println!("  Last {} hours", insight.trend.len());
        for point in &insight.trend {
            match point.aqi {
                Some(aqi) => {
                    let band = classify(aqi);
                    println!("  {} {:>4} {}", point.time, aqi, paint(band, &trend_bar(aqi)));
                }
                None => println!("  {}   --", point.time),
            }
        }
    }
}

/// Widest bar drawn; values past it are already deep in `Hazardous`.
const TREND_BAR_CEILING: i64 = 500;

fn trend_bar(aqi: i64) -> String {
    "#".repeat((aqi.clamp(0, TREND_BAR_CEILING) / 10) as usize)
}

fn paint(category: Category, text: &str) -> String {
    let (r, g, b) = color_encoding(Some(category)).rgb();
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

fn format_timestamp(insight: &AqiInsight) -> String {
    insight
        .parsed_timestamp()
        .map(|ts| {
            ts.with_timezone(&chrono::Local)
                .format("%b %-d, %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
