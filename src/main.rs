use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cryptofolio::app::{render_allocation, render_summary, App};
use cryptofolio::config::{default_config_path, ResolvedConfig};
use cryptofolio::duration::format_duration;
use cryptofolio::market_data::HistoryRange;
use cryptofolio::models::NewPurchase;

fn parse_range_arg(s: &str) -> Result<HistoryRange, String> {
    HistoryRange::parse(s).map_err(|e| e.to_string())
}

fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    Decimal::from_str(s).map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "cryptofolio")]
#[command(about = "Crypto portfolio tracker")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Emit machine-readable JSON instead of tables
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the portfolio summary with current prices
    Summary,
    /// Record a purchase (merges into an existing position)
    Add {
        /// Asset id, e.g. "bitcoin"
        asset_id: String,
        /// Amount purchased
        #[arg(value_parser = parse_decimal_arg)]
        amount: Decimal,
        /// Price paid per unit, in the quote currency
        #[arg(value_parser = parse_decimal_arg)]
        price: Decimal,
        /// Human-readable name; defaults to the asset id
        #[arg(long)]
        name: Option<String>,
        /// Ticker symbol; defaults to the asset id
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Remove a position from the portfolio
    Remove {
        /// Asset id, e.g. "bitcoin"
        asset_id: String,
    },
    /// Show the allocation breakdown (top positions plus "Others")
    Allocation,
    /// Show the price history for one asset
    History {
        /// Asset id, e.g. "bitcoin"
        asset_id: String,
        /// History range: 1d, 7d, 30d, 90d or 1y
        #[arg(long, default_value = "7d", value_parser = parse_range_arg)]
        range: HistoryRange,
    },
    /// Re-fetch prices on an interval and print the summary each time
    Watch,
    /// Show current configuration
    Config,
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

async fn watch(app: &App) -> Result<()> {
    let interval = app.config().market.refresh_interval;
    info!(interval_secs = interval.as_secs(), "Starting watch mode");

    loop {
        let summary = app.summary().await?;
        println!("{}", render_summary(&summary, app.config()));

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();

    let cli = Cli::parse();

    let config = ResolvedConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;
    let app = App::new(config);

    match cli.command {
        Command::Summary => {
            let summary = app.summary().await?;
            if cli.json {
                print_json(&summary)?;
            } else {
                print!("{}", render_summary(&summary, app.config()));
            }
        }
        Command::Add {
            asset_id,
            amount,
            price,
            name,
            symbol,
        } => {
            let purchase = NewPurchase {
                name: name.unwrap_or_else(|| asset_id.clone()),
                symbol: symbol.unwrap_or_else(|| asset_id.clone()),
                asset_id,
                amount,
                unit_price: price,
            };
            let summary = app.add(&purchase).await?;
            if cli.json {
                print_json(&summary)?;
            } else {
                print!("{}", render_summary(&summary, app.config()));
            }
        }
        Command::Remove { asset_id } => {
            let summary = app.remove(&asset_id).await?;
            if cli.json {
                print_json(&summary)?;
            } else {
                print!("{}", render_summary(&summary, app.config()));
            }
        }
        Command::Allocation => {
            let allocation = app.allocation().await?;
            if cli.json {
                print_json(&allocation)?;
            } else {
                print!("{}", render_allocation(&allocation, app.config()));
            }
        }
        Command::History { asset_id, range } => {
            let history = app.history(&asset_id, range).await?;
            if cli.json {
                print_json(&history)?;
            } else {
                println!("{} ({})", history.asset_id, history.range);
                for point in &history.points {
                    println!("{:<28} {}", point.timestamp, point.price);
                }
            }
        }
        Command::Watch => watch(&app).await?,
        Command::Config => {
            println!("Config file: {}", cli.config.display());
            println!("Data directory: {}", app.config().data_dir.display());
            println!("Quote currency: {}", app.config().quote_currency);
            println!("Top coins: {}", app.config().market.top_coins);
            println!(
                "Refresh interval: {}",
                format_duration(app.config().market.refresh_interval)
            );
        }
    }

    Ok(())
}
