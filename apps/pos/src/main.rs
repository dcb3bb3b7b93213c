//! # Pakwan POS Terminal
//!
//! Command-line front end over [`pakwan_pos`]. Each invocation starts the
//! terminal (remote → cache → bundled), runs one command, prints the result
//! as JSON on stdout and waits for the remote writes it queued.
//!
//! ## Usage
//! ```text
//! pakwan-pos status
//! pakwan-pos sell -i chicken_biryani -i plain_naan --custom mithai=600 --payment card
//! pakwan-pos sales --period week
//! pakwan-pos return ORD-012
//! pakwan-pos month 2026-09
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the default filter.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pakwan_core::{Money, MonthKey, Period};
use pakwan_pos::commands;
use pakwan_pos::state::ConfigState;
use pakwan_pos::{ApiError, PosApp};
use pakwan_sync::{LoadReport, SyncConfig, SyncMode};

#[derive(Debug, Parser)]
#[command(name = "pakwan-pos", version, about = "Pakwan restaurant point of sale")]
struct Cli {
    /// Path to pos.toml
    #[arg(long, env = "PAKWAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Skip the remote store for this run
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Where the dataset came from and how many orders it holds
    Status,

    /// Show categories, products, payment methods and order types
    Catalog,

    /// Ring up a sale and confirm it
    Sell {
        /// Product id; repeat to add more lines or raise a quantity
        #[arg(short, long = "item", value_name = "PRODUCT_ID")]
        items: Vec<String>,

        /// Open-priced line as CATEGORY=PRICE
        #[arg(long = "custom", value_name = "CATEGORY=PRICE")]
        custom: Vec<String>,

        #[arg(long, default_value = "cash")]
        payment: String,

        #[arg(long = "type", default_value = "dinein")]
        order_type: String,
    },

    /// Sales summary for a period
    Sales {
        #[arg(long, default_value = "today")]
        period: Period,
    },

    /// Item, category and payment breakdowns for a period
    Analytics {
        #[arg(long, default_value = "today")]
        period: Period,
    },

    /// Mark an order as returned
    Return { order_id: String },

    /// Mark an order as deleted
    Delete { order_id: String },

    /// Drop repeated order ids, keeping the last record of each
    CleanupDuplicates,

    /// Replace the dataset with an exported JSON file
    Import { path: PathBuf },

    /// Load one month partition without touching the working dataset
    Month { month: MonthKey },

    /// Pull store and settings from the remote store
    RefreshSettings,

    /// Write the current dataset to the cache and the remote store
    Resume,

    /// Forget the cached dataset
    ClearCache,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    report: LoadReport,
    store_name: String,
    orders: usize,
    next_order_number: u64,
    remote_enabled: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut sync_config = match cli.config {
        Some(path) => SyncConfig::load(Some(path)).context("loading sync config")?,
        None => SyncConfig::load_or_default(None),
    };
    if cli.offline {
        sync_config.mode = SyncMode::Offline;
    }

    let (app, report) = PosApp::open(&sync_config, ConfigState::from_env())
        .await
        .context("starting terminal")?;

    let result = run(&app, report, cli.command).await;

    let summary = app.sync.flush().await;
    if !summary.is_complete() {
        warn!(failed = summary.failed, "Some remote writes did not complete");
    }

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            Err(err.into())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pakwan=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

async fn run(app: &PosApp, report: LoadReport, command: Command) -> Result<serde_json::Value, ApiError> {
    let now = Utc::now();

    let value = match command {
        Command::Status => {
            let (store_name, orders, next_order_number) = app.dataset.with_dataset(|d| {
                (d.store.name.clone(), d.orders.len(), d.settings.next_order_number)
            });
            to_json(&StatusResponse {
                report,
                store_name,
                orders,
                next_order_number,
                remote_enabled: app.sync.has_remote(),
            })?
        }
        Command::Catalog => to_json(&commands::get_catalog(&app.dataset))?,
        Command::Sell { items, custom, payment, order_type } => {
            for product_id in &items {
                commands::add_to_cart(&app.dataset, &app.cart, product_id)?;
            }
            for line in &custom {
                let (category_id, price) = parse_custom_line(line)?;
                commands::add_custom_line(&app.dataset, &app.cart, &category_id, price)?;
            }

            let order = commands::checkout(
                &app.dataset,
                &app.cart,
                &app.checkout,
                &app.sync,
                &payment,
                &order_type,
                now,
            )
            .await?;
            info!(order_id = %order.id, total = %order.total, "Order staged");

            to_json(&commands::confirm_order(&app.dataset, &app.cart, &app.checkout, &app.sync).await?)?
        }
        Command::Sales { period } => {
            to_json(&commands::sales_summary(&app.dataset, &app.config, period, now))?
        }
        Command::Analytics { period } => {
            to_json(&commands::analytics(&app.dataset, &app.config, period, now))?
        }
        Command::Return { order_id } => {
            to_json(&commands::return_order(&app.dataset, &app.sync, &order_id, now).await?)?
        }
        Command::Delete { order_id } => {
            to_json(&commands::delete_order(&app.dataset, &app.sync, &order_id, now).await?)?
        }
        Command::CleanupDuplicates => {
            to_json(&commands::cleanup_duplicates(&app.dataset, &app.sync).await)?
        }
        Command::Import { path } => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                ApiError::validation(format!("Cannot read {}: {}", path.display(), e))
            })?;
            to_json(&commands::import_dataset(&app.dataset, &app.checkout, &app.sync, &text).await?)?
        }
        Command::Month { month } => to_json(&commands::load_month(&app.sync, month).await)?,
        Command::RefreshSettings => {
            let updated = commands::refresh_settings(&app.dataset, &app.sync).await?;
            serde_json::json!({ "updated": updated })
        }
        Command::Resume => {
            let saved = commands::resume(&app.dataset, &app.sync).await;
            serde_json::json!({ "savedLocally": saved })
        }
        Command::ClearCache => {
            let cleared = commands::clear_local_cache(&app.sync).await?;
            serde_json::json!({ "cleared": cleared })
        }
    };

    Ok(value)
}

/// Parses `CATEGORY=PRICE` into a category id and a whole-rupee price.
fn parse_custom_line(line: &str) -> Result<(String, Money), ApiError> {
    let (category_id, price) = line
        .split_once('=')
        .ok_or_else(|| ApiError::validation(format!("Expected CATEGORY=PRICE, got '{}'", line)))?;

    let units: i64 = price
        .trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid price '{}'", price)))?;

    Ok((category_id.trim().to_string(), Money::from_units(units)))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_line() {
        let (category, price) = parse_custom_line("mithai=600").unwrap();
        assert_eq!(category, "mithai");
        assert_eq!(price, Money::from_units(600));

        assert!(parse_custom_line("mithai").is_err());
        assert!(parse_custom_line("mithai=six hundred").is_err());
    }

    #[test]
    fn test_cli_parses_sell() {
        let cli = Cli::try_parse_from([
            "pakwan-pos", "sell", "-i", "chicken_biryani", "-i", "plain_naan", "--custom", "mithai=600",
            "--payment", "card",
        ])
        .unwrap();

        match cli.command {
            Command::Sell { items, custom, payment, order_type } => {
                assert_eq!(items, vec!["chicken_biryani", "plain_naan"]);
                assert_eq!(custom, vec!["mithai=600"]);
                assert_eq!(payment, "card");
                assert_eq!(order_type, "dinein");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_period_and_month() {
        assert!(Cli::try_parse_from(["pakwan-pos", "sales", "--period", "fortnight"]).is_err());
        assert!(Cli::try_parse_from(["pakwan-pos", "month", "2026-13"]).is_err());

        let cli = Cli::try_parse_from(["pakwan-pos", "month", "2026-09"]).unwrap();
        assert!(matches!(cli.command, Command::Month { .. }));
    }
}
