//! Agata Retail - Sales Analytics Console
//!
//! Interactive menus over the day-level and product-level sales exports:
//! derived metrics, time and category aggregation, chart rendering and
//! regression forecasts, plus a separator cleanup utility.

pub mod analytics;
pub mod commands;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod ml;
pub mod report;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crate::config::{AppConfig, ChartOutput};
use crate::console::Console;
use crate::state::Session;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "agata-retail", about = "Agata Retail sales analytics", version)]
struct Cli {
    /// Configuration file (defaults to ./agata.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where charts are rendered
    #[arg(long, global = true, value_enum)]
    charts: Option<ChartOutput>,

    /// Report on every year instead of the configured analysis year
    #[arg(long, global = true)]
    all_years: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Day-level sales menu
    DaySell,
    /// Product-level sales menu
    ProductSales,
    /// Separator cleanup utility
    Clean,
    /// Predict tax and profit from net purchase and gross sale
    PredictTax,
    /// Predict net purchase and gross sale from tax and margin
    PredictPurchaseSale,
}

/// Command-line flags take precedence over file and environment settings
fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(output) = cli.charts {
        config.charts.output = output;
    }
    if cli.all_years {
        config.analysis_year = None;
    }
}

/// Parse the command line, load configuration and run the selected menu
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    apply_overrides(&cli, &mut config);

    // Initialize tracing/logging; stderr keeps the menus on stdout readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("agata_retail={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::info!("Starting Agata Retail...");

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    let mut renderer = report::renderer_for(&config.charts);
    let mut session = Session::new(config);

    match cli.command {
        Command::DaySell => commands::day_sell::run(&mut session, &mut console, renderer.as_mut())?,
        Command::ProductSales => {
            commands::product_sales::run(&mut session, &mut console, renderer.as_mut())?
        }
        Command::Clean => commands::cleanup::run(&session.config().cleanup, &mut console)?,
        Command::PredictTax => commands::day_sell::predict_tax(&session, &mut console)
            .context("tax prediction failed")?,
        Command::PredictPurchaseSale => {
            commands::day_sell::predict_purchase_sale(&session, &mut console)
                .context("purchase and sale prediction failed")?
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
