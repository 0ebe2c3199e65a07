//! Application configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `AGATA__*`
//! environment variables. Command line flags are applied on top by `run()`.

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "agata";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ANALYSIS_YEAR: i64 = 2018;
const DEFAULT_TEST_RATIO: f64 = 0.3;
const DEFAULT_SEED: i64 = 2;

/// Field separator of the source exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterSetting {
    /// Sniff the header line
    Auto,
    Comma,
    Semicolon,
}

/// Text encoding of the source exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingSetting {
    #[serde(alias = "utf-8")]
    Utf8,
    #[serde(alias = "iso-8859-1")]
    Latin1,
}

/// Where rendered charts go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartOutput {
    Terminal,
    Json,
    Both,
}

/// Per-dataset source settings
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub delimiter: DelimiterSetting,
    pub encoding: EncodingSetting,
    pub has_header: bool,
}

/// Chart output settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub output: ChartOutput,
    pub output_dir: PathBuf,
    /// Width in characters of the longest terminal bar
    pub width: usize,
}

/// Cleanup utility settings
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Directory that relative file names are resolved against
    pub data_dir: PathBuf,
    /// Copy the file to `<name>.bak` before rewriting it
    pub backup: bool,
}

/// Train/test split settings for the regression menus
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    pub test_ratio: f64,
    pub seed: u64,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    /// Year the time-bucketed reports are restricted to; `None` uses every row.
    /// Written as `analysis_year = 0` in a file or `AGATA__ANALYSIS_YEAR=0`.
    pub analysis_year: Option<i32>,
    pub day_sell: SourceConfig,
    pub product_sales: SourceConfig,
    pub charts: ChartConfig,
    pub cleanup: CleanupConfig,
    pub prediction: PredictionConfig,
}

impl AppConfig {
    /// Load configuration from defaults, the optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("analysis_year", DEFAULT_ANALYSIS_YEAR)?
            .set_default("day_sell.path", "csv/Day_sell_24_12_18.csv")?
            .set_default("day_sell.delimiter", "auto")?
            .set_default("day_sell.encoding", "utf8")?
            .set_default("day_sell.has_header", true)?
            .set_default("product_sales.path", "csv/SELL_1.csv")?
            .set_default("product_sales.delimiter", "auto")?
            .set_default("product_sales.encoding", "latin1")?
            .set_default("product_sales.has_header", true)?
            .set_default("charts.output", "terminal")?
            .set_default("charts.output_dir", "charts")?
            .set_default("charts.width", 50)?
            .set_default("cleanup.data_dir", "csv")?
            .set_default("cleanup.backup", false)?
            .set_default("prediction.test_ratio", DEFAULT_TEST_RATIO)?
            .set_default("prediction.seed", DEFAULT_SEED)?;

        builder = match file {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder.add_source(File::from(path).required(true))
            }
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let config = builder
            .add_source(Environment::with_prefix("AGATA").separator("__"))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        if app_config.analysis_year == Some(0) {
            app_config.analysis_year = None;
        }
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.prediction.test_ratio > 0.0 && self.prediction.test_ratio < 1.0) {
            return Err(AppError::InvalidArgument(format!(
                "prediction.test_ratio must be between 0 and 1, got {}",
                self.prediction.test_ratio
            )));
        }
        if self.charts.width == 0 {
            return Err(AppError::InvalidArgument(
                "charts.width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
