//! Services Layer
//!
//! Report and forecast logic shared by the console menus and the
//! integration tests. Services take loaded frames and plain arguments and
//! return chart requests or forecasts; they never prompt or render.
//!
//! # Architecture
//!
//! ```text
//! Console menus ──> Services ──> Analytics / Metric Deriver ──> SalesFrame
//!                      │
//!                      └──> Report builders ──> ChartRequest
//! ```
//!
//! # Services
//!
//! - `DaySellService` - Day-level column, monthly and weekday reports
//! - `ProductSalesService` - Product group quantities, rankings, profit reports
//! - `PredictionService` - Tax and purchase/sale regression forecasts
//! - `CleanupService` - Separator normalization of raw exports

pub mod cleanup_service;
pub mod day_sell_service;
pub mod prediction_service;
pub mod product_sales_service;

pub use cleanup_service::{normalize_separators, CleanupService};
pub use day_sell_service::DaySellService;
pub use prediction_service::{PredictionService, PurchaseSaleForecast, TaxForecast};
pub use product_sales_service::ProductSalesService;
