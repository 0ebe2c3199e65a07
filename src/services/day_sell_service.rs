//! Day Sell Service
//!
//! Reports over the day-level export: whole columns, monthly sums and
//! averages, net sales, profit percentage and weekday breakdowns.

use crate::analytics::{aggregate, BucketKind, ReduceKind};
use crate::data::derive::with_measure;
use crate::data::models::Measure;
use crate::data::SalesFrame;
use crate::error::Result;
use crate::report::{from_aggregation, from_rows, ChartKind, ChartRequest, RowAxis};
use chrono::NaiveDate;
use tracing::info;

/// "For The Year 2018", or "For All Years" without a year filter
pub fn period_label(year: Option<i32>) -> String {
    match year {
        Some(year) => format!("For The Year {}", year),
        None => "For All Years".to_string(),
    }
}

/// Day sell reports
pub struct DaySellService;

impl DaySellService {
    /// Every row of one column; over dates for line/rel, grouped by month for box/bar
    pub fn entire_column(
        frame: &SalesFrame,
        measure: Measure,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("DaySellService::entire_column - {} ({})", measure, kind);
        let axis = match kind {
            ChartKind::Line | ChartKind::Rel => RowAxis::Date,
            ChartKind::Box | ChartKind::Bar => RowAxis::Month,
        };
        let title = format!("Total {} {}", measure, period_label(year));
        from_rows(kind, &Self::in_year(frame, year)?, axis, measure, &title)
    }

    /// One column summed or averaged per month
    pub fn monthly(
        frame: &SalesFrame,
        measure: Measure,
        reduce: ReduceKind,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("DaySellService::monthly - {} {:?}", measure, reduce);
        let frame = with_measure(frame, measure)?;
        let result = aggregate(&frame, BucketKind::Month, reduce, measure, year)?;
        let title = match (reduce, measure) {
            (ReduceKind::Sum, Measure::NetSales) => format!("Monthly Net Sales {}", period_label(year)),
            (ReduceKind::Mean, Measure::NetSales) => {
                format!("Monthly Average Net Sales {}", period_label(year))
            }
            (ReduceKind::Sum, _) => format!("Total {} (SUM) {}", measure, period_label(year)),
            (ReduceKind::Mean, _) => format!("Average {} {}", measure, period_label(year)),
        };
        Ok(from_aggregation(kind, &result, &title))
    }

    /// A derived metric per row, plotted against the month
    pub fn per_row(
        frame: &SalesFrame,
        measure: Measure,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("DaySellService::per_row - {}", measure);
        let frame = with_measure(frame, measure)?;
        let title = match measure {
            Measure::NetSalesPercentage => format!("Net Sales In Percentage {}", period_label(year)),
            _ => format!("{} {}", measure, period_label(year)),
        };
        from_rows(kind, &Self::in_year(&frame, year)?, RowAxis::Month, measure, &title)
    }

    /// One column between two dates, inclusive
    pub fn date_range(
        frame: &SalesFrame,
        measure: Measure,
        from: NaiveDate,
        to: NaiveDate,
        kind: ChartKind,
    ) -> Result<ChartRequest> {
        info!("DaySellService::date_range - {} {}..={}", measure, from, to);
        let selected = frame.filter_range(from, to)?;
        let title = format!("{} Data From {} to {}", measure, from, to);
        from_rows(kind, &selected, RowAxis::Date, measure, &title)
    }

    /// A column reduced per weekday, Monday first
    pub fn weekday(
        frame: &SalesFrame,
        measure: Measure,
        reduce: ReduceKind,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("DaySellService::weekday - {} {:?}", measure, reduce);
        let frame = with_measure(frame, measure)?;
        let result = aggregate(&frame, BucketKind::Weekday, reduce, measure, None)?;
        let title = match (measure, reduce) {
            (Measure::GrossSale, ReduceKind::Sum) => format!("Best Selling Day {}", period_label(year)),
            (Measure::GrossSale, ReduceKind::Mean) => {
                format!("Best Selling Day (Average) {}", period_label(year))
            }
            (Measure::Margin, _) => format!("Profit Earned Day Wise {}", period_label(year)),
            (Measure::ProfitPercentage, _) => {
                format!("Percentage Profit Earned Day Wise {}", period_label(year))
            }
            _ => format!("{} Day Wise {}", measure, period_label(year)),
        };
        Ok(from_aggregation(kind, &result, &title))
    }

    fn in_year(frame: &SalesFrame, year: Option<i32>) -> Result<SalesFrame> {
        match year {
            Some(year) => frame.filter_year(year),
            None => Ok(frame.clone()),
        }
    }
}
