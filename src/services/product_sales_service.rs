//! Product Sales Service
//!
//! Reports over the product-level export: per-group quantities, group and
//! product rankings, monthly profit and weekday breakdowns.

use super::day_sell_service::period_label;
use crate::analytics::{aggregate, drill_down, rank_within, top_n, BucketKind, Rank, ReduceKind};
use crate::data::derive::with_measure;
use crate::data::models::{Category, Measure};
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use crate::report::{from_aggregation, ChartKind, ChartRequest};
use tracing::info;

/// Product sales reports
pub struct ProductSalesService;

impl ProductSalesService {
    /// Product groups, sorted, for the selection prompt
    pub fn product_groups(frame: &SalesFrame) -> Result<Vec<String>> {
        frame.distinct(Category::ProductGroup)
    }

    /// Product names of one group, sorted
    pub fn group_products(frame: &SalesFrame, group: &str) -> Result<Vec<String>> {
        frame
            .filter_category(Category::ProductGroup, group)?
            .distinct(Category::ProductName)
    }

    /// Quantity sold of one group, by day or by month
    pub fn group_quantity(
        frame: &SalesFrame,
        group: &str,
        bucket: BucketKind,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("ProductSalesService::group_quantity - {} by {:?}", group, bucket);
        if !matches!(bucket, BucketKind::Day | BucketKind::Month) {
            return Err(AppError::InvalidArgument(format!(
                "group quantity is viewed by day or month, not {:?}",
                bucket
            )));
        }
        let frame = match year {
            Some(year) => frame.filter_year(year)?,
            None => frame.clone(),
        };
        let result = drill_down(
            &frame,
            Category::ProductGroup,
            group,
            bucket,
            ReduceKind::Sum,
            Measure::ProductQuantity,
        )?;
        let title = format!("Sales Of {} {}", group, period_label(year));
        Ok(from_aggregation(kind, &result, &title))
    }

    /// Best or least `n` product groups by total net sale value, as a bar chart
    pub fn ranked_groups(
        frame: &SalesFrame,
        n: usize,
        rank: Rank,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("ProductSalesService::ranked_groups - {:?} {}", rank, n);
        let totals = aggregate(
            frame,
            BucketKind::Category(Category::ProductGroup),
            ReduceKind::Sum,
            Measure::NetSaleValue,
            None,
        )?;
        let ranked = top_n(&totals, n, rank)?;
        let title = match rank {
            Rank::Best => format!("Best Performing Category Of Products {}", period_label(year)),
            Rank::Worst => format!("Least Performing Category Of Products {}", period_label(year)),
        };
        Ok(from_aggregation(ChartKind::Bar, &ranked, &title))
    }

    /// Net profit value or percentage summed per month
    pub fn monthly_profit(
        frame: &SalesFrame,
        measure: Measure,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("ProductSalesService::monthly_profit - {}", measure);
        let frame = with_measure(frame, measure)?;
        let result = aggregate(&frame, BucketKind::Month, ReduceKind::Sum, measure, year)?;
        let title = match measure {
            Measure::NetProfitPercentage => {
                format!("Monthly Profit Percentage Of Sales {}", period_label(year))
            }
            _ => format!("Monthly Sales Profit {}", period_label(year)),
        };
        Ok(from_aggregation(kind, &result, &title))
    }

    /// Best or worst `n` products of one group by total net sale value, as a bar chart
    pub fn ranked_products(
        frame: &SalesFrame,
        group: &str,
        n: usize,
        rank: Rank,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("ProductSalesService::ranked_products - {} {:?} {}", group, rank, n);
        let ranked = rank_within(frame, group, Measure::NetSaleValue, n, rank)?;
        let label = match rank {
            Rank::Best => "Best",
            Rank::Worst => "Worst",
        };
        let title = format!(
            "{} Performing Products {} In The Category {}",
            label,
            period_label(year),
            group
        );
        Ok(from_aggregation(ChartKind::Bar, &ranked, &title))
    }

    /// A column reduced per weekday, Monday first
    pub fn weekday(
        frame: &SalesFrame,
        measure: Measure,
        reduce: ReduceKind,
        kind: ChartKind,
        year: Option<i32>,
    ) -> Result<ChartRequest> {
        info!("ProductSalesService::weekday - {} {:?}", measure, reduce);
        let frame = with_measure(frame, measure)?;
        let result = aggregate(&frame, BucketKind::Weekday, reduce, measure, None)?;
        let title = match (measure, reduce) {
            (Measure::NetSaleValue, ReduceKind::Sum) => {
                format!("Total Sale Day Wise {}", period_label(year))
            }
            (Measure::NetSaleValue, ReduceKind::Mean) => {
                format!("Average Total Sale Day Wise {}", period_label(year))
            }
            _ => format!("{} Day Wise {}", measure, period_label(year)),
        };
        Ok(from_aggregation(kind, &result, &title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::*;

    fn frame() -> SalesFrame {
        product_frame(&[
            (date(2018, 1, 1), "Wine", "Merlot", 2.0, 80.0, 100.0),
            (date(2018, 1, 3), "Wine", "Rioja", 1.0, 30.0, 45.0),
            (date(2018, 2, 1), "Beer", "Lager", 6.0, 10.0, 12.0),
            (date(2018, 3, 1), "Wine", "Merlot", 3.0, 0.0, 20.0),
            (date(2018, 3, 2), "Juice", "Apple", 4.0, 5.0, 4.0),
        ])
    }

    #[test]
    fn test_group_quantity_by_month() {
        let request = ProductSalesService::group_quantity(
            &frame(),
            "Wine",
            BucketKind::Month,
            ChartKind::Line,
            Some(2018),
        )
        .unwrap();
        assert_eq!(request.title, "Sales Of Wine For The Year 2018");
        let values: Vec<_> = request.points.iter().map(|p| p.y).collect();
        assert_eq!(values, vec![Some(3.0), Some(0.0), Some(3.0)]);
    }

    #[test]
    fn test_group_quantity_rejects_weekday() {
        let err = ProductSalesService::group_quantity(
            &frame(),
            "Wine",
            BucketKind::Weekday,
            ChartKind::Line,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_ranked_groups_is_bar() {
        let request = ProductSalesService::ranked_groups(&frame(), 2, Rank::Best, Some(2018)).unwrap();
        assert_eq!(request.kind, ChartKind::Bar);
        let groups: Vec<_> = request.points.iter().map(|p| p.x.as_str()).collect();
        assert_eq!(groups, vec!["Beer", "Wine"]);

        let least = ProductSalesService::ranked_groups(&frame(), 1, Rank::Worst, None).unwrap();
        assert_eq!(least.points[0].x, "Juice");
    }

    #[test]
    fn test_monthly_profit_percentage_skips_undefined() {
        let request = ProductSalesService::monthly_profit(
            &frame(),
            Measure::NetProfitPercentage,
            ChartKind::Bar,
            None,
        )
        .unwrap();
        // January: 25% + 50%; March: Merlot undefined, Apple -20%
        assert_eq!(request.points[0].y, Some(75.0));
        assert_eq!(request.points[2].y, Some(-20.0));
    }

    #[test]
    fn test_ranked_products_within_group() {
        let request =
            ProductSalesService::ranked_products(&frame(), "Wine", 1, Rank::Worst, Some(2018)).unwrap();
        assert_eq!(request.points[0].x, "Rioja");
        assert!(request.title.ends_with("In The Category Wine"));
    }

    #[test]
    fn test_weekday_net_profit_value() {
        let request = ProductSalesService::weekday(
            &frame(),
            Measure::NetProfitValue,
            ReduceKind::Sum,
            ChartKind::Bar,
            None,
        )
        .unwrap();
        assert_eq!(request.points.len(), 7);
        // 2018-01-01 is the only Monday: Merlot +20
        assert_eq!(request.points[0].y, Some(20.0));
    }
}
