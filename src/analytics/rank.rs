//! Ranking and drill-down

use super::{aggregate, sort_by, AggregationResult, Bucket, BucketKind, ReduceKind};
use crate::data::models::{Category, Measure};
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::Serialize;
use tracing::warn;

const POSITION: &str = "position";
const VALUE: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rank {
    /// Highest values
    Best,
    /// Lowest values
    Worst,
}

/// Keep the `n` highest or lowest buckets.
///
/// Buckets are sorted by value ascending; `Best` keeps the tail and `Worst`
/// the head, both still in ascending order. Buckets without a value are
/// not ranked.
pub fn top_n(result: &AggregationResult, n: usize, rank: Rank) -> Result<AggregationResult> {
    let ranked: Vec<&Bucket> = result.buckets.iter().filter(|b| b.value.is_some()).collect();

    let skipped = result.len() - ranked.len();
    if skipped > 0 {
        warn!("{} bucket(s) without a value left out of the ranking", skipped);
    }

    if n == 0 || n > ranked.len() {
        return Err(AppError::InvalidArgument(format!(
            "n must be between 1 and {}, got {}",
            ranked.len(),
            n
        )));
    }

    let table = DataFrame::new(vec![
        Series::new(POSITION, (0..ranked.len() as u32).collect::<Vec<u32>>()),
        Series::new(VALUE, ranked.iter().filter_map(|b| b.value).collect::<Vec<f64>>()),
    ])?;
    let sorted = sort_by(&table, VALUE)?;
    let kept = match rank {
        Rank::Best => sorted.tail(Some(n)),
        Rank::Worst => sorted.head(Some(n)),
    };

    let buckets = kept
        .column(POSITION)?
        .u32()?
        .into_iter()
        .flatten()
        .map(|position| ranked[position as usize].clone())
        .collect();

    Ok(AggregationResult {
        buckets,
        ..result.clone()
    })
}

/// Re-bucket the rows of one category value
pub fn drill_down(
    frame: &SalesFrame,
    category: Category,
    value: &str,
    bucket: BucketKind,
    reduce: ReduceKind,
    measure: Measure,
) -> Result<AggregationResult> {
    let selected = frame.filter_category(category, value)?;
    if selected.is_empty() {
        return Err(AppError::InvalidSelection(format!(
            "no rows with {} '{}'",
            category.label(),
            value
        )));
    }
    aggregate(&selected, bucket, reduce, measure, None)
}

/// Best or worst `n` product names inside one product group, by summed `measure`
pub fn rank_within(
    frame: &SalesFrame,
    group: &str,
    measure: Measure,
    n: usize,
    rank: Rank,
) -> Result<AggregationResult> {
    let by_name = drill_down(
        frame,
        Category::ProductGroup,
        group,
        BucketKind::Category(Category::ProductName),
        ReduceKind::Sum,
        measure,
    )?;
    top_n(&by_name, n, rank)
}
