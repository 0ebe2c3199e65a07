//! Aggregation over sales frames
//!
//! Buckets rows by time resolution or category and reduces one measure per
//! bucket with a polars group-by. NaN values are skipped by every reducer;
//! time and weekday results are reindexed onto the full key range, so a
//! bucket with nothing left to reduce carries the reducer's empty value.

pub mod rank;

pub use rank::{drill_down, rank_within, top_n, Rank};

use crate::data::models::{weekday_name, CalendarFields, Category, Measure, WEEKDAY_ORDER};
use crate::data::{SalesFrame, DAY_KEY, MONTH_KEY, WEEKDAY_KEY, YEAR_KEY};
use crate::error::{AppError, Result};
use chrono::{NaiveDate, Weekday};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::debug;

const KEY: &str = "key";
const VALUE: &str = "value";

/// How rows are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BucketKind {
    Day,
    Month,
    Year,
    Weekday,
    Category(Category),
}

impl BucketKind {
    pub fn is_time(&self) -> bool {
        matches!(self, BucketKind::Day | BucketKind::Month | BucketKind::Year)
    }

    /// Axis label for the bucket key
    pub fn label(&self) -> &'static str {
        match self {
            BucketKind::Day => "Date",
            BucketKind::Month => "Month",
            BucketKind::Year => "Year",
            BucketKind::Weekday => "Day of Week",
            BucketKind::Category(category) => category.label(),
        }
    }

    /// Frame column holding the group key
    fn key_column(&self) -> &'static str {
        match self {
            BucketKind::Day => DAY_KEY,
            BucketKind::Month => MONTH_KEY,
            BucketKind::Year => YEAR_KEY,
            BucketKind::Weekday => WEEKDAY_KEY,
            BucketKind::Category(category) => category.label(),
        }
    }
}

/// How a bucket's values are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReduceKind {
    Sum,
    Mean,
}

impl ReduceKind {
    /// Value of a bucket with no rows
    pub fn empty_value(&self) -> Option<f64> {
        match self {
            ReduceKind::Sum => Some(0.0),
            ReduceKind::Mean => None,
        }
    }

    fn expr(&self) -> Expr {
        match self {
            ReduceKind::Sum => col(VALUE).sum(),
            ReduceKind::Mean => col(VALUE).mean(),
        }
    }
}

/// Key of one bucket, kept as a plain field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
    Weekday(Weekday),
    Category(String),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            BucketKey::Year(year) => write!(f, "{}", year),
            BucketKey::Weekday(day) => f.write_str(weekday_name(*day)),
            BucketKey::Category(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: BucketKey,
    /// `None` when the bucket had nothing to reduce and the reducer has no empty value
    pub value: Option<f64>,
}

/// Ordered (bucket, value) pairs for one measure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub measure: Measure,
    pub bucket_kind: BucketKind,
    pub reduce_kind: ReduceKind,
    pub buckets: Vec<Bucket>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.key.to_string()).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.buckets.iter().map(|b| b.value).collect()
    }
}

/// Group `frame` by `bucket` and reduce `measure` within each group.
///
/// `year` restricts time buckets to one calendar year; it has no effect on
/// weekday or category buckets.
pub fn aggregate(
    frame: &SalesFrame,
    bucket: BucketKind,
    reduce: ReduceKind,
    measure: Measure,
    year: Option<i32>,
) -> Result<AggregationResult> {
    let values: Vec<Option<f64>> = frame
        .column(measure)?
        .iter()
        .map(|v| (!v.is_nan()).then_some(*v))
        .collect();
    let key_column = bucket.key_column();
    let keys = frame
        .table()
        .column(key_column)
        .map_err(|_| AppError::MissingColumn(key_column.to_string()))?;

    let input = DataFrame::new(vec![
        keys.clone().with_name(KEY),
        frame.table().column(YEAR_KEY)?.clone(),
        Series::new(VALUE, values),
    ])?;

    let mut rows = input.lazy();
    if let (true, Some(year)) = (bucket.is_time(), year) {
        rows = rows.filter(col(YEAR_KEY).eq(lit(year)));
    }
    let grouped = rows.group_by([col(KEY)]).agg([reduce.expr()]).collect()?;

    let table = match bucket {
        BucketKind::Category(_) => grouped,
        BucketKind::Weekday => reindex(grouped, (0..7).collect())?,
        _ => {
            let present = grouped.column(KEY)?.i32()?;
            match (present.min(), present.max()) {
                (Some(first), Some(last)) => reindex(grouped, (first..=last).collect())?,
                _ => grouped,
            }
        }
    };
    let table = sort_by(&table, KEY)?;

    let reduced = table.column(VALUE)?.f64()?;
    let buckets = match bucket {
        BucketKind::Category(_) => table
            .column(KEY)?
            .str()?
            .into_iter()
            .zip(reduced.into_iter())
            .map(|(key, value)| Bucket {
                key: BucketKey::Category(key.unwrap_or_default().to_string()),
                value: value.or(reduce.empty_value()),
            })
            .collect(),
        _ => table
            .column(KEY)?
            .i32()?
            .into_iter()
            .zip(reduced.into_iter())
            .map(|(key, value)| {
                Ok(Bucket {
                    key: calendar_key(bucket, key)?,
                    value: value.or(reduce.empty_value()),
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    debug!(
        "Aggregated {} by {:?} ({:?}) into {} buckets",
        measure,
        bucket,
        reduce,
        buckets.len()
    );

    Ok(AggregationResult {
        measure,
        bucket_kind: bucket,
        reduce_kind: reduce,
        buckets,
    })
}

/// Left-join `grouped` onto every key in `keys`; absent keys get a null value
fn reindex(grouped: DataFrame, keys: Vec<i32>) -> Result<DataFrame> {
    let index = DataFrame::new(vec![Series::new(KEY, keys)])?;
    Ok(index
        .lazy()
        .join(
            grouped.lazy(),
            [col(KEY)],
            [col(KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?)
}

/// Rows of `table` in ascending order of `column`, ties kept in place
pub(crate) fn sort_by(table: &DataFrame, column: &str) -> Result<DataFrame> {
    let order = table.column(column)?.arg_sort(SortOptions {
        maintain_order: true,
        ..Default::default()
    });
    Ok(table.take(&order)?)
}

fn calendar_key(bucket: BucketKind, key: Option<i32>) -> Result<BucketKey> {
    let key = key.ok_or_else(|| {
        AppError::InvalidArgument(format!("{} bucket without a key", bucket.label()))
    })?;
    let decoded = match bucket {
        BucketKind::Day => NaiveDate::from_num_days_from_ce_opt(key).map(BucketKey::Day),
        BucketKind::Month => {
            let (year, month) = CalendarFields::from_month_index(key);
            Some(BucketKey::Month { year, month })
        }
        BucketKind::Year => Some(BucketKey::Year(key)),
        BucketKind::Weekday => usize::try_from(key)
            .ok()
            .and_then(|i| WEEKDAY_ORDER.get(i))
            .map(|day| BucketKey::Weekday(*day)),
        BucketKind::Category(_) => None,
    };
    decoded.ok_or_else(|| {
        AppError::InvalidArgument(format!("{} is not a valid {} key", key, bucket.label()))
    })
}
