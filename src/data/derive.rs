//! Derived metrics
//!
//! Each metric is a fixed arithmetic expression over canonical columns.
//! A zero divisor yields NaN for that row; reductions skip NaN.

use super::models::Measure;
use super::{NumericColumn, SalesFrame};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Metrics that can be derived from canonical columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// gross sale - tax
    NetSales,
    /// (gross sale - tax) / gross sale * 100
    NetSalesPercentage,
    /// margin / net purchase * 100
    ProfitPercentage,
    /// net sale value - net purchase value
    NetProfitValue,
    /// (net sale value - net purchase value) / net purchase value * 100
    NetProfitPercentage,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::NetSales,
        Metric::NetSalesPercentage,
        Metric::ProfitPercentage,
        Metric::NetProfitValue,
        Metric::NetProfitPercentage,
    ];

    /// Metric that produces `measure`, if it is a derived column
    pub fn for_measure(measure: Measure) -> Option<Metric> {
        Self::ALL.into_iter().find(|m| m.measure() == measure)
    }

    /// Column the metric is written to
    pub fn measure(&self) -> Measure {
        match self {
            Metric::NetSales => Measure::NetSales,
            Metric::NetSalesPercentage => Measure::NetSalesPercentage,
            Metric::ProfitPercentage => Measure::ProfitPercentage,
            Metric::NetProfitValue => Measure::NetProfitValue,
            Metric::NetProfitPercentage => Measure::NetProfitPercentage,
        }
    }

    /// Canonical columns the expression reads
    pub fn inputs(&self) -> &'static [Measure] {
        match self {
            Metric::NetSales | Metric::NetSalesPercentage => &[Measure::GrossSale, Measure::Tax],
            Metric::ProfitPercentage => &[Measure::Margin, Measure::NetPurchase],
            Metric::NetProfitValue | Metric::NetProfitPercentage => {
                &[Measure::NetSaleValue, Measure::NetPurchaseValue]
            }
        }
    }

    /// Evaluate the expression for one row; `a` and `b` follow `inputs()`
    pub fn evaluate(&self, a: f64, b: f64) -> f64 {
        match self {
            Metric::NetSales | Metric::NetProfitValue => a - b,
            Metric::NetSalesPercentage => ratio(a - b, a),
            Metric::ProfitPercentage => ratio(a, b),
            Metric::NetProfitPercentage => ratio(a - b, b),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator * 100.0
    }
}

/// Return a copy of `frame` with `metric` computed into its own column.
///
/// The input frame is never modified; on error nothing has been applied.
pub fn derive(frame: &SalesFrame, metric: Metric) -> Result<SalesFrame> {
    let [first, second] = metric.inputs() else {
        return Err(AppError::InvalidArgument(format!(
            "{:?} does not take two inputs",
            metric
        )));
    };
    let a = frame.column(*first)?;
    let b = frame.column(*second)?;

    let values: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| metric.evaluate(x, y))
        .collect();

    let undefined = values.iter().filter(|v| v.is_nan()).count();
    if undefined > 0 {
        tracing::warn!(
            "{} row(s) of {} are undefined (zero divisor)",
            undefined,
            metric.measure()
        );
    }

    let mut derived = frame.clone();
    derived.put_column(NumericColumn {
        measure: metric.measure(),
        values,
    })?;
    Ok(derived)
}

/// Borrow `frame` when it already answers `measure`, otherwise derive it
pub fn with_measure(frame: &SalesFrame, measure: Measure) -> Result<Cow<'_, SalesFrame>> {
    match Metric::for_measure(measure) {
        Some(metric) => Ok(Cow::Owned(derive(frame, metric)?)),
        None => Ok(Cow::Borrowed(frame)),
    }
}
