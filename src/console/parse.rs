//! Parsers for console input
//!
//! Each parser turns one line into a value or a re-promptable error.

use crate::error::{AppError, Result};
use crate::report::ChartKind;
use chrono::NaiveDate;

/// 1-based menu entry in `1..=max`, returned 0-based
pub fn parse_menu_choice(input: &str, max: usize) -> Result<usize> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n - 1),
        _ => Err(AppError::InvalidSelection(format!(
            "'{}' is not a choice between 1 and {}",
            input, max
        ))),
    }
}

/// `yyyy-mm-dd`
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidArgument(format!("'{}' is not a date in yyyy-mm-dd form", input))
    })
}

/// Ordered pair of dates
pub fn parse_date_range(from: &str, to: &str) -> Result<(NaiveDate, NaiveDate)> {
    let (from, to) = (parse_date(from)?, parse_date(to)?);
    if from > to {
        return Err(AppError::InvalidRange(
            "\"From Date\" cannot be greater than \"To Date\"".into(),
        ));
    }
    Ok((from, to))
}

/// Chart kind typed at the prompt; only the listed names are accepted
pub fn parse_chart_kind(input: &str) -> Result<ChartKind> {
    ChartKind::parse_strict(input.trim()).ok_or_else(|| {
        AppError::InvalidSelection(format!(
            "'{}' is not one of {}",
            input.trim(),
            ChartKind::ALL.map(|k| k.name()).join(", ")
        ))
    })
}

pub fn parse_f64(input: &str) -> Result<f64> {
    let input = input.trim();
    match input.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::InvalidArgument(format!("'{}' is not a number", input))),
    }
}

/// Positive whole number
pub fn parse_count(input: &str) -> Result<usize> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::InvalidArgument(format!(
            "'{}' is not a positive whole number",
            input
        ))),
    }
}

/// Positive count no larger than `max`
pub fn parse_count_up_to(input: &str, max: usize) -> Result<usize> {
    let n = parse_count(input)?;
    if n > max {
        return Err(AppError::InvalidArgument(format!(
            "{} is more than the {} available",
            n, max
        )));
    }
    Ok(n)
}
