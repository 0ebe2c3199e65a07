//! Columnar sales frames
//!
//! A `SalesFrame` is the in-memory form of one CSV export: a polars table
//! holding integer calendar keys for every row, canonical numeric and text
//! columns, and any derived columns added by the metric deriver.

pub mod derive;
pub mod loader;
pub mod models;

use crate::error::{AppError, Result};
use chrono::{Datelike, NaiveDate};
use models::{CalendarFields, Category, DatasetKind, Measure};
use polars::prelude::*;

/// Days since 0001-01-01, one per row
pub const DAY_KEY: &str = "Day";
/// Month index as in [`CalendarFields::month_index`]
pub const MONTH_KEY: &str = "Month";
pub const YEAR_KEY: &str = "Year";
/// 0 for Monday through 6 for Sunday
pub const WEEKDAY_KEY: &str = "Day Of Week";

const CALENDAR_KEYS: [&str; 4] = [DAY_KEY, MONTH_KEY, YEAR_KEY, WEEKDAY_KEY];

/// One numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub measure: Measure,
    pub values: Vec<f64>,
}

/// One text column
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
    pub category: Category,
    pub values: Vec<String>,
}

/// In-memory table of sales rows ordered by date
#[derive(Debug, Clone)]
pub struct SalesFrame {
    kind: DatasetKind,
    dates: Vec<NaiveDate>,
    measures: Vec<Measure>,
    categories: Vec<Category>,
    table: DataFrame,
}

impl PartialEq for SalesFrame {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.dates == other.dates
            && self.measures == other.measures
            && self.categories == other.categories
            && self.table.equals_missing(&other.table)
    }
}

impl SalesFrame {
    /// Build a frame, deriving calendar keys from the dates.
    ///
    /// Rows are stably sorted by date. Every column must have one value per date.
    pub fn new(
        kind: DatasetKind,
        dates: Vec<NaiveDate>,
        numeric: Vec<NumericColumn>,
        text: Vec<TextColumn>,
    ) -> Result<Self> {
        let rows = dates.len();
        for column in &numeric {
            if column.values.len() != rows {
                return Err(AppError::InvalidArgument(format!(
                    "column {} has {} values for {} rows",
                    column.measure,
                    column.values.len(),
                    rows
                )));
            }
        }
        for column in &text {
            if column.values.len() != rows {
                return Err(AppError::InvalidArgument(format!(
                    "column {} has {} values for {} rows",
                    column.category.label(),
                    column.values.len(),
                    rows
                )));
            }
        }

        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by_key(|&i| dates[i]);
        let dates: Vec<NaiveDate> = order.iter().map(|&i| dates[i]).collect();
        let calendar: Vec<CalendarFields> = dates.iter().copied().map(CalendarFields::from).collect();

        let mut series = vec![
            Series::new(
                DAY_KEY,
                dates.iter().map(|d| d.num_days_from_ce()).collect::<Vec<i32>>(),
            ),
            Series::new(
                MONTH_KEY,
                calendar.iter().map(CalendarFields::month_index).collect::<Vec<i32>>(),
            ),
            Series::new(YEAR_KEY, calendar.iter().map(|c| c.year).collect::<Vec<i32>>()),
            Series::new(
                WEEKDAY_KEY,
                calendar
                    .iter()
                    .map(|c| c.weekday.num_days_from_monday() as i32)
                    .collect::<Vec<i32>>(),
            ),
        ];
        for column in &numeric {
            let values: Vec<f64> = order.iter().map(|&i| column.values[i]).collect();
            series.push(Series::new(column.measure.label(), values));
        }
        for column in &text {
            let values: Vec<&str> = order.iter().map(|&i| column.values[i].as_str()).collect();
            series.push(Series::new(column.category.label(), values));
        }

        Ok(Self {
            kind,
            dates,
            measures: numeric.iter().map(|c| c.measure).collect(),
            categories: text.iter().map(|c| c.category).collect(),
            table: DataFrame::new(series)?,
        })
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Underlying table: calendar keys, then measures, then categories
    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    /// Calendar keys are present for every row
    pub fn has_calendar(&self) -> bool {
        CALENDAR_KEYS.iter().all(|key| {
            self.table
                .column(key)
                .map_or(false, |series| series.len() == self.dates.len())
        })
    }

    /// Numeric columns in insertion order, canonical first
    pub fn measures(&self) -> impl Iterator<Item = Measure> + '_ {
        self.measures.iter().copied()
    }

    /// Canonical numeric columns only
    pub fn canonical_measures(&self) -> Vec<Measure> {
        self.measures().filter(|m| !m.is_derived()).collect()
    }

    pub fn column(&self, measure: Measure) -> Result<&[f64]> {
        if !self.measures.contains(&measure) {
            return Err(AppError::MissingColumn(measure.label().to_string()));
        }
        let values = self.table.column(measure.label())?.f64()?;
        if values.is_empty() {
            return Ok(&[]);
        }
        Ok(values.cont_slice()?)
    }

    pub fn text_column(&self, category: Category) -> Result<&StringChunked> {
        if !self.categories.contains(&category) {
            return Err(AppError::MissingColumn(category.label().to_string()));
        }
        Ok(self.table.column(category.label())?.str()?)
    }

    /// Insert a numeric column, replacing one with the same measure
    pub(crate) fn put_column(&mut self, column: NumericColumn) -> Result<()> {
        if column.values.len() != self.len() {
            return Err(AppError::InvalidArgument(format!(
                "column {} has {} values for {} rows",
                column.measure,
                column.values.len(),
                self.len()
            )));
        }
        self.table
            .with_column(Series::new(column.measure.label(), column.values))?;
        if !self.measures.contains(&column.measure) {
            self.measures.push(column.measure);
        }
        Ok(())
    }

    /// Keep the rows where `mask` is true
    fn filter_mask(&self, mask: &BooleanChunked) -> Result<SalesFrame> {
        let mut table = self.table.filter(mask)?;
        table.as_single_chunk();
        let dates = self
            .dates
            .iter()
            .zip(mask.into_iter())
            .filter(|(_, keep)| keep.unwrap_or(false))
            .map(|(date, _)| *date)
            .collect();
        Ok(SalesFrame {
            kind: self.kind,
            dates,
            measures: self.measures.clone(),
            categories: self.categories.clone(),
            table,
        })
    }

    /// Rows whose date lies in `from..=to`
    pub fn filter_range(&self, from: NaiveDate, to: NaiveDate) -> Result<SalesFrame> {
        if from > to {
            return Err(AppError::InvalidRange(format!(
                "from date {} is later than to date {}",
                from, to
            )));
        }
        let days = self.table.column(DAY_KEY)?.i32()?;
        let mask = &days.gt_eq(from.num_days_from_ce()) & &days.lt_eq(to.num_days_from_ce());
        self.filter_mask(&mask)
    }

    /// Rows of one calendar year
    pub fn filter_year(&self, year: i32) -> Result<SalesFrame> {
        let mask = self.table.column(YEAR_KEY)?.i32()?.equal(year);
        self.filter_mask(&mask)
    }

    /// Rows whose text column equals `value`
    pub fn filter_category(&self, category: Category, value: &str) -> Result<SalesFrame> {
        let mask = self.text_column(category)?.equal(value);
        self.filter_mask(&mask)
    }

    /// Distinct values of a text column, sorted
    pub fn distinct(&self, category: Category) -> Result<Vec<String>> {
        let mut values: Vec<String> = self
            .text_column(category)?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    #[cfg(test)]
    pub(crate) fn drop_calendar(&mut self) {
        for key in CALENDAR_KEYS {
            let _ = self.table.drop_in_place(key);
        }
    }
}
