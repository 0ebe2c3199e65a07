//! Sales data models

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which export a frame was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    /// One row per trading day
    DaySell,
    /// One row per product per day
    ProductSales,
}

/// Numeric columns, canonical and derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measure {
    // day-level canonical
    NetPurchase,
    GrossSale,
    Tax,
    Margin,
    // product-level canonical
    ProductQuantity,
    NetPurchasePrice,
    NetPurchaseValue,
    NetSalePrice,
    NetSaleValue,
    // derived
    NetSales,
    NetSalesPercentage,
    ProfitPercentage,
    NetProfitValue,
    NetProfitPercentage,
}

impl Measure {
    /// Human readable column name
    pub fn label(&self) -> &'static str {
        match self {
            Measure::NetPurchase => "Net Purchase",
            Measure::GrossSale => "Gross Sale",
            Measure::Tax => "Tax",
            Measure::Margin => "Margin",
            Measure::ProductQuantity => "Product Quantity",
            Measure::NetPurchasePrice => "Net Purchase Price",
            Measure::NetPurchaseValue => "Net Purchase Value",
            Measure::NetSalePrice => "Net Sale Price",
            Measure::NetSaleValue => "Net Sale Value",
            Measure::NetSales => "Net Sales",
            Measure::NetSalesPercentage => "Net Sales Percentage",
            Measure::ProfitPercentage => "Profit Percentage",
            Measure::NetProfitValue => "Net Profit Value",
            Measure::NetProfitPercentage => "Net Profit Percentage",
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Measure::NetSales
                | Measure::NetSalesPercentage
                | Measure::ProfitPercentage
                | Measure::NetProfitValue
                | Measure::NetProfitPercentage
        )
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text columns of the product export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    ProductId,
    ProductGroup,
    ProductName,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::ProductId => "ProductID",
            Category::ProductGroup => "Product Group",
            Category::ProductName => "Product Name",
        }
    }
}

/// Canonical column of a source export, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalColumn {
    Date,
    Numeric(Measure),
    Text(Category),
}

/// Calendar fields derived once per row at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub weekday: Weekday,
}

impl CalendarFields {
    /// Months since year 0, so consecutive months differ by one
    pub fn month_index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    /// Inverse of [`CalendarFields::month_index`]
    pub fn from_month_index(index: i32) -> (i32, u32) {
        (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }
}

impl From<NaiveDate> for CalendarFields {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            weekday: date.weekday(),
        }
    }
}

/// Fixed weekday order used by every weekday grouping
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
