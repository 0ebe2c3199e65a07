//! Product sales menu

use super::{record_failure, run_menu};
use crate::analytics::{BucketKind, Rank, ReduceKind};
use crate::console::Console;
use crate::data::models::{DatasetKind, Measure};
use crate::error::Result;
use crate::report::{dispatch, ChartRenderer};
use crate::services::ProductSalesService;
use crate::state::Session;
use std::io::{BufRead, Write};

pub const ENTRIES: [&str; 11] = [
    "Display Product Sales",
    "Display Best Performing Product Category",
    "Display Least Performing Product Group",
    "Display Monthly Net Profit",
    "Display Monthly Profit Percentage",
    "Display Best / Worst Performing Product",
    "Display Best Selling Day in Week",
    "Display Average Best Selling Day In Week",
    "Display Profit In Value Daywise",
    "Display Profit In Percentage Daywise",
    "Quit",
];

pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    console: &mut Console<R, W>,
    renderer: &mut dyn ChartRenderer,
) -> Result<()> {
    run_menu(console, "Agata Retail Product Sales", &ENTRIES, |choice, console| {
        let result = handle(choice, session, console, renderer);
        if let Err(err) = &result {
            record_failure(renderer, err);
        }
        result
    })
}

fn handle<R: BufRead, W: Write>(
    choice: usize,
    session: &mut Session,
    console: &mut Console<R, W>,
    renderer: &mut dyn ChartRenderer,
) -> Result<()> {
    let year = session.config().analysis_year;

    let request = match choice {
        0 => {
            let kind = console.chart_kind()?;
            let bucket = match console.choose(
                "How do you wish to view data?",
                &["Day", "Month"],
                "Enter choice: ",
            )? {
                0 => BucketKind::Day,
                _ => BucketKind::Month,
            };
            let frame = session.frame(DatasetKind::ProductSales)?;
            let group = choose_group(console, frame)?;
            ProductSalesService::group_quantity(frame, &group, bucket, kind, year)?
        }
        1 | 2 => {
            let (rank, prompt) = if choice == 1 {
                (Rank::Best, "Number of best products to be displayed: ")
            } else {
                (Rank::Worst, "Number of least products to be displayed: ")
            };
            let frame = session.frame(DatasetKind::ProductSales)?;
            let available = ProductSalesService::product_groups(frame)?.len();
            let n = console.count_up_to(prompt, available)?;
            ProductSalesService::ranked_groups(frame, n, rank, year)?
        }
        3 | 4 => {
            let measure = if choice == 3 {
                Measure::NetProfitValue
            } else {
                Measure::NetProfitPercentage
            };
            let kind = console.chart_kind()?;
            ProductSalesService::monthly_profit(
                session.frame(DatasetKind::ProductSales)?,
                measure,
                kind,
                year,
            )?
        }
        5 => {
            let rank = match console.choose("Products", &["Best", "Worst"], "Enter choice: ")? {
                0 => Rank::Best,
                _ => Rank::Worst,
            };
            let frame = session.frame(DatasetKind::ProductSales)?;
            let group = choose_group(console, frame)?;
            let label = if rank == Rank::Best { "Best" } else { "Worst" };
            let available = ProductSalesService::group_products(frame, &group)?.len();
            let n = console.count_up_to(
                &format!("Number of {} products to be displayed: ", label),
                available,
            )?;
            ProductSalesService::ranked_products(frame, &group, n, rank, year)?
        }
        _ => {
            let (measure, reduce) = match choice {
                6 => (Measure::NetSaleValue, ReduceKind::Sum),
                7 => (Measure::NetSaleValue, ReduceKind::Mean),
                8 => (Measure::NetProfitValue, ReduceKind::Sum),
                _ => (Measure::NetProfitPercentage, ReduceKind::Sum),
            };
            let kind = console.chart_kind()?;
            ProductSalesService::weekday(
                session.frame(DatasetKind::ProductSales)?,
                measure,
                reduce,
                kind,
                year,
            )?
        }
    };

    dispatch(&request, renderer)
}

fn choose_group<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    frame: &crate::data::SalesFrame,
) -> Result<String> {
    let groups = ProductSalesService::product_groups(frame)?;
    let index = console.choose("Product Categories", &groups, "Select Product Group: ")?;
    Ok(groups[index].clone())
}
