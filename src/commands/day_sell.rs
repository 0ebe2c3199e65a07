//! Day sell menu

use super::{choose_column, record_failure, run_menu};
use crate::analytics::ReduceKind;
use crate::console::Console;
use crate::data::models::{DatasetKind, Measure};
use crate::error::Result;
use crate::report::{dispatch, ChartRenderer};
use crate::services::{DaySellService, PredictionService};
use crate::state::Session;
use std::io::{BufRead, Write};

pub const ENTRIES: [&str; 16] = [
    "Display Entire Sales Data",
    "Display Total (SUM) Sales",
    "Display Average Sales",
    "Display Net Sales",
    "Display Net Sales Monthly",
    "Display Average Net Sales",
    "Display Net Sales Percentage",
    "Display Entire Data as per User choice",
    "Display Profit Percentage",
    "Display Total Sale Day wise",
    "Display Average Total Sale Day wise",
    "Display Profit Day wise",
    "Display Profit Percentage Day Wise",
    "Predict Future Tax and Profit",
    "Predict Future Net Purchase and Gross Sale",
    "Quit",
];

pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    console: &mut Console<R, W>,
    renderer: &mut dyn ChartRenderer,
) -> Result<()> {
    let heading = match session.config().analysis_year {
        Some(year) => format!("Welcome to the Agata Retail Day Sell Data FY {}", year),
        None => "Welcome to the Agata Retail Day Sell Data".to_string(),
    };
    run_menu(console, &heading, &ENTRIES, |choice, console| {
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
            let frame = session.frame(DatasetKind::DaySell)?;
            let measure = choose_column(console, frame)?;
            DaySellService::entire_column(frame, measure, kind, year)?
        }
        1 | 2 => {
            let reduce = if choice == 1 { ReduceKind::Sum } else { ReduceKind::Mean };
            let kind = console.chart_kind()?;
            let frame = session.frame(DatasetKind::DaySell)?;
            let measure = choose_column(console, frame)?;
            DaySellService::monthly(frame, measure, reduce, kind, year)?
        }
        3 => {
            let kind = console.chart_kind()?;
            DaySellService::per_row(session.frame(DatasetKind::DaySell)?, Measure::NetSales, kind, year)?
        }
        4 | 5 => {
            let reduce = if choice == 4 { ReduceKind::Sum } else { ReduceKind::Mean };
            let kind = console.chart_kind()?;
            DaySellService::monthly(
                session.frame(DatasetKind::DaySell)?,
                Measure::NetSales,
                reduce,
                kind,
                year,
            )?
        }
        6 | 8 => {
            let measure = if choice == 6 {
                Measure::NetSalesPercentage
            } else {
                Measure::ProfitPercentage
            };
            let kind = console.chart_kind()?;
            DaySellService::per_row(session.frame(DatasetKind::DaySell)?, measure, kind, None)?
        }
        7 => {
            let (from, to) = console.date_range()?;
            let kind = console.chart_kind()?;
            let frame = session.frame(DatasetKind::DaySell)?;
            let measure = choose_column(console, frame)?;
            DaySellService::date_range(frame, measure, from, to, kind)?
        }
        9..=12 => {
            let (measure, reduce) = match choice {
                9 => (Measure::GrossSale, ReduceKind::Sum),
                10 => (Measure::GrossSale, ReduceKind::Mean),
                11 => (Measure::Margin, ReduceKind::Sum),
                _ => (Measure::ProfitPercentage, ReduceKind::Sum),
            };
            let kind = console.chart_kind()?;
            DaySellService::weekday(session.frame(DatasetKind::DaySell)?, measure, reduce, kind, year)?
        }
        13 => return predict_tax(session, console),
        _ => return predict_purchase_sale(session, console),
    };

    dispatch(&request, renderer)
}

/// Forecast tax and the resulting margin from typed net purchase and gross sale
pub fn predict_tax<R: BufRead, W: Write>(session: &Session, console: &mut Console<R, W>) -> Result<()> {
    let frame = session.load_fresh(DatasetKind::DaySell)?;
    let net_purchase = console.number("Enter Net Purchase: ")?;
    let gross_sale = console.number("Enter Gross Sale: ")?;

    let forecast =
        PredictionService::predict_tax(&frame, net_purchase, gross_sale, &session.config().prediction)?;

    console.say(format!(
        "The predicted tax is {:.2} with {:.2}% accuracy",
        forecast.tax,
        forecast.accuracy * 100.0
    ))?;
    console.say(format!("Evaluated Profit = {:.2}", forecast.evaluated_margin))
}

/// Forecast net purchase and gross sale from typed tax and margin
pub fn predict_purchase_sale<R: BufRead, W: Write>(
    session: &Session,
    console: &mut Console<R, W>,
) -> Result<()> {
    let frame = session.load_fresh(DatasetKind::DaySell)?;
    let tax = console.number("Enter Tax: ")?;
    let margin = console.number("Enter Margin: ")?;

    let forecast =
        PredictionService::predict_purchase_sale(&frame, tax, margin, &session.config().prediction)?;

    console.say(format!(
        "The predicted net purchase is {:.2} and predicted gross sale is {:.2} with {:.2}% accuracy",
        forecast.net_purchase,
        forecast.gross_sale,
        forecast.accuracy * 100.0
    ))
}
