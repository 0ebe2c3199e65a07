//! Console menu commands
//!
//! One module per menu. Each entry gathers its inputs through the console,
//! calls a service and dispatches the resulting chart. A failing entry is
//! reported and the menu is shown again.

pub mod cleanup;
pub mod day_sell;
pub mod product_sales;

use crate::console::parse::parse_menu_choice;
use crate::console::{Console, RULE};
use crate::data::models::Measure;
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use crate::report::ChartRenderer;
use std::io::{BufRead, Write};
use tracing::{error, info, warn};

/// Show `entries` until the last one (quit) is picked or input ends
pub fn run_menu<R, W, F>(
    console: &mut Console<R, W>,
    heading: &str,
    entries: &[&str],
    mut handle: F,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(usize, &mut Console<R, W>) -> Result<()>,
{
    let quit = entries.len() - 1;
    loop {
        console.say(RULE)?;
        console.say(heading)?;
        console.say(RULE)?;
        for (i, entry) in entries.iter().enumerate() {
            console.say(format!("{}. {}", i + 1, entry))?;
        }

        let choice = match console.ask("Enter choice: ", |line| parse_menu_choice(line, entries.len())) {
            Ok(choice) => choice,
            Err(AppError::InputClosed) => {
                info!("Input closed, leaving {}", heading);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        console.say(RULE)?;

        if choice == quit {
            return Ok(());
        }

        match handle(choice, console) {
            Ok(()) => {}
            Err(AppError::InputClosed) => {
                info!("Input closed, leaving {}", heading);
                return Ok(());
            }
            Err(err) => {
                error!("{} entry {} failed [{}]: {}", heading, choice + 1, err.code(), err);
                console.say(format!("Error: {}", err))?;
            }
        }
    }
}

/// Keep a record of a failed entry with renderers that persist output
pub fn record_failure(renderer: &mut dyn ChartRenderer, err: &AppError) {
    if matches!(err, AppError::InputClosed) {
        return;
    }
    if let Err(write_err) = renderer.report_error(err) {
        warn!("Could not record failure: {}", write_err);
    }
}

/// Let the user pick one of the frame's canonical numeric columns
pub fn choose_column<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    frame: &SalesFrame,
) -> Result<Measure> {
    let measures = frame.canonical_measures();
    let labels: Vec<&str> = measures.iter().map(|m| m.label()).collect();
    let index = console.choose("Columns", &labels, "Please select column number: ")?;
    Ok(measures[index])
}
