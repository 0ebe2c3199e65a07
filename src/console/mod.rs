//! Console boundary
//!
//! All prompting and re-prompt loops live here. Handlers receive parsed
//! values; end of input surfaces as `AppError::InputClosed`.

pub mod parse;

use crate::error::{AppError, Result};
use crate::report::ChartKind;
use chrono::NaiveDate;
use std::fmt::Display;
use std::io::{BufRead, Write};
use tracing::debug;

pub const RULE: &str = "------------------------------";

pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Print `prompt` and read one line, without its line ending
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until `parse` accepts the answer
    pub fn ask<T, F>(&mut self, prompt: &str, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T>,
    {
        loop {
            let line = self.read_line(prompt)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_reprompt() => {
                    debug!("Re-prompting after {}", err.code());
                    self.say(&err)?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Print a numbered list and return the 0-based index picked
    pub fn choose<S: AsRef<str>>(&mut self, heading: &str, options: &[S], prompt: &str) -> Result<usize> {
        if options.is_empty() {
            return Err(AppError::InsufficientData(format!("nothing to choose for {}", heading)));
        }
        self.say(heading)?;
        for (i, option) in options.iter().enumerate() {
            self.say(format!("{}. {}", i + 1, option.as_ref()))?;
        }
        let max = options.len();
        self.ask(prompt, |line| parse::parse_menu_choice(line, max))
    }

    pub fn chart_kind(&mut self) -> Result<ChartKind> {
        let prompt = format!(
            "Select plot type ({}): ",
            ChartKind::ALL.map(|k| k.name()).join(", ")
        );
        self.ask(&prompt, parse::parse_chart_kind)
    }

    pub fn number(&mut self, prompt: &str) -> Result<f64> {
        self.ask(prompt, parse::parse_f64)
    }

    /// Ask until the answer is between 1 and `available`
    pub fn count_up_to(&mut self, prompt: &str, available: usize) -> Result<usize> {
        if available == 0 {
            return Err(AppError::InsufficientData(format!("nothing to count for '{}'", prompt.trim())));
        }
        self.ask(prompt, |line| parse::parse_count_up_to(line, available))
    }

    /// Ask for both dates again whenever the range is reversed
    pub fn date_range(&mut self) -> Result<(NaiveDate, NaiveDate)> {
        loop {
            let from = self.ask("From Period (yyyy-mm-dd): ", date_text)?;
            let to = self.ask("To Period (yyyy-mm-dd): ", date_text)?;
            match parse::parse_date_range(&from, &to) {
                Ok(range) => return Ok(range),
                Err(err) if err.is_reprompt() => {
                    debug!("Re-prompting after {}", err.code());
                    self.say(&err)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// The answer itself, once it reads as a date
fn date_text(line: &str) -> Result<String> {
    parse::parse_date(line).map(|_| line.to_string())
}

#[cfg(test)]
pub(crate) fn scripted(lines: &[&str]) -> Console<std::io::Cursor<Vec<u8>>, Vec<u8>> {
    let mut input = lines.join("\n");
    input.push('\n');
    Console::new(std::io::Cursor::new(input.into_bytes()), Vec::new())
}
