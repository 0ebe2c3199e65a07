//! Chart requests and dispatch
//!
//! A `ChartRequest` is a titled, renderer-independent description of one
//! chart. Building it is pure; `dispatch` hands it to exactly one renderer.

pub mod json;
pub mod terminal;

pub use json::JsonRenderer;
pub use terminal::TerminalRenderer;

use crate::analytics::{AggregationResult, BucketKind};
use crate::config::{ChartConfig, ChartOutput};
use crate::data::models::Measure;
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use chrono::Datelike;
use serde::Serialize;
use std::fmt;
use std::io;
use tracing::info;

/// Supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    /// Relational scatter plot
    Rel,
    Box,
    Bar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [ChartKind::Line, ChartKind::Rel, ChartKind::Box, ChartKind::Bar];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Rel => "rel",
            ChartKind::Box => "box",
            ChartKind::Bar => "bar",
        }
    }

    /// Exact, case-sensitive name match, no fallback
    pub fn parse_strict(value: &str) -> Option<ChartKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == value)
    }
}

/// Anything other than an exact lowercase name resolves to `Bar`
impl From<&str> for ChartKind {
    fn from(value: &str) -> Self {
        Self::parse_strict(value).unwrap_or(ChartKind::Bar)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    /// `None` for missing values; renderers skip these
    pub y: Option<f64>,
}

impl ChartPoint {
    pub fn new(x: impl Into<String>, y: f64) -> Self {
        Self {
            x: x.into(),
            y: if y.is_nan() { None } else { Some(y) },
        }
    }
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub title: String,
    pub x_field: String,
    pub y_field: String,
    pub points: Vec<ChartPoint>,
}

pub fn build_report(
    kind: ChartKind,
    x_field: &str,
    y_field: &str,
    dataset: Vec<ChartPoint>,
    title: &str,
) -> ChartRequest {
    ChartRequest {
        kind,
        title: title.to_string(),
        x_field: x_field.to_string(),
        y_field: y_field.to_string(),
        points: dataset,
    }
}

/// Chart of an aggregation, one point per bucket
pub fn from_aggregation(kind: ChartKind, result: &AggregationResult, title: &str) -> ChartRequest {
    let points = result
        .buckets
        .iter()
        .map(|b| ChartPoint {
            x: b.key.to_string(),
            y: b.value,
        })
        .collect();
    build_report(
        kind,
        result.bucket_kind.label(),
        result.measure.label(),
        points,
        title,
    )
}

/// Per-row x axis for charts of unaggregated data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAxis {
    Date,
    Month,
}

/// Chart of every row of `measure`
pub fn from_rows(
    kind: ChartKind,
    frame: &SalesFrame,
    axis: RowAxis,
    measure: Measure,
    title: &str,
) -> Result<ChartRequest> {
    let values = frame.column(measure)?;
    let (x_field, keys): (&str, Vec<String>) = match axis {
        RowAxis::Date => (
            BucketKind::Day.label(),
            frame.dates().iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
        ),
        RowAxis::Month => (
            BucketKind::Month.label(),
            frame.dates().iter().map(|d| d.month().to_string()).collect(),
        ),
    };
    let points = keys
        .into_iter()
        .zip(values)
        .map(|(x, &y)| ChartPoint::new(x, y))
        .collect();
    Ok(build_report(kind, x_field, measure.label(), points, title))
}

/// Something that draws a chart
pub trait ChartRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<()>;

    /// Record a report that failed to build; only file outputs keep these
    fn report_error(&mut self, _err: &AppError) -> Result<()> {
        Ok(())
    }
}

/// Renders to the terminal and writes a JSON document
pub struct CombinedRenderer {
    renderers: Vec<Box<dyn ChartRenderer>>,
}

impl ChartRenderer for CombinedRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<()> {
        for renderer in &mut self.renderers {
            renderer.render(request)?;
        }
        Ok(())
    }

    fn report_error(&mut self, err: &AppError) -> Result<()> {
        for renderer in &mut self.renderers {
            renderer.report_error(err)?;
        }
        Ok(())
    }
}

/// Renderer selected by the chart output setting
pub fn renderer_for(config: &ChartConfig) -> Box<dyn ChartRenderer> {
    let terminal = || -> Box<dyn ChartRenderer> {
        Box::new(TerminalRenderer::new(io::stdout(), config.width))
    };
    let json = || -> Box<dyn ChartRenderer> { Box::new(JsonRenderer::new(&config.output_dir)) };
    match config.output {
        ChartOutput::Terminal => terminal(),
        ChartOutput::Json => json(),
        ChartOutput::Both => Box::new(CombinedRenderer {
            renderers: vec![terminal(), json()],
        }),
    }
}

/// Hand one request to the renderer
pub fn dispatch(request: &ChartRequest, renderer: &mut dyn ChartRenderer) -> Result<()> {
    if request.points.is_empty() {
        return Err(AppError::InsufficientData(format!(
            "nothing to plot for '{}'",
            request.title
        )));
    }
    info!(
        "Rendering {} chart '{}' ({} points)",
        request.kind,
        request.title,
        request.points.len()
    );
    renderer.render(request)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// Records every request it is asked to render
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub rendered: Vec<ChartRequest>,
        pub errors: Vec<&'static str>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&mut self, request: &ChartRequest) -> Result<()> {
            self.rendered.push(request.clone());
            Ok(())
        }

        fn report_error(&mut self, err: &AppError) -> Result<()> {
            self.errors.push(err.code());
            Ok(())
        }
    }
}
