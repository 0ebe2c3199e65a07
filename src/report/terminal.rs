//! Text rendering of chart requests

use super::{ChartKind, ChartRenderer, ChartRequest};
use crate::error::Result;
use std::io::Write;
use tracing::warn;

pub struct TerminalRenderer<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out,
            width: width.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bars(&mut self, labels: &[&str], values: &[f64], label_width: usize) -> Result<()> {
        let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        for (label, value) in labels.iter().zip(values) {
            let len = scaled(value.abs(), 0.0, scale, self.width);
            let glyph = if *value < 0.0 { "░" } else { "█" };
            writeln!(
                self.out,
                "{:>lw$} | {} {:.2}",
                label,
                glyph.repeat(len),
                value,
                lw = label_width
            )?;
        }
        Ok(())
    }

    fn marks(&mut self, labels: &[&str], values: &[f64], label_width: usize, joined: bool) -> Result<()> {
        let (min, max) = bounds(values);
        for (label, value) in labels.iter().zip(values) {
            let pos = scaled(*value, min, max, self.width);
            let lead = if joined { "─" } else { " " };
            writeln!(
                self.out,
                "{:>lw$} | {}● {:.2}",
                label,
                lead.repeat(pos),
                value,
                lw = label_width
            )?;
        }
        Ok(())
    }

    /// Five-number summary per x value, in first-seen order
    fn boxes(&mut self, labels: &[&str], values: &[f64], label_width: usize) -> Result<()> {
        let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
        for (label, value) in labels.iter().zip(values) {
            match groups.iter_mut().find(|(l, _)| l == label) {
                Some((_, group)) => group.push(*value),
                None => groups.push((*label, vec![*value])),
            }
        }
        writeln!(
            self.out,
            "{:>lw$} | {:>12} {:>12} {:>12} {:>12} {:>12}",
            "",
            "min",
            "q1",
            "median",
            "q3",
            "max",
            lw = label_width
        )?;
        for (label, mut group) in groups {
            group.sort_by(f64::total_cmp);
            writeln!(
                self.out,
                "{:>lw$} | {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
                label,
                group[0],
                quantile(&group, 0.25),
                quantile(&group, 0.5),
                quantile(&group, 0.75),
                group[group.len() - 1],
                lw = label_width
            )?;
        }
        Ok(())
    }
}

impl<W: Write> ChartRenderer for TerminalRenderer<W> {
    fn render(&mut self, request: &ChartRequest) -> Result<()> {
        let mut labels = Vec::with_capacity(request.points.len());
        let mut values = Vec::with_capacity(request.points.len());
        for point in &request.points {
            if let Some(y) = point.y {
                labels.push(point.x.as_str());
                values.push(y);
            }
        }
        let skipped = request.points.len() - values.len();
        if skipped > 0 {
            warn!("Skipped {} missing point(s) in '{}'", skipped, request.title);
        }

        writeln!(self.out, "\n{}", request.title)?;
        writeln!(self.out, "{} by {}", request.y_field, request.x_field)?;

        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        match request.kind {
            ChartKind::Bar => self.bars(&labels, &values, label_width)?,
            ChartKind::Line => self.marks(&labels, &values, label_width, true)?,
            ChartKind::Rel => self.marks(&labels, &values, label_width, false)?,
            ChartKind::Box => self.boxes(&labels, &values, label_width)?,
        }
        self.out.flush()?;
        Ok(())
    }
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

/// Position of `value` on a `0..=width` axis spanning `min..=max`; 0 on an empty axis
fn scaled(value: f64, min: f64, max: f64, width: usize) -> usize {
    if max <= min {
        return 0;
    }
    (((value - min) / (max - min)) * width as f64).round() as usize
}

/// Linear-interpolated quantile of sorted, non-empty values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}
