//! JSON chart documents for an external plotting front end

use super::{ChartRenderer, ChartRequest};
use crate::error::{AppError, ErrorResponse, Result};
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes each request to `<output_dir>/<timestamp>-<n>-<title>.json`
pub struct JsonRenderer {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonRenderer {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            written: Vec::new(),
        }
    }

    /// Files written so far, oldest first
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl JsonRenderer {
    fn write<T: Serialize>(&mut self, stem: &str, document: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let name = format!(
            "{}-{}-{}.json",
            Local::now().format("%Y%m%d%H%M%S"),
            self.written.len() + 1,
            slug(stem)
        );
        let path = self.output_dir.join(name);

        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, document)?;

        self.written.push(path.clone());
        Ok(path)
    }
}

impl ChartRenderer for JsonRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<()> {
        let path = self.write(&request.title, request)?;
        info!("Chart written to {}", path.display());
        Ok(())
    }

    fn report_error(&mut self, err: &AppError) -> Result<()> {
        let path = self.write("error", &ErrorResponse::from(err))?;
        info!("Error record written to {}", path.display());
        Ok(())
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes
fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "chart".to_string()
    } else {
        trimmed.to_string()
    }
}
